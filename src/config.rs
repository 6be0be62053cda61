// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ConfigError;

/// REST base used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

const APP_DIR: &str = "searchcast";
const TOKEN_FILE: &str = "token";

/// Where the stored token lives: `<config dir>/searchcast/token`
pub fn default_token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(TOKEN_FILE))
}

/// Read a stored token; a missing file means no token
pub fn read_token_file(path: &Path) -> Result<Option<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(normalize_token(Some(content))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ConfigError::TokenReadFailed {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn normalize_token(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolved endpoints and credentials
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_url: Url,
    ws_url: Option<String>,
    pub token: Option<String>,
}

impl Settings {
    /// Validate URLs and settle on a token.
    ///
    /// An explicit token wins; otherwise `token_file` is consulted.
    pub fn resolve(
        api_url: &str,
        ws_url: Option<&str>,
        token: Option<String>,
        token_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let api_url = Url::parse(api_url).map_err(|e| ConfigError::InvalidUrl {
            name: "API",
            value: api_url.to_string(),
            source: e,
        })?;

        let ws_url = match ws_url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(raw) => {
                Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
                    name: "upload",
                    value: raw.to_string(),
                    source: e,
                })?;
                Some(raw.to_string())
            }
            None => None,
        };

        let token = match normalize_token(token) {
            Some(token) => Some(token),
            None => match token_file {
                Some(path) => read_token_file(path)?,
                None => None,
            },
        };

        Ok(Self {
            api_url,
            ws_url,
            token,
        })
    }

    /// Base URL for upload connections
    pub fn upload_url(&self) -> Result<&str, ConfigError> {
        self.ws_url.as_deref().ok_or(ConfigError::MissingUploadUrl)
    }
}
