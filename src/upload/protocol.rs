// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SessionError;

/// A file accepted from the command line for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub path: PathBuf,
    /// Name reported to the server and used as the status key
    pub name: String,
    pub content_type: String,
}

impl DroppedFile {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let content_type = guess_content_type(&path).to_string();

        Self {
            path,
            name,
            content_type,
        }
    }
}

/// Infer a MIME type from a file extension
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "epub" => "application/epub+zip",
        "rtf" => "application/rtf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}

/// Form fields accompanying an uploaded file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadForm {
    pub filename: String,
    pub content_type: String,
}

/// Client-to-server message carrying one whole file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BytesMessage {
    #[serde(rename = "type")]
    pub kind: String,
    /// Base64-encoded file content
    pub bytes: String,
    pub form: UploadForm,
}

impl BytesMessage {
    pub const KIND: &'static str = "bytes";

    pub fn new(file: &DroppedFile, content: &[u8]) -> Self {
        Self {
            kind: Self::KIND.to_string(),
            bytes: STANDARD.encode(content),
            form: UploadForm {
                filename: file.name.clone(),
                content_type: file.content_type.clone(),
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode the carried content
    pub fn content(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.bytes)
    }
}

#[derive(Deserialize)]
struct RawStatusEvent {
    filename: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
}

/// Server-to-client status report for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEvent {
    pub filename: String,
    /// `error`, `success`, or anything else for in-progress
    pub kind: String,
    pub message: Option<String>,
    pub progress: Option<u8>,
}

impl StatusEvent {
    /// Parse an inbound text frame.
    ///
    /// Progress values are clamped to 0..=100 and rounded; non-finite values
    /// count as absent.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let raw: RawStatusEvent = serde_json::from_str(text)?;

        let progress = raw
            .progress
            .filter(|p| p.is_finite())
            .map(|p| p.clamp(0.0, 100.0).round() as u8);

        Ok(Self {
            filename: raw.filename,
            kind: raw.kind,
            message: raw.message,
            progress,
        })
    }
}

/// Build `<base>/user/upload/<resource_id>/<token>`
pub fn upload_endpoint(base: &str, resource_id: i64, token: &str) -> Result<Url, SessionError> {
    let mut url = Url::parse(base).map_err(|e| SessionError::InvalidEndpoint {
        url: base.to_string(),
        source: e,
    })?;

    url.path_segments_mut()
        .map_err(|_| SessionError::UnsupportedEndpoint(base.to_string()))?
        .pop_if_empty()
        .extend(["user", "upload", resource_id.to_string().as_str(), token]);

    Ok(url)
}

/// Render an endpoint for logs with its final (token) segment masked
pub fn redact_endpoint(url: &Url) -> String {
    let mut redacted = url.clone();
    if let Ok(mut segments) = redacted.path_segments_mut() {
        segments.pop().push("***");
    }
    redacted.to_string()
}
