// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Default target word count for a new podcast
pub const DEFAULT_WORD_COUNT: u32 = 500;

fn default_word_count() -> u32 {
    DEFAULT_WORD_COUNT
}

/// A podcast as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Podcast {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Free-form; see [`StatusTone`] for the recognized values
    pub status: String,
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_location: Option<String>,
    pub created_at: String,
}

impl Podcast {
    /// Playback and download need both a completed flag and a stored file
    pub fn is_playable(&self) -> bool {
        self.is_completed
            && self
                .file_location
                .as_deref()
                .is_some_and(|location| !location.is_empty())
    }

    pub fn tone(&self) -> StatusTone {
        StatusTone::from_status(&self.status)
    }

    /// Creation date formatted as `Jan 5, 2024`, or the raw value if it
    /// doesn't parse
    pub fn created_display(&self) -> String {
        format_created(&self.created_at)
    }
}

/// Visual treatment of a podcast status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Warning,
    Error,
    Default,
}

impl StatusTone {
    pub fn from_status(status: &str) -> Self {
        match status {
            "completed" => StatusTone::Success,
            "processing" => StatusTone::Warning,
            "failed" => StatusTone::Error,
            _ => StatusTone::Default,
        }
    }
}

/// Request body for creating a podcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastCreate {
    pub title: String,
    pub content: String,
    #[serde(default = "default_word_count")]
    pub word_count: u32,
}

impl PodcastCreate {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            word_count: DEFAULT_WORD_COUNT,
        }
    }
}

/// Partial update; unset fields are left out of the request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodcastUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl PodcastUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.status.is_none()
            && self.is_completed.is_none()
    }
}

fn format_created(raw: &str) -> String {
    const DISPLAY: &str = "%b %-d, %Y";

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format(DISPLAY).to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format(DISPLAY).to_string();
    }
    raw.to_string()
}
