// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::Serialize;

use super::protocol::StatusEvent;

/// Progress shown once a file has been read locally and handed to the socket
pub const READ_COMPLETE_PROGRESS: u8 = 20;

/// Message attached to a file whose local content could not be read
pub const READ_FAILED_MESSAGE: &str = "Error reading file";

/// Lifecycle of a single file transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Pending,
    Processing,
    Success,
    Error,
}

impl FileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileState::Success | FileState::Error)
    }

    /// Map a server-reported event type onto a state
    pub fn from_event_type(kind: &str) -> Self {
        match kind {
            "error" => FileState::Error,
            "success" => FileState::Success,
            _ => FileState::Processing,
        }
    }
}

/// Status row for one file of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileTransferStatus {
    pub filename: String,
    pub state: FileState,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileTransferStatus {
    pub fn pending(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            state: FileState::Pending,
            progress: 0,
            message: None,
        }
    }
}

/// Anything that can move a file's status forward
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    /// The file's bytes are in memory and about to be sent
    ReadCompleted { filename: String },
    /// The file could not be read; nothing is sent for it
    ReadFailed { filename: String },
    /// An event reported by the server
    Remote(StatusEvent),
}

impl StatusUpdate {
    pub fn filename(&self) -> &str {
        match self {
            StatusUpdate::ReadCompleted { filename } | StatusUpdate::ReadFailed { filename } => {
                filename
            }
            StatusUpdate::Remote(event) => &event.filename,
        }
    }
}

/// Filename-keyed status rows in drop order.
///
/// A board is never mutated in place: [`StatusBoard::apply`] returns the next
/// board, leaving the current one untouched. Entries are matched by filename,
/// so two dropped files sharing a name share one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBoard {
    entries: Vec<FileTransferStatus>,
}

impl StatusBoard {
    /// Create a board with one pending row per distinct filename
    pub fn for_batch<I, S>(filenames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries: Vec<FileTransferStatus> = Vec::new();
        for name in filenames {
            let name = name.into();
            if !entries.iter().any(|e| e.filename == name) {
                entries.push(FileTransferStatus::pending(name));
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[FileTransferStatus] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, filename: &str) -> Option<&FileTransferStatus> {
        self.entries.iter().find(|e| e.filename == filename)
    }

    /// Display position of the row for `filename`
    pub fn position(&self, filename: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.filename == filename)
    }

    /// True once the board has rows and every row is terminal
    pub fn is_settled(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.state.is_terminal())
    }

    pub fn count(&self, state: FileState) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }

    /// Project an update onto the board.
    ///
    /// Updates for filenames without a row are ignored.
    pub fn apply(&self, update: &StatusUpdate) -> StatusBoard {
        let entries = self
            .entries
            .iter()
            .map(|entry| {
                if entry.filename == update.filename() {
                    project(entry, update)
                } else {
                    entry.clone()
                }
            })
            .collect();

        StatusBoard { entries }
    }
}

fn project(entry: &FileTransferStatus, update: &StatusUpdate) -> FileTransferStatus {
    match update {
        StatusUpdate::ReadCompleted { .. } => FileTransferStatus {
            state: FileState::Processing,
            progress: READ_COMPLETE_PROGRESS,
            ..entry.clone()
        },
        StatusUpdate::ReadFailed { .. } => FileTransferStatus {
            state: FileState::Error,
            message: Some(READ_FAILED_MESSAGE.to_string()),
            ..entry.clone()
        },
        StatusUpdate::Remote(event) => {
            let state = FileState::from_event_type(&event.kind);
            let progress = match state {
                FileState::Success => 100,
                FileState::Error => 0,
                _ => event.progress.unwrap_or(0),
            };

            FileTransferStatus {
                filename: entry.filename.clone(),
                state,
                progress,
                message: event.message.clone(),
            }
        }
    }
}
