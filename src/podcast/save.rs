// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::SaveError;

/// Extension given to every saved podcast
pub const AUDIO_EXTENSION: &str = "mp3";

/// Filename a podcast download is saved under: `{title}.mp3`, with
/// characters the filesystem rejects stripped from the title
pub fn audio_filename(title: &str) -> String {
    let stem = sanitize_filename::sanitize(title);
    let stem = if stem.trim().is_empty() {
        "podcast".to_string()
    } else {
        stem
    };
    format!("{stem}.{AUDIO_EXTENSION}")
}

/// A downloaded payload staged on disk under a `.partial` name.
///
/// The staged file is removed when the object is dropped unless it was
/// persisted first, so it never outlives the save.
#[derive(Debug)]
pub struct TransientObject {
    path: PathBuf,
    persisted: bool,
}

impl TransientObject {
    /// Write `bytes` next to `target` under a `.partial` name
    pub async fn stage(bytes: &[u8], target: &Path) -> Result<Self, SaveError> {
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".partial");
        let path = target.with_file_name(name);

        // Registered before writing so a failed write still gets cleaned up
        let object = Self {
            path,
            persisted: false,
        };

        let mut file = File::create(&object.path)
            .await
            .map_err(|e| SaveError::WriteFailed {
                path: object.path.clone(),
                source: e,
            })?;
        file.write_all(bytes)
            .await
            .map_err(|e| SaveError::WriteFailed {
                path: object.path.clone(),
                source: e,
            })?;
        file.flush().await.map_err(|e| SaveError::WriteFailed {
            path: object.path.clone(),
            source: e,
        })?;

        Ok(object)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the staged payload to its final name
    pub async fn persist(mut self, target: &Path) -> Result<PathBuf, SaveError> {
        tokio::fs::rename(&self.path, target)
            .await
            .map_err(|e| SaveError::PersistFailed {
                from: self.path.clone(),
                to: target.to_path_buf(),
                source: e,
            })?;
        self.persisted = true;
        Ok(target.to_path_buf())
    }
}

impl Drop for TransientObject {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "revoked transient download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove transient download"),
        }
    }
}

/// Save downloaded podcast audio into `output_dir` as `{title}.mp3`.
///
/// An existing file with the same name is replaced.
pub async fn save_podcast_audio(
    bytes: &[u8],
    output_dir: &Path,
    title: &str,
) -> Result<PathBuf, SaveError> {
    if !output_dir.is_dir() {
        return Err(SaveError::DirectoryNotFound(output_dir.to_path_buf()));
    }

    let target = output_dir.join(audio_filename(title));
    let object = TransientObject::stage(bytes, &target).await?;
    object.persist(&target).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::tempdir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn filename_uses_title() {
        assert_eq!(audio_filename("Morning Brief"), "Morning Brief.mp3");
        assert_eq!(audio_filename("a/b:c"), "abc.mp3");
        assert_eq!(audio_filename("  "), "podcast.mp3");
    }

    #[tokio::test]
    async fn save_leaves_only_the_final_file() {
        let dir = tempdir().unwrap();

        let path = save_podcast_audio(b"audio", dir.path(), "Morning Brief")
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("Morning Brief.mp3"));
        assert_eq!(std::fs::read(&path).unwrap(), b"audio");
        assert_eq!(entries(dir.path()), ["Morning Brief.mp3"]);
    }

    #[tokio::test]
    async fn unpersisted_object_is_revoked_on_drop() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("show.mp3");

        let object = TransientObject::stage(b"audio", &target).await.unwrap();
        assert!(object.path().exists());
        assert_eq!(object.path(), dir.path().join("show.mp3.partial"));

        drop(object);

        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn failed_persist_still_revokes() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("show.mp3");
        let object = TransientObject::stage(b"audio", &target).await.unwrap();

        let result = object.persist(&dir.path().join("missing/show.mp3")).await;

        assert!(matches!(result, Err(SaveError::PersistFailed { .. })));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn missing_output_dir_is_rejected() {
        let dir = tempdir().unwrap();

        let result = save_podcast_audio(b"audio", &dir.path().join("nope"), "x").await;

        assert!(matches!(result, Err(SaveError::DirectoryNotFound(_))));
    }
}
