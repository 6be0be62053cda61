// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use tracing::error;

use crate::http::HttpClient;
use crate::podcast::{Podcast, PodcastClient, PodcastCreate, save_podcast_audio};

use super::dialog::CreatePodcastForm;
use super::list::{PodcastRow, podcast_rows};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient user-facing notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    fn success(message: &str) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.to_string(),
        }
    }

    fn error(message: &str) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.to_string(),
        }
    }
}

/// Coordinates the podcast list, create dialog and player for one search
/// space.
///
/// The list is fetched only when both a space id and a token are known, and
/// is refetched in full after every successful mutation. REST failures are
/// turned into notifications here and never escape.
pub struct PodcastPage<C> {
    client: PodcastClient<C>,
    space_id: Option<i64>,
    token: Option<String>,
    podcasts: Option<Vec<Podcast>>,
    form: CreatePodcastForm,
    dialog_open: bool,
    selected: Option<Podcast>,
    player_open: bool,
    notifications: Vec<Notification>,
}

impl<C: HttpClient> PodcastPage<C> {
    pub fn new(client: PodcastClient<C>, space_id: Option<i64>, token: Option<String>) -> Self {
        Self {
            client,
            space_id,
            token: token.filter(|t| !t.trim().is_empty()),
            podcasts: None,
            form: CreatePodcastForm::default(),
            dialog_open: false,
            selected: None,
            player_open: false,
            notifications: Vec::new(),
        }
    }

    fn key(&self) -> Option<(i64, String)> {
        Some((self.space_id?, self.token.clone()?))
    }

    /// `None` until the first successful fetch
    pub fn podcasts(&self) -> Option<&[Podcast]> {
        self.podcasts.as_deref()
    }

    pub fn rows(&self) -> Vec<PodcastRow> {
        self.podcasts().map(podcast_rows).unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.podcasts.is_none()
    }

    /// Fetch the list; returns whether a request was issued
    pub async fn refresh(&mut self) -> bool {
        let Some((space_id, token)) = self.key() else {
            return false;
        };

        match self.client.list(space_id, &token).await {
            Ok(podcasts) => self.podcasts = Some(podcasts),
            Err(e) => {
                error!(space_id, error = %e, "error fetching podcasts");
                self.notifications
                    .push(Notification::error("Failed to fetch podcasts"));
            }
        }
        true
    }

    pub fn form(&self) -> &CreatePodcastForm {
        &self.form
    }

    /// Form fields stay editable whether or not the dialog is open
    pub fn form_mut(&mut self) -> &mut CreatePodcastForm {
        &mut self.form
    }

    pub fn open_create_dialog(&mut self) {
        self.dialog_open = true;
    }

    pub fn close_create_dialog(&mut self) {
        self.dialog_open = false;
    }

    pub fn is_create_dialog_open(&self) -> bool {
        self.dialog_open
    }

    /// Submit the create form. The dialog closes whenever the form is valid,
    /// whatever the request's outcome.
    pub async fn submit_create_form(&mut self) -> Option<Podcast> {
        match self.form.submit() {
            Ok(data) => {
                self.close_create_dialog();
                self.handle_create(&data).await
            }
            Err(e) => {
                self.notifications.push(Notification::error(&e.to_string()));
                None
            }
        }
    }

    pub async fn handle_create(&mut self, data: &PodcastCreate) -> Option<Podcast> {
        let (space_id, token) = self.key()?;

        match self.client.create(space_id, data, &token).await {
            Ok(podcast) => {
                self.refresh().await;
                self.notifications
                    .push(Notification::success("Podcast creation started"));
                Some(podcast)
            }
            Err(e) => {
                error!(space_id, error = %e, "error creating podcast");
                self.notifications
                    .push(Notification::error("Failed to create podcast"));
                None
            }
        }
    }

    pub async fn handle_delete(&mut self, podcast: &Podcast) -> bool {
        let Some((space_id, token)) = self.key() else {
            return false;
        };

        match self.client.delete(space_id, podcast.id, &token).await {
            Ok(()) => {
                self.refresh().await;
                self.notifications.push(Notification::success("Podcast deleted"));
                true
            }
            Err(e) => {
                error!(space_id, podcast_id = podcast.id, error = %e, "error deleting podcast");
                self.notifications
                    .push(Notification::error("Failed to delete podcast"));
                false
            }
        }
    }

    /// Download the podcast's audio and save it as `{title}.mp3`
    pub async fn handle_download(&mut self, podcast: &Podcast, output_dir: &Path) -> Option<PathBuf> {
        let (space_id, token) = self.key()?;

        let result = match self.client.download(space_id, podcast.id, &token).await {
            Ok(bytes) => save_podcast_audio(&bytes, output_dir, &podcast.title)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok(path) => Some(path),
            Err(e) => {
                error!(space_id, podcast_id = podcast.id, error = %e, "error downloading podcast");
                self.notifications
                    .push(Notification::error("Failed to download podcast"));
                None
            }
        }
    }

    pub fn handle_play(&mut self, podcast: Podcast) {
        self.selected = Some(podcast);
        self.player_open = true;
    }

    pub fn close_player(&mut self) {
        self.player_open = false;
        self.selected = None;
    }

    /// The podcast loaded into the player, while it is open
    pub fn now_playing(&self) -> Option<&Podcast> {
        self.selected.as_ref().filter(|_| self.player_open)
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }
}
