use crate::podcast::{Podcast, StatusTone};

/// One rendered podcast card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodcastRow {
    pub id: i64,
    pub title: String,
    /// `Created Jan 5, 2024`
    pub created: String,
    pub status: String,
    pub tone: StatusTone,
    /// Play and download are offered only for completed podcasts
    pub shows_media_controls: bool,
    /// Media controls stay disabled until the file exists
    pub media_enabled: bool,
}

impl PodcastRow {
    pub fn from_podcast(podcast: &Podcast) -> Self {
        Self {
            id: podcast.id,
            title: podcast.title.clone(),
            created: format!("Created {}", podcast.created_display()),
            status: podcast.status.clone(),
            tone: podcast.tone(),
            shows_media_controls: podcast.is_completed,
            media_enabled: podcast.is_playable(),
        }
    }

    pub fn can_play(&self) -> bool {
        self.shows_media_controls && self.media_enabled
    }

    pub fn can_download(&self) -> bool {
        self.can_play()
    }
}

/// Rows in the order the backend returned them
pub fn podcast_rows(podcasts: &[Podcast]) -> Vec<PodcastRow> {
    podcasts.iter().map(PodcastRow::from_podcast).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn podcast(id: i64, status: &str, is_completed: bool, file_location: Option<&str>) -> Podcast {
        Podcast {
            id,
            title: format!("Podcast {id}"),
            content: String::new(),
            status: status.to_string(),
            is_completed,
            file_location: file_location.map(str::to_string),
            created_at: "2024-01-02T03:04:05".to_string(),
        }
    }

    #[test]
    fn rows_keep_order_and_format_dates() {
        let rows = podcast_rows(&[
            podcast(3, "processing", false, None),
            podcast(1, "completed", true, Some("a.mp3")),
        ]);

        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), [3, 1]);
        assert_eq!(rows[0].created, "Created Jan 2, 2024");
        assert_eq!(rows[0].tone, StatusTone::Warning);
        assert_eq!(rows[1].tone, StatusTone::Success);
    }

    #[test]
    fn media_controls_follow_completion_and_location() {
        let ready = PodcastRow::from_podcast(&podcast(1, "completed", true, Some("a.mp3")));
        assert!(ready.can_play() && ready.can_download());

        let no_file = PodcastRow::from_podcast(&podcast(2, "completed", true, None));
        assert!(no_file.shows_media_controls);
        assert!(!no_file.can_play());

        // Location present but the completed flag disagrees
        let inconsistent = PodcastRow::from_podcast(&podcast(3, "completed", false, Some("a.mp3")));
        assert!(!inconsistent.shows_media_controls);
        assert!(!inconsistent.can_download());
    }

    #[test]
    fn unknown_status_gets_default_tone() {
        let row = PodcastRow::from_podcast(&podcast(1, "queued", false, None));
        assert_eq!(row.tone, StatusTone::Default);
        assert_eq!(row.status, "queued");
    }
}
