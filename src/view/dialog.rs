use crate::error::FormError;
use crate::podcast::{DEFAULT_WORD_COUNT, PodcastCreate};

pub const MIN_WORD_COUNT: u32 = 100;
pub const MAX_WORD_COUNT: u32 = 2000;
pub const WORD_COUNT_STEP: u32 = 50;

/// Labelled slider marks
pub const WORD_COUNT_MARKS: [u32; 4] = [100, 500, 1000, 2000];

/// State of the create-podcast form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePodcastForm {
    pub title: String,
    pub content: String,
    word_count: u32,
}

impl Default for CreatePodcastForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            word_count: DEFAULT_WORD_COUNT,
        }
    }
}

impl CreatePodcastForm {
    pub fn word_count(&self) -> u32 {
        self.word_count
    }

    /// Move the slider; values snap to the nearest step within range
    pub fn set_word_count(&mut self, value: u32) {
        let clamped = value.clamp(MIN_WORD_COUNT, MAX_WORD_COUNT);
        let steps = (clamped - MIN_WORD_COUNT + WORD_COUNT_STEP / 2) / WORD_COUNT_STEP;
        self.word_count = (MIN_WORD_COUNT + steps * WORD_COUNT_STEP).min(MAX_WORD_COUNT);
    }

    /// Validate and produce the request, resetting the form on success
    pub fn submit(&mut self) -> Result<PodcastCreate, FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingTitle);
        }
        if self.content.trim().is_empty() {
            return Err(FormError::MissingContent);
        }

        let request = PodcastCreate {
            title: std::mem::take(&mut self.title),
            content: std::mem::take(&mut self.content),
            word_count: self.word_count,
        };
        self.word_count = DEFAULT_WORD_COUNT;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_five_hundred_words() {
        assert_eq!(CreatePodcastForm::default().word_count(), 500);
    }

    #[test]
    fn word_count_snaps_and_clamps() {
        let mut form = CreatePodcastForm::default();

        form.set_word_count(20);
        assert_eq!(form.word_count(), MIN_WORD_COUNT);
        form.set_word_count(5000);
        assert_eq!(form.word_count(), MAX_WORD_COUNT);
        form.set_word_count(1020);
        assert_eq!(form.word_count(), 1000);
        form.set_word_count(1030);
        assert_eq!(form.word_count(), 1050);
    }

    #[test]
    fn submit_requires_title_and_content() {
        let mut form = CreatePodcastForm {
            content: "body".to_string(),
            ..Default::default()
        };
        assert_eq!(form.submit(), Err(FormError::MissingTitle));

        form.title = "Title".to_string();
        form.content = "  ".to_string();
        assert_eq!(form.submit(), Err(FormError::MissingContent));
        assert_eq!(form.title, "Title", "failed submit keeps input");
    }

    #[test]
    fn submit_resets_form() {
        let mut form = CreatePodcastForm {
            title: "Title".to_string(),
            content: "Body".to_string(),
            ..Default::default()
        };
        form.set_word_count(1500);

        let request = form.submit().unwrap();

        assert_eq!(
            request,
            PodcastCreate {
                title: "Title".to_string(),
                content: "Body".to_string(),
                word_count: 1500,
            }
        );
        assert_eq!(form, CreatePodcastForm::default());
    }
}
