mod dialog;
mod list;
mod page;
mod player;

pub use dialog::{
    CreatePodcastForm, MAX_WORD_COUNT, MIN_WORD_COUNT, WORD_COUNT_MARKS, WORD_COUNT_STEP,
};
pub use list::{PodcastRow, podcast_rows};
pub use page::{Notification, NotificationKind, PodcastPage};
pub use player::{PlayerState, VolumeLevel, format_time, resolve_audio_source};
