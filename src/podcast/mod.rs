mod client;
mod model;
mod save;

pub use client::PodcastClient;
pub use model::{DEFAULT_WORD_COUNT, Podcast, PodcastCreate, PodcastUpdate, StatusTone};
pub use save::{AUDIO_EXTENSION, TransientObject, audio_filename, save_podcast_audio};

#[cfg(test)]
pub(crate) use client::tests::{MockHttpClient, podcast_json};
