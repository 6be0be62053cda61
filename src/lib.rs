pub mod config;
pub mod error;
pub mod http;
pub mod podcast;
pub mod progress;
pub mod upload;
pub mod view;

// Re-export main types for convenience
pub use config::{DEFAULT_API_URL, Settings, default_token_path, read_token_file};
pub use error::{ConfigError, FormError, PodcastError, SaveError, SessionError, TransportError};
pub use http::{ApiRequest, ApiResponse, HttpClient, ReqwestClient};
pub use podcast::{Podcast, PodcastClient, PodcastCreate, PodcastUpdate, StatusTone};
pub use progress::{NoopReporter, ProgressEvent, ProgressReporter, SharedProgressReporter};
pub use upload::{
    ConnectionState, Connector, DroppedFile, FileState, FileTransferStatus, StatusBoard,
    UploadSession, WsConnector,
};
pub use view::{PlayerState, PodcastPage, PodcastRow};
