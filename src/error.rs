use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the upload connection itself
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Connection closed: {0}")]
    Closed(String),
}

/// Errors that can occur when opening an upload session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No authentication token available")]
    MissingToken,

    #[error("Invalid upload base URL {url}: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Upload base URL {0} cannot carry path segments")]
    UnsupportedEndpoint(String),

    #[error("Failed to connect to {endpoint}: {source}")]
    ConnectFailed {
        /// Endpoint with the token segment redacted
        endpoint: String,
        #[source]
        source: TransportError,
    },
}

/// Errors returned by the podcast REST client
#[derive(Error, Debug)]
pub enum PodcastError {
    #[error("HTTP request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Podcast not found at {url}")]
    NotFound { url: String },

    #[error("HTTP error {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur while saving a downloaded podcast
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Output directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Failed to write to file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    PersistFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors from the create-podcast form
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Content is required")]
    MissingContent,
}

/// Errors that can occur while assembling settings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {name} URL {value}: {source}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("No upload URL configured (set --ws-url or SEARCHCAST_WS_URL)")]
    MissingUploadUrl,

    #[error("Failed to read token file {path}: {source}")]
    TokenReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
