use std::sync::Arc;

use crate::upload::FileTransferStatus;

/// Events emitted by an upload session for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The upload connection is being opened
    Connecting {
        /// Endpoint with the token segment masked
        endpoint: String,
    },

    /// The upload connection is open
    Connected,

    /// A batch of files was accepted and status rows were created
    BatchAccepted {
        /// Row filenames in display order
        filenames: Vec<String>,
    },

    /// A batch was dropped because the connection was not open
    BatchRejected { file_count: usize },

    /// A status row changed
    FileUpdated {
        /// Display position of the row
        index: usize,
        status: FileTransferStatus,
    },

    /// The server closed the connection or the transport failed
    ConnectionLost { reason: String },

    /// The session stopped waiting for further status events
    Settled {
        succeeded: usize,
        failed: usize,
        unfinished: usize,
    },
}

/// Trait for reporting progress events during an upload session.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
