mod protocol;
mod session;
mod status;
mod transport;

pub use protocol::{
    BytesMessage, DroppedFile, StatusEvent, UploadForm, guess_content_type, redact_endpoint,
    upload_endpoint,
};
pub use session::{ConnectionState, UploadSession};
pub use status::{
    FileState, FileTransferStatus, READ_COMPLETE_PROGRESS, READ_FAILED_MESSAGE, StatusBoard,
    StatusUpdate,
};
pub use transport::{CloseInfo, Connection, Connector, FrameSink, FrameStream, InboundFrame, WsConnector};
