// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::SessionError;
use crate::progress::{ProgressEvent, SharedProgressReporter};

use super::protocol::{BytesMessage, DroppedFile, StatusEvent, redact_endpoint, upload_endpoint};
use super::status::{FileState, StatusBoard, StatusUpdate};
use super::transport::{CloseInfo, Connector, FrameSink, FrameStream, InboundFrame};

/// Lifecycle of the upload connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Closed,
    Errored,
}

/// Messages funnelled into the session from read tasks and the transport reader
#[derive(Debug)]
enum SessionMessage {
    FileRead {
        batch: u64,
        file: DroppedFile,
        result: std::io::Result<Vec<u8>>,
    },
    Status(StatusEvent),
    Closed(Option<CloseInfo>),
    Failed(String),
}

/// One upload connection scoped to a search space and token.
///
/// The session is the only writer of its [`StatusBoard`]. File reads and the
/// transport reader run as separate tasks and hand their results over a
/// channel; [`UploadSession::pump`] applies them one at a time. Dropping the
/// session releases the connection.
pub struct UploadSession {
    endpoint: String,
    state: ConnectionState,
    sink: Option<FrameSink>,
    reader: Option<JoinHandle<()>>,
    board: StatusBoard,
    /// Incremented on every accepted drop; reads tagged with an older value
    /// belong to a replaced batch
    batch: u64,
    /// Reads still outstanding across all batches
    pending_reads: usize,
    /// Reads still outstanding for the current batch
    batch_pending: usize,
    sent: usize,
    tx: mpsc::UnboundedSender<SessionMessage>,
    rx: mpsc::UnboundedReceiver<SessionMessage>,
    reporter: SharedProgressReporter,
}

impl UploadSession {
    /// Open a session against `<base_url>/user/upload/<resource_id>/<token>`.
    ///
    /// A missing or blank token fails before any connection attempt.
    pub async fn open<K: Connector + ?Sized>(
        connector: &K,
        base_url: &str,
        resource_id: i64,
        token: Option<&str>,
        reporter: SharedProgressReporter,
    ) -> Result<Self, SessionError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MissingToken)?;

        let url = upload_endpoint(base_url, resource_id, token)?;
        let endpoint = redact_endpoint(&url);

        reporter.report(ProgressEvent::Connecting {
            endpoint: endpoint.clone(),
        });
        debug!(%endpoint, "opening upload connection");

        let connection = connector.connect(&url).await.map_err(|source| {
            error!(%endpoint, error = %source, "upload connection failed");
            SessionError::ConnectFailed {
                endpoint: endpoint.clone(),
                source,
            }
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(forward_frames(connection.stream, tx.clone()));

        info!(%endpoint, "upload connection open");
        reporter.report(ProgressEvent::Connected);

        Ok(Self {
            endpoint,
            state: ConnectionState::Open,
            sink: Some(connection.sink),
            reader: Some(reader),
            board: StatusBoard::default(),
            batch: 0,
            pending_reads: 0,
            batch_pending: 0,
            sent: 0,
            tx,
            rx,
            reporter,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn statuses(&self) -> &StatusBoard {
        &self.board
    }

    /// Endpoint with the token masked, safe for display
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of files handed to the transport so far
    pub fn sent_count(&self) -> usize {
        self.sent
    }

    /// Accept a batch of files, replacing the current status board.
    ///
    /// Returns `false` and leaves the board alone when the connection is not
    /// open. Each accepted file is read on its own task; reads may finish in
    /// any order. Reads still running for a replaced batch are discarded when
    /// they finish.
    pub fn drop_files(&mut self, files: Vec<DroppedFile>) -> bool {
        if !self.is_connected() {
            warn!(
                file_count = files.len(),
                state = ?self.state,
                "upload connection not open, ignoring dropped files"
            );
            self.reporter.report(ProgressEvent::BatchRejected {
                file_count: files.len(),
            });
            return false;
        }

        self.batch += 1;
        self.batch_pending = files.len();
        self.board = StatusBoard::for_batch(files.iter().map(|f| f.name.clone()));
        self.reporter.report(ProgressEvent::BatchAccepted {
            filenames: self
                .board
                .entries()
                .iter()
                .map(|e| e.filename.clone())
                .collect(),
        });

        for file in files {
            self.pending_reads += 1;
            let tx = self.tx.clone();
            let batch = self.batch;
            tokio::spawn(async move {
                let result = tokio::fs::read(&file.path).await;
                // The session may be gone already; the read result is dropped then
                let _ = tx.send(SessionMessage::FileRead { batch, file, result });
            });
        }

        true
    }

    /// Wait for and apply the next read result or transport message.
    ///
    /// Returns `false` without waiting when nothing further can arrive.
    pub async fn pump(&mut self) -> bool {
        if self.pending_reads == 0 && !self.is_connected() {
            return false;
        }

        match self.rx.recv().await {
            Some(message) => {
                self.handle(message).await;
                true
            }
            None => false,
        }
    }

    /// Pump until every file of the current batch has been read and every row
    /// is terminal, or until nothing more can happen. No timeout is applied.
    ///
    /// Files sharing a name share a row, so a terminal row alone does not mean
    /// every file behind it was sent.
    pub async fn run_until_settled(&mut self) -> &StatusBoard {
        while !self.board.is_empty()
            && (!self.board.is_settled() || self.batch_pending > 0)
            && self.pump().await
        {}

        let succeeded = self.board.count(FileState::Success);
        let failed = self.board.count(FileState::Error);
        self.reporter.report(ProgressEvent::Settled {
            succeeded,
            failed,
            unfinished: self.board.len() - succeeded - failed,
        });

        &self.board
    }

    /// Close the connection gracefully if it is still open
    pub async fn close(mut self) {
        if let Some(mut sink) = self.sink.take()
            && self.state == ConnectionState::Open
        {
            if let Err(e) = sink.close().await {
                debug!(error = %e, "error while closing upload connection");
            }
            info!(endpoint = %self.endpoint, "upload connection closed");
        }
        self.state = ConnectionState::Closed;
    }

    async fn handle(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::FileRead {
                batch,
                file,
                result,
            } => {
                self.pending_reads = self.pending_reads.saturating_sub(1);
                if batch != self.batch {
                    debug!(file = %file.name, batch, "discarding read from a replaced batch");
                    return;
                }
                self.batch_pending = self.batch_pending.saturating_sub(1);
                match result {
                    Ok(content) => {
                        self.update(StatusUpdate::ReadCompleted {
                            filename: file.name.clone(),
                        });
                        self.transmit(&file, &content).await;
                    }
                    Err(e) => {
                        warn!(file = %file.name, path = %file.path.display(), error = %e, "failed to read file");
                        self.update(StatusUpdate::ReadFailed { filename: file.name });
                    }
                }
            }
            SessionMessage::Status(event) => {
                debug!(file = %event.filename, kind = %event.kind, progress = ?event.progress, "status event");
                self.update(StatusUpdate::Remote(event));
            }
            SessionMessage::Closed(info) => {
                let reason = match info {
                    Some(CloseInfo { code, reason }) if !reason.is_empty() => {
                        format!("{reason} (code {code})")
                    }
                    Some(CloseInfo { code, .. }) => format!("closed by server (code {code})"),
                    None => "closed by server".to_string(),
                };
                info!(endpoint = %self.endpoint, %reason, "upload connection closed by server");
                self.state = ConnectionState::Closed;
                self.sink = None;
                self.reporter.report(ProgressEvent::ConnectionLost { reason });
            }
            SessionMessage::Failed(reason) => {
                error!(endpoint = %self.endpoint, error = %reason, "upload connection error");
                self.state = ConnectionState::Errored;
                self.sink = None;
                self.reporter.report(ProgressEvent::ConnectionLost { reason });
            }
        }
    }

    async fn transmit(&mut self, file: &DroppedFile, content: &[u8]) {
        let Some(sink) = self.sink.as_mut().filter(|_| self.state == ConnectionState::Open) else {
            warn!(file = %file.name, "connection gone before file could be sent");
            return;
        };

        let payload = match BytesMessage::new(file, content).to_json() {
            Ok(payload) => payload,
            Err(e) => {
                error!(file = %file.name, error = %e, "failed to encode upload message");
                return;
            }
        };

        match sink.send(payload).await {
            Ok(()) => {
                self.sent += 1;
                debug!(file = %file.name, bytes = content.len(), "file sent");
            }
            Err(e) => error!(file = %file.name, error = %e, "failed to send file"),
        }
    }

    fn update(&mut self, update: StatusUpdate) {
        let Some(index) = self.board.position(update.filename()) else {
            debug!(file = %update.filename(), "no status row for update, ignoring");
            return;
        };

        self.board = self.board.apply(&update);
        self.reporter.report(ProgressEvent::FileUpdated {
            index,
            status: self.board.entries()[index].clone(),
        });
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// Transport adapter: parse inbound frames and forward them to the session
async fn forward_frames(mut stream: FrameStream, tx: mpsc::UnboundedSender<SessionMessage>) {
    while let Some(frame) = stream.next().await {
        let message = match frame {
            Ok(InboundFrame::Text(text)) => match StatusEvent::parse(&text) {
                Ok(event) => SessionMessage::Status(event),
                Err(e) => {
                    warn!(error = %e, payload = %text, "dropping malformed status message");
                    continue;
                }
            },
            Ok(InboundFrame::Ignored) => continue,
            Ok(InboundFrame::Close(info)) => {
                let _ = tx.send(SessionMessage::Closed(info));
                return;
            }
            Err(e) => {
                let _ = tx.send(SessionMessage::Failed(e.to_string()));
                return;
            }
        };

        if tx.send(message).is_err() {
            return;
        }
    }

    let _ = tx.send(SessionMessage::Closed(None));
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use futures::channel::mpsc as fmpsc;
    use tempfile::tempdir;
    use url::Url;

    use crate::error::TransportError;
    use crate::progress::{NoopReporter, ProgressReporter};
    use crate::upload::status::{FileTransferStatus, READ_COMPLETE_PROGRESS, READ_FAILED_MESSAGE};
    use crate::upload::transport::Connection;

    type ServerTx = fmpsc::UnboundedSender<Result<InboundFrame, TransportError>>;

    struct MockConnector {
        calls: AtomicUsize,
        connection: Mutex<Option<Connection>>,
        last_url: Mutex<Option<Url>>,
    }

    #[async_trait]
    impl Connector for MockConnector {
        async fn connect(&self, endpoint: &Url) -> Result<Connection, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_url.lock().unwrap() = Some(endpoint.clone());
            self.connection
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| TransportError::Closed("connection refused".to_string()))
        }
    }

    /// Connector plus the server's ends of both channels
    fn mock_server() -> (MockConnector, ServerTx, fmpsc::UnboundedReceiver<String>) {
        let (sent_tx, sent_rx) = fmpsc::unbounded::<String>();
        let (server_tx, server_rx) = fmpsc::unbounded();

        let sink: FrameSink =
            Box::pin(sent_tx.sink_map_err(|e| TransportError::Closed(e.to_string())));
        let stream: FrameStream = Box::pin(server_rx);

        let connector = MockConnector {
            calls: AtomicUsize::new(0),
            connection: Mutex::new(Some(Connection { sink, stream })),
            last_url: Mutex::new(None),
        };

        (connector, server_tx, sent_rx)
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn server_says(server: &ServerTx, json: &str) {
        server
            .unbounded_send(Ok(InboundFrame::Text(json.to_string())))
            .unwrap();
    }

    async fn open(connector: &MockConnector) -> UploadSession {
        UploadSession::open(
            connector,
            "ws://localhost:8000",
            7,
            Some("tok"),
            NoopReporter::shared(),
        )
        .await
        .unwrap()
    }

    fn write_file(dir: &std::path::Path, name: &str, content: &[u8]) -> DroppedFile {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        DroppedFile::from_path(path)
    }

    #[tokio::test]
    async fn missing_token_never_connects() {
        let (connector, _server, _sent) = mock_server();

        for token in [None, Some(""), Some("   ")] {
            let result = UploadSession::open(
                &connector,
                "ws://localhost:8000",
                7,
                token,
                NoopReporter::shared(),
            )
            .await;
            assert!(matches!(result, Err(SessionError::MissingToken)));
        }

        assert_eq!(connector.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn open_connects_to_token_scoped_endpoint() {
        let (connector, _server, _sent) = mock_server();
        let session = open(&connector).await;

        assert!(session.is_connected());
        assert_eq!(session.endpoint(), "ws://localhost:8000/user/upload/7/***");
        let url = connector.last_url.lock().unwrap().clone().unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/user/upload/7/tok");
    }

    #[tokio::test]
    async fn connect_failure_is_reported() {
        let (connector, _server, _sent) = mock_server();
        connector.connection.lock().unwrap().take();

        let result = UploadSession::open(
            &connector,
            "ws://localhost:8000",
            7,
            Some("tok"),
            NoopReporter::shared(),
        )
        .await;

        assert!(matches!(result, Err(SessionError::ConnectFailed { .. })));
    }

    #[tokio::test]
    async fn one_file_sends_one_message_after_read() {
        let dir = tempdir().unwrap();
        let (connector, _server, mut sent) = mock_server();
        let mut session = open(&connector).await;

        let file = write_file(dir.path(), "notes.txt", b"hello world");
        assert!(session.drop_files(vec![file]));
        assert_eq!(
            session.statuses().get("notes.txt").unwrap().state,
            FileState::Pending
        );
        assert!(sent.try_next().is_err(), "nothing may be sent before the read completes");

        assert!(session.pump().await);

        let entry = session.statuses().get("notes.txt").unwrap();
        assert_eq!(entry.state, FileState::Processing);
        assert_eq!(entry.progress, READ_COMPLETE_PROGRESS);

        let raw = sent.try_next().unwrap().unwrap();
        let message: BytesMessage = serde_json::from_str(&raw).unwrap();
        assert_eq!(message.kind, "bytes");
        assert_eq!(message.form.filename, "notes.txt");
        assert_eq!(message.form.content_type, "text/plain");
        assert_eq!(message.content().unwrap(), b"hello world");
        assert!(sent.try_next().is_err(), "exactly one message per file");
        assert_eq!(session.sent_count(), 1);
    }

    #[tokio::test]
    async fn server_events_drive_files_to_completion() {
        let dir = tempdir().unwrap();
        let (connector, server, _sent) = mock_server();
        let mut session = open(&connector).await;

        let files = vec![
            write_file(dir.path(), "a.txt", b"a"),
            write_file(dir.path(), "b.txt", b"b"),
        ];
        session.drop_files(files);

        // Let both reads land before the server answers
        assert!(session.pump().await);
        assert!(session.pump().await);

        server_says(&server, r#"{"filename":"a.txt","type":"progress","progress":60}"#);
        server_says(&server, r#"{"filename":"a.txt","type":"success","message":"Indexed a.txt"}"#);
        server_says(&server, r#"{"filename":"b.txt","type":"error","message":"Unsupported","progress":70}"#);

        let board = session.run_until_settled().await;

        let a = board.get("a.txt").unwrap();
        assert_eq!((a.state, a.progress), (FileState::Success, 100));
        assert_eq!(a.message.as_deref(), Some("Indexed a.txt"));
        let b = board.get("b.txt").unwrap();
        assert_eq!((b.state, b.progress), (FileState::Error, 0));
        assert_eq!(b.message.as_deref(), Some("Unsupported"));
    }

    #[tokio::test]
    async fn malformed_payloads_are_dropped() {
        let dir = tempdir().unwrap();
        let (connector, server, _sent) = mock_server();
        let mut session = open(&connector).await;

        session.drop_files(vec![write_file(dir.path(), "a.txt", b"a")]);
        assert!(session.pump().await);
        let before = session.statuses().clone();

        server_says(&server, "{not json");
        server_says(&server, r#"{"type":"success"}"#);
        server_says(&server, r#"{"filename":"a.txt","type":"progress","progress":55}"#);
        assert!(session.pump().await);

        assert!(session.is_connected());
        assert_ne!(session.statuses(), &before);
        assert_eq!(session.statuses().get("a.txt").unwrap().progress, 55);
    }

    #[tokio::test]
    async fn unreadable_file_is_marked_and_not_sent() {
        let dir = tempdir().unwrap();
        let (connector, _server, mut sent) = mock_server();
        let mut session = open(&connector).await;

        let missing = DroppedFile::from_path(dir.path().join("gone.pdf"));
        session.drop_files(vec![missing]);
        let board = session.run_until_settled().await;

        let entry = board.get("gone.pdf").unwrap();
        assert_eq!(entry.state, FileState::Error);
        assert_eq!(entry.message.as_deref(), Some(READ_FAILED_MESSAGE));
        assert!(sent.try_next().is_err());
    }

    #[tokio::test]
    async fn events_for_unknown_files_are_ignored() {
        let dir = tempdir().unwrap();
        let (connector, server, _sent) = mock_server();
        let mut session = open(&connector).await;

        session.drop_files(vec![write_file(dir.path(), "a.txt", b"a")]);
        assert!(session.pump().await);
        let before = session.statuses().clone();

        server_says(&server, r#"{"filename":"other.txt","type":"success"}"#);
        assert!(session.pump().await);

        assert_eq!(session.statuses(), &before);
    }

    #[tokio::test]
    async fn duplicate_names_share_a_row_but_both_files_are_sent() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("x")).unwrap();
        std::fs::create_dir(dir.path().join("y")).unwrap();
        let (connector, server, mut sent) = mock_server();
        let mut session = open(&connector).await;

        session.drop_files(vec![
            write_file(&dir.path().join("x"), "same.txt", b"first"),
            write_file(&dir.path().join("y"), "same.txt", b"second"),
        ]);
        assert_eq!(session.statuses().len(), 1);

        assert!(session.pump().await);
        assert!(session.pump().await);
        assert_eq!(session.sent_count(), 2);
        assert!(sent.try_next().unwrap().is_some());
        assert!(sent.try_next().unwrap().is_some());

        server_says(&server, r#"{"filename":"same.txt","type":"success","message":"one"}"#);
        server_says(&server, r#"{"filename":"same.txt","type":"error","message":"two"}"#);
        assert!(session.pump().await);
        assert!(session.pump().await);

        let entry = session.statuses().get("same.txt").unwrap();
        assert_eq!(entry.state, FileState::Error);
        assert_eq!(entry.message.as_deref(), Some("two"));
    }

    /// A named pipe whose read blocks until something is written to it
    #[cfg(unix)]
    fn blocking_file(dir: &std::path::Path, name: &str) -> DroppedFile {
        let path = dir.join(name);
        let status = std::process::Command::new("mkfifo")
            .arg(&path)
            .status()
            .unwrap();
        assert!(status.success());
        DroppedFile::from_path(path)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn settling_waits_for_every_read_behind_a_shared_row() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("x")).unwrap();
        std::fs::create_dir(dir.path().join("y")).unwrap();
        let (connector, server, mut sent) = mock_server();
        let mut session = open(&connector).await;

        let late = blocking_file(&dir.path().join("y"), "same.txt");
        session.drop_files(vec![
            write_file(&dir.path().join("x"), "same.txt", b"first"),
            late.clone(),
        ]);

        assert!(session.pump().await);
        assert_eq!(session.sent_count(), 1);
        server_says(&server, r#"{"filename":"same.txt","type":"success"}"#);
        assert!(session.pump().await);
        assert!(session.statuses().is_settled());

        let writer = tokio::task::spawn_blocking(move || std::fs::write(&late.path, b"second"));
        let board = session.run_until_settled().await.clone();
        writer.await.unwrap().unwrap();

        assert_eq!(board.get("same.txt").unwrap().state, FileState::Success);
        assert_eq!(session.sent_count(), 2);
        let contents: Vec<Vec<u8>> = [sent.try_next(), sent.try_next()]
            .into_iter()
            .map(|raw| {
                let message: BytesMessage = serde_json::from_str(&raw.unwrap().unwrap()).unwrap();
                message.content().unwrap()
            })
            .collect();
        assert_eq!(contents, [b"first".to_vec(), b"second".to_vec()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reads_from_a_replaced_batch_are_discarded() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("old")).unwrap();
        std::fs::create_dir(dir.path().join("new")).unwrap();
        let (connector, _server, mut sent) = mock_server();
        let mut session = open(&connector).await;

        session.drop_files(vec![write_file(&dir.path().join("old"), "a.txt", b"OLD")]);
        let fresh = blocking_file(&dir.path().join("new"), "a.txt");
        session.drop_files(vec![fresh.clone()]);

        // Only the old read can arrive while the new one is blocked
        assert!(session.pump().await);

        assert_eq!(
            session.statuses().get("a.txt").unwrap(),
            &FileTransferStatus::pending("a.txt")
        );
        assert_eq!(session.sent_count(), 0);
        assert!(sent.try_next().is_err());

        let writer = tokio::task::spawn_blocking(move || std::fs::write(&fresh.path, b"NEW"));
        assert!(session.pump().await);
        writer.await.unwrap().unwrap();

        let entry = session.statuses().get("a.txt").unwrap();
        assert_eq!((entry.state, entry.progress), (FileState::Processing, READ_COMPLETE_PROGRESS));
        let message: BytesMessage =
            serde_json::from_str(&sent.try_next().unwrap().unwrap()).unwrap();
        assert_eq!(message.content().unwrap(), b"NEW");
    }

    #[tokio::test]
    async fn server_close_rejects_later_drops() {
        let dir = tempdir().unwrap();
        let (connector, server, _sent) = mock_server();
        let reporter = std::sync::Arc::new(RecordingReporter::default());
        let mut session = UploadSession::open(
            &connector,
            "ws://localhost:8000",
            7,
            Some("tok"),
            reporter.clone(),
        )
        .await
        .unwrap();

        server
            .unbounded_send(Ok(InboundFrame::Close(Some(CloseInfo {
                code: 4000,
                reason: "Invalid token".to_string(),
            }))))
            .unwrap();
        assert!(session.pump().await);

        assert_eq!(session.state(), ConnectionState::Closed);
        assert!(!session.pump().await);
        assert!(!session.drop_files(vec![write_file(dir.path(), "a.txt", b"a")]));
        assert!(session.statuses().is_empty());

        let events = reporter.events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            ProgressEvent::ConnectionLost { reason } if reason == "Invalid token (code 4000)"
        )));
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::BatchRejected { file_count: 1 })));
    }

    #[tokio::test]
    async fn transport_error_marks_session_errored() {
        let (connector, server, _sent) = mock_server();
        let mut session = open(&connector).await;

        server
            .unbounded_send(Err(TransportError::Closed("reset by peer".to_string())))
            .unwrap();
        assert!(session.pump().await);

        assert_eq!(session.state(), ConnectionState::Errored);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn close_releases_the_connection() {
        let (connector, _server, mut sent) = mock_server();
        let session = open(&connector).await;

        session.close().await;

        assert_eq!(sent.next().await, None);
    }

    #[tokio::test]
    async fn dropping_the_session_releases_the_connection() {
        let (connector, _server, mut sent) = mock_server();
        let session = open(&connector).await;

        drop(session);

        assert_eq!(sent.next().await, None);
    }

    #[tokio::test]
    async fn settling_an_empty_board_returns_immediately() {
        let (connector, _server, _sent) = mock_server();
        let mut session = open(&connector).await;

        assert!(session.run_until_settled().await.is_empty());
    }
}
