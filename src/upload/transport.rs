// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::pin::Pin;

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::TransportError;

/// Outbound half of a connection, accepting text frames
pub type FrameSink = Pin<Box<dyn Sink<String, Error = TransportError> + Send>>;

/// Inbound half of a connection
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<InboundFrame, TransportError>> + Send>>;

/// Close code and reason sent by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

/// A frame received from the server, reduced to what the session cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Close(Option<CloseInfo>),
    /// Binary, ping and pong frames
    Ignored,
}

/// An open connection split into its two halves
pub struct Connection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

/// Opens upload connections; the seam tests replace with in-memory channels
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<Connection, TransportError>;
}

/// Default connector using tokio-tungstenite
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Connection, TransportError> {
        let (socket, _response) = connect_async(endpoint.as_str()).await?;
        let (write, read) = socket.split();

        let sink: FrameSink = Box::pin(
            write
                .sink_map_err(TransportError::from)
                .with(|text: String| async move { Ok::<_, TransportError>(Message::text(text)) }),
        );

        let stream: FrameStream = Box::pin(read.map(|message| {
            let frame = match message? {
                Message::Text(text) => InboundFrame::Text(text.to_string()),
                Message::Close(frame) => InboundFrame::Close(frame.map(|f| CloseInfo {
                    code: u16::from(f.code),
                    reason: f.reason.to_string(),
                })),
                _ => InboundFrame::Ignored,
            };
            Ok(frame)
        }));

        Ok(Connection { sink, stream })
    }
}
