//! The seam between the core and whatever serves HTTP.
//!
//! A transport exposes three things: a way to set the response head, a writable
//! byte sink, and a notification that fires once the peer disconnects.

use crate::connection::Sink;
use crate::error::{Error, ErrorKind, Result, WriteErrorKind};
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

pub trait Transport {
    /// Sets the response status and headers. Called once, before any write.
    fn write_head(&mut self, status: StatusCode, headers: HeaderMap);

    /// The sink that frames for this connection are written to.
    fn sink(&self) -> Arc<dyn Sink>;

    /// Resolves once the peer has gone away.
    fn closed(&self) -> BoxFuture<'static, ()>;
}

/// Sink backed by an unbounded channel of whole frames.
///
/// The channel keeps frames intact and in order, and writing never waits on
/// the remote peer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: UnboundedSender<Bytes>,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<Bytes>) -> Self {
        Self { sender }
    }
}

impl Sink for ChannelSink {
    fn write(&self, frame: Bytes) -> Result<()> {
        self.sender.send(frame).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Write(WriteErrorKind::Closed),
        })
    }
}

/// Transport whose body is the receiving half of a channel.
///
/// The owner of the receiver turns it into a response body. Dropping the
/// receiver (for example when the HTTP server drops a finished body) is the
/// disconnect signal.
#[derive(Debug)]
pub struct ChannelTransport {
    sender: UnboundedSender<Bytes>,
    status: StatusCode,
    headers: HeaderMap,
}

impl ChannelTransport {
    pub fn new() -> (Self, UnboundedReceiver<Bytes>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let transport = Self {
            sender,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        };
        (transport, receiver)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_head(self) -> (StatusCode, HeaderMap) {
        (self.status, self.headers)
    }
}

impl Transport for ChannelTransport {
    fn write_head(&mut self, status: StatusCode, headers: HeaderMap) {
        self.status = status;
        self.headers = headers;
    }

    fn sink(&self) -> Arc<dyn Sink> {
        Arc::new(ChannelSink::new(self.sender.clone()))
    }

    fn closed(&self) -> BoxFuture<'static, ()> {
        let sender = self.sender.clone();
        async move { sender.closed().await }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_closed_resolves_when_receiver_dropped() {
        let (transport, receiver) = ChannelTransport::new();
        let closed = transport.closed();

        drop(receiver);

        tokio::time::timeout(Duration::from_secs(1), closed)
            .await
            .expect("closed future should resolve after receiver drop");
    }

    #[tokio::test]
    async fn test_closed_pending_while_receiver_alive() {
        let (transport, _receiver) = ChannelTransport::new();
        let result = tokio::time::timeout(Duration::from_millis(20), transport.closed()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_write_head_is_recorded() {
        let (mut transport, _receiver) = ChannelTransport::new();
        let mut headers = HeaderMap::new();
        headers.insert("x-test", "1".parse().unwrap());

        transport.write_head(StatusCode::OK, headers);

        assert_eq!(transport.status(), StatusCode::OK);
        assert_eq!(transport.headers().get("x-test").unwrap(), "1");
    }

    #[test]
    fn test_sink_writes_go_to_receiver_in_order() {
        let (transport, mut receiver) = ChannelTransport::new();
        let sink = transport.sink();

        sink.write(Bytes::from_static(b"a")).unwrap();
        sink.write(Bytes::from_static(b"b")).unwrap();

        assert_eq!(receiver.try_recv().unwrap(), Bytes::from_static(b"a"));
        assert_eq!(receiver.try_recv().unwrap(), Bytes::from_static(b"b"));
    }
}
