use crate::connection::{Connection, ConnectionId};
use crate::encoder::Encode;
use crate::error::Result;
use crate::message::{Event, Group};
use crate::registry::{ClientId, ClientRegistry};
use bytes::Bytes;
use log::*;
use std::sync::Arc;

/// Outcome of one dispatch call.
///
/// Failed writes never abort a fan-out; they are logged and collected here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: Vec<FailedWrite>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedWrite {
    /// `None` when the write targeted a bare connection handle.
    pub client_id: Option<ClientId>,
    pub connection_id: ConnectionId,
}

impl Delivery {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn write(&mut self, client_id: Option<&str>, connection: &Connection, frame: &Bytes) {
        match connection.write(frame.clone()) {
            Ok(()) => self.delivered += 1,
            Err(e) => {
                warn!(
                    "Failed to send SSE event to connection {} of client {}: {e}",
                    connection.id(),
                    client_id.unwrap_or("<none>"),
                );
                self.failed.push(FailedWrite {
                    client_id: client_id.map(str::to_owned),
                    connection_id: connection.id().clone(),
                });
            }
        }
    }
}

/// Encodes events once and writes them to a connection, a client or a group.
pub struct Dispatcher {
    registry: Arc<ClientRegistry>,
    encoder: Arc<dyn Encode>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ClientRegistry>, encoder: Arc<dyn Encode>) -> Self {
        Self { registry, encoder }
    }

    /// Writes one event to exactly one connection. A failed write is reported but
    /// does not remove the connection; disconnect handling does that.
    pub fn send_to_connection(&self, connection: &Connection, event: &Event) -> Result<Delivery> {
        let frame = self.encoder.encode(event)?;

        let mut delivery = Delivery::default();
        delivery.write(None, connection, &frame);
        Ok(delivery)
    }

    /// Writes one event to every connection the client holds right now.
    pub fn send_to_client(&self, group: &Group, client_id: &str, event: &Event) -> Result<Delivery> {
        let Some(connections) = self.registry.connections(group, client_id) else {
            debug!("No SSE client with id {client_id} in group {group}, event dropped");
            return Ok(Delivery::default());
        };

        let frame = self.encoder.encode(event)?;

        let mut delivery = Delivery::default();
        for connection in &connections {
            delivery.write(Some(client_id), connection, &frame);
        }
        Ok(delivery)
    }

    /// Writes one event to every connection of every client in `group`.
    pub fn send_to_group(&self, group: &Group, event: &Event) -> Result<Delivery> {
        let recipients = self.registry.group_connections(group);
        if recipients.is_empty() {
            return Ok(Delivery::default());
        }

        let frame = self.encoder.encode(event)?;

        let mut delivery = Delivery::default();
        for (client_id, connections) in &recipients {
            for connection in connections {
                delivery.write(Some(client_id), connection, &frame);
            }
        }

        debug!(
            "Broadcast SSE event to {} client(s) in group {group}: {} delivered, {} failed",
            recipients.len(),
            delivery.delivered,
            delivery.failed.len()
        );
        Ok(delivery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Sink;
    use crate::encoder::WireEncoder;
    use crate::error::{Error, ErrorKind, WriteErrorKind};
    use crate::transport::ChannelSink;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    #[derive(Default)]
    struct CountingEncoder {
        calls: AtomicUsize,
    }

    impl Encode for CountingEncoder {
        fn encode(&self, event: &Event) -> Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            WireEncoder.encode(event)
        }
    }

    /// Records every frame it receives.
    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<Bytes>>,
    }

    impl Sink for RecordingSink {
        fn write(&self, frame: Bytes) -> Result<()> {
            self.frames.lock().unwrap().push(frame);
            Ok(())
        }
    }

    struct BrokenSink;

    impl Sink for BrokenSink {
        fn write(&self, _frame: Bytes) -> Result<()> {
            Err(Error::new(ErrorKind::Write(WriteErrorKind::Closed)))
        }
    }

    struct Fixture {
        registry: Arc<ClientRegistry>,
        encoder: Arc<CountingEncoder>,
        dispatcher: Dispatcher,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(ClientRegistry::new());
        let encoder = Arc::new(CountingEncoder::default());
        let dispatcher = Dispatcher::new(registry.clone(), encoder.clone());
        Fixture {
            registry,
            encoder,
            dispatcher,
        }
    }

    fn channel_connection() -> (Connection, UnboundedReceiver<Bytes>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Connection::new(Arc::new(ChannelSink::new(tx))), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Bytes>) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn test_send_to_connection_writes_encoded_frame() {
        let f = fixture();
        let (conn, mut rx) = channel_connection();

        let delivery = f
            .dispatcher
            .send_to_connection(&conn, &Event::new("hello"))
            .unwrap();

        assert_eq!(delivery.delivered, 1);
        assert_eq!(drain(&mut rx), vec![Bytes::from_static(b"data:hello\n\n")]);
    }

    #[test]
    fn test_send_to_connection_reports_closed_peer() {
        let f = fixture();
        let (conn, rx) = channel_connection();
        drop(rx);

        let delivery = f
            .dispatcher
            .send_to_connection(&conn, &Event::new("hello"))
            .unwrap();

        assert_eq!(delivery.delivered, 0);
        assert_eq!(delivery.failed[0].connection_id, *conn.id());
        assert_eq!(delivery.failed[0].client_id, None);
    }

    #[test]
    fn test_send_to_client_writes_to_every_connection() {
        let f = fixture();
        let (first, mut first_rx) = channel_connection();
        let (second, mut second_rx) = channel_connection();
        f.registry.register(Group::Default, Some("a".into()), None, first);
        f.registry.register(Group::Default, Some("a".into()), None, second);

        let event = Event::new(json!({"a": 1})).event_type("update").id(7);
        let delivery = f.dispatcher.send_to_client(&Group::Default, "a", &event).unwrap();

        let expected = Bytes::from_static(b"event:update\nid:7\ndata:{\"a\":1}\n\n");
        assert_eq!(delivery.delivered, 2);
        assert_eq!(drain(&mut first_rx), vec![expected.clone()]);
        assert_eq!(drain(&mut second_rx), vec![expected]);
        assert_eq!(f.encoder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_send_to_missing_client_is_a_no_op() {
        let f = fixture();

        let delivery = f
            .dispatcher
            .send_to_client(&Group::Default, "ghost", &Event::new("x"))
            .unwrap();

        assert_eq!(delivery, Delivery::default());
        assert_eq!(f.encoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_send_to_client_in_other_group_is_not_delivered() {
        let f = fixture();
        let (conn, mut rx) = channel_connection();
        f.registry.register(Group::named("red"), Some("a".into()), None, conn);

        f.dispatcher
            .send_to_client(&Group::named("blue"), "a", &Event::new("x"))
            .unwrap();

        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_send_to_group_fans_out_identical_frames() {
        let f = fixture();
        let group = Group::named("room");
        let sinks: Vec<Arc<RecordingSink>> = (0..4).map(|_| Arc::default()).collect();

        // Three clients; the first one holds two connections.
        for (i, sink) in sinks.iter().enumerate() {
            let client_id = format!("client-{}", i.saturating_sub(1));
            f.registry.register(
                group.clone(),
                Some(client_id),
                None,
                Connection::new(sink.clone()),
            );
        }
        assert_eq!(f.registry.client_count(&group), 3);

        let delivery = f
            .dispatcher
            .send_to_group(&group, &Event::new("tick").event_type("clock"))
            .unwrap();

        assert_eq!(delivery.delivered, 4);
        assert_eq!(f.encoder.calls.load(Ordering::SeqCst), 1);
        for sink in &sinks {
            let frames = sink.frames.lock().unwrap();
            assert_eq!(*frames, vec![Bytes::from_static(b"event:clock\ndata:tick\n\n")]);
        }
    }

    #[test]
    fn test_send_to_empty_group_does_no_encoding() {
        let f = fixture();

        let delivery = f
            .dispatcher
            .send_to_group(&Group::Default, &Event::new("x"))
            .unwrap();
        f.dispatcher
            .send_to_group(&Group::named("never-used"), &Event::new("x"))
            .unwrap();

        assert_eq!(delivery.attempted(), 0);
        assert_eq!(f.encoder.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_send_to_group_continues_past_failed_client() {
        let f = fixture();
        let healthy = Arc::new(RecordingSink::default());
        f.registry.register(
            Group::Default,
            Some("broken".into()),
            None,
            Connection::new(Arc::new(BrokenSink)),
        );
        f.registry.register(
            Group::Default,
            Some("healthy".into()),
            None,
            Connection::new(healthy.clone()),
        );

        let delivery = f
            .dispatcher
            .send_to_group(&Group::Default, &Event::new("x"))
            .unwrap();

        assert_eq!(delivery.delivered, 1);
        assert_eq!(delivery.failed.len(), 1);
        assert_eq!(delivery.failed[0].client_id.as_deref(), Some("broken"));
        assert!(!delivery.is_complete());
        assert_eq!(healthy.frames.lock().unwrap().len(), 1);
        // Write failures never deregister a connection.
        assert!(f.registry.lookup(&Group::Default, "broken").is_some());
    }

    #[test]
    fn test_encoding_failure_is_returned_to_caller() {
        let f = fixture();
        let (conn, mut rx) = channel_connection();
        f.registry.register(Group::Default, Some("a".into()), None, conn.clone());

        let event = Event::new("two\nlines");

        assert!(f.dispatcher.send_to_group(&Group::Default, &event).unwrap_err().is_encode());
        assert!(f
            .dispatcher
            .send_to_client(&Group::Default, "a", &event)
            .unwrap_err()
            .is_encode());
        assert!(f.dispatcher.send_to_connection(&conn, &event).unwrap_err().is_encode());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sends_never_interleave_frames() {
        let f = Arc::new(fixture());
        let (conn, mut rx) = channel_connection();
        f.registry.register(Group::Default, Some("a".into()), None, conn);

        let tasks: Vec<_> = (0..4)
            .map(|n| {
                let f = f.clone();
                tokio::spawn(async move {
                    for i in 0..50 {
                        let event = Event::new(format!("task-{n}-{i}"));
                        f.dispatcher.send_to_client(&Group::Default, "a", &event).unwrap();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let frames = drain(&mut rx);
        assert_eq!(frames.len(), 200);
        assert!(frames
            .iter()
            .all(|f| f.starts_with(b"data:task-") && f.ends_with(b"\n\n")));
    }
}
