use axum::extract::ws::Message;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;
use uuid::Uuid;

/// Messages pushed to connected clients
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FeedMessage {
    Status { message: String },
    Price { price: Decimal },
    Error { error: String },
}

impl FeedMessage {
    pub fn connected() -> Self {
        Self::Status {
            message: "Connected to WebSocket Server".to_string(),
        }
    }

    pub fn updating() -> Self {
        Self::Status {
            message: "Updating price...".to_string(),
        }
    }

    pub fn price(price: Decimal) -> Self {
        Self::Price { price }
    }

    pub fn fetch_failed() -> Self {
        Self::Error {
            error: "Failed to fetch price".to_string(),
        }
    }
}

/// Registry of live WebSocket connections and the fan-out over them.
///
/// Each subscriber is represented by the sending half of its connection's
/// unbounded channel, so a slow client never blocks the pipeline or its
/// peers. The hub never closes connections itself: entries are removed by
/// the connection task when its transport closes or errors.
pub struct SubscriberHub {
    subscribers: RwLock<HashMap<Uuid, UnboundedSender<Message>>>,
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a live connection, keyed by a fresh id the connection task uses
    /// to deregister itself on close.
    pub fn register(&self, sender: UnboundedSender<Message>) -> Uuid {
        let id = Uuid::new_v4();
        self.subscribers.write().insert(id, sender);
        debug!("📡 Subscriber {id} registered ({} connected)", self.subscriber_count());
        id
    }

    pub fn remove(&self, id: Uuid) {
        self.subscribers.write().remove(&id);
        debug!("Subscriber {id} removed ({} connected)", self.subscriber_count());
    }

    /// Delivers `message` to every currently writable subscriber. The
    /// subscriber set is snapshotted at call time; connections that are no
    /// longer writable are skipped for this message, not removed.
    pub fn broadcast(&self, message: &FeedMessage) {
        let Ok(json) = serde_json::to_string(message) else {
            return;
        };

        let snapshot: Vec<UnboundedSender<Message>> =
            self.subscribers.read().values().cloned().collect();
        for sender in snapshot {
            if sender.is_closed() {
                continue;
            }
            let _ = sender.send(Message::Text(json.clone()));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for SubscriberHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio::sync::mpsc;

    fn text_of(message: Message) -> String {
        match message {
            Message::Text(text) => text,
            other => panic!("expected text frame, got {other:?}"),
        }
    }

    #[test]
    fn test_message_wire_shapes() {
        assert_eq!(
            serde_json::to_string(&FeedMessage::connected()).unwrap(),
            r#"{"message":"Connected to WebSocket Server"}"#
        );
        assert_eq!(
            serde_json::to_string(&FeedMessage::updating()).unwrap(),
            r#"{"message":"Updating price..."}"#
        );
        assert_eq!(
            serde_json::to_string(&FeedMessage::price(dec!(3200.50))).unwrap(),
            r#"{"price":3200.5}"#
        );
        assert_eq!(
            serde_json::to_string(&FeedMessage::fetch_failed()).unwrap(),
            r#"{"error":"Failed to fetch price"}"#
        );
    }

    #[test]
    fn test_broadcast_with_no_subscribers() {
        let hub = SubscriberHub::new();
        hub.broadcast(&FeedMessage::updating());
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn test_broadcast_reaches_all_subscribers() {
        let hub = SubscriberHub::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register(tx1);
        hub.register(tx2);

        hub.broadcast(&FeedMessage::price(dec!(3250.75)));

        assert_eq!(text_of(rx1.try_recv().unwrap()), r#"{"price":3250.75}"#);
        assert_eq!(text_of(rx2.try_recv().unwrap()), r#"{"price":3250.75}"#);
    }

    #[test]
    fn test_unwritable_subscriber_is_skipped_not_removed() {
        let hub = SubscriberHub::new();
        let (tx_open, mut rx_open) = mpsc::unbounded_channel();
        let (tx_closed, rx_closed) = mpsc::unbounded_channel();
        hub.register(tx_open);
        hub.register(tx_closed);
        drop(rx_closed);

        hub.broadcast(&FeedMessage::updating());

        assert!(rx_open.try_recv().is_ok());
        // still tracked, removal only happens on the connection's own close
        assert_eq!(hub.subscriber_count(), 2);
    }

    #[test]
    fn test_register_and_remove() {
        let hub = SubscriberHub::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = hub.register(tx);
        assert_eq!(hub.subscriber_count(), 1);

        hub.remove(id);
        assert_eq!(hub.subscriber_count(), 0);
    }
}
