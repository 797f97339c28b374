pub mod handler;
pub mod hub;
pub mod websocket;

pub use hub::{FeedMessage, SubscriberHub};
