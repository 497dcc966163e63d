//! Mock port adapters for integration tests.
//!
//! Records every broker and link call so tests can assert on the full
//! history without a radio or a broker.

use core::time::Duration;

use envnode::app::events::AppEvent;
use envnode::app::ports::{EventSink, LinkPort, MqttPort};
use envnode::error::{LinkError, Result, TransportError};

// ── Broker call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

// ── MockMqtt ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMqtt {
    pub published: Vec<Published>,
    pub subscriptions: Vec<String>,
    pub connected: bool,
    /// Fail every publish while set.
    pub fail_publish: bool,
    /// Fail every subscribe while set.
    pub fail_subscribe: bool,
}

#[allow(dead_code)]
impl MockMqtt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn retained(&self) -> impl Iterator<Item = &Published> {
        self.published.iter().filter(|p| p.retain)
    }

    pub fn on_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Published> {
        self.published.iter().filter(move |p| p.topic == topic)
    }

    pub fn last_json(&self, topic: &str) -> Option<serde_json::Value> {
        self.on_topic(topic)
            .last()
            .and_then(|p| serde_json::from_slice(&p.payload).ok())
    }

    pub fn clear(&mut self) {
        self.published.clear();
        self.subscriptions.clear();
    }
}

impl MqttPort for MockMqtt {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<()> {
        if self.fail_publish {
            return Err(TransportError::PublishFailed.into());
        }
        self.published.push(Published {
            topic: topic.into(),
            payload: payload.into(),
            retain,
        });
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<()> {
        if self.fail_subscribe {
            return Err(TransportError::SubscribeFailed.into());
        }
        self.subscriptions.push(topic.into());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ── MockLink ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLink {
    pub reconnects: Vec<Duration>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LinkPort for MockLink {
    fn reconnect(&mut self, after: Duration) -> Result<()> {
        self.reconnects.push(after);
        if self.fail {
            return Err(LinkError::ConnectFailed.into());
        }
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
