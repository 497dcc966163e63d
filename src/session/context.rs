//! Mutable context threaded through every phase handler.
//!
//! Holds the reconnect bookkeeping and collects the [`Action`]s a
//! transition produces.  Handlers never perform I/O; they only push actions
//! here for the service to execute.

use core::time::Duration;

use log::warn;

use crate::events::{EventPayload, EventTopic};

/// Upper bound on actions produced by one event.
pub const MAX_ACTIONS: usize = 4;

/// Side effects requested by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Ask the transport whether the broker session is already up.
    CheckBroker,
    /// Publish the discovery set (once per session).
    PublishDiscovery,
    /// Subscribe to the command topic.
    Subscribe,
    /// Decode and apply an inbound command.
    HandleCommand(EventPayload),
    /// Reconnect the link after a fixed delay.
    Reconnect { after: Duration },
    /// Attempt ceiling reached.  Emitted once per exhaustion.
    ReconnectExhausted { attempts: u8 },
}

pub type Actions = heapless::Vec<Action, MAX_ACTIONS>;

pub struct SessionContext {
    /// Consecutive link failures since the last established session.
    pub reconnect_attempts: u8,
    /// Ceiling for `reconnect_attempts`.
    pub max_attempts: u8,
    pub reconnect_delay: Duration,
    /// Only messages on this topic are routed as commands.
    pub command_topic: EventTopic,
    /// Set once the exhaustion notice has gone out.
    pub exhausted_reported: bool,
    actions: Actions,
}

impl SessionContext {
    pub fn new(command_topic: EventTopic, max_attempts: u8, reconnect_delay: Duration) -> Self {
        Self {
            reconnect_attempts: 0,
            max_attempts,
            reconnect_delay,
            command_topic,
            exhausted_reported: false,
            actions: Actions::new(),
        }
    }

    pub fn push(&mut self, action: Action) {
        if let Err(dropped) = self.actions.push(action) {
            warn!("Session action dropped, buffer full: {:?}", dropped);
        }
    }

    /// Drain the actions collected for the current event.
    pub(super) fn take_actions(&mut self) -> Actions {
        core::mem::take(&mut self.actions)
    }

    /// True while automatic reconnects are still allowed.
    pub fn can_retry(&self) -> bool {
        self.reconnect_attempts < self.max_attempts
    }
}
