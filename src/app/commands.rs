//! Inbound commands to the application core.
//!
//! A [`CommandIntent`] is the decoded form of one message on the command
//! topic.  It is produced by [`codec::decode`](crate::codec::decode) and
//! applied to shared state by the
//! [`SyncService`](super::service::SyncService).

use crate::capability::RELAY_COUNT;
use crate::state::ActuatorState;

/// Partial actuator update.  `None` means "leave this channel alone".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandIntent {
    /// Slot `i` drives relay `i + 1`.
    pub relays: [Option<bool>; RELAY_COUNT],
    pub breaker: Option<bool>,
}

impl CommandIntent {
    /// True when the message named no known channel.
    pub fn is_empty(&self) -> bool {
        self.breaker.is_none() && self.relays.iter().all(Option::is_none)
    }

    /// Overwrite the mentioned channels.  Returns `true` if any value changed.
    pub fn apply(&self, state: &mut ActuatorState) -> bool {
        let before = *state;
        for (slot, wanted) in state.relays.iter_mut().zip(self.relays) {
            if let Some(on) = wanted {
                *slot = on;
            }
        }
        if let Some(on) = self.breaker {
            state.breaker = on;
        }
        *state != before
    }
}
