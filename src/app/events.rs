//! Outbound application events.
//!
//! The [`SyncService`](super::service::SyncService) and the
//! [`TelemetryCycle`](crate::telemetry::TelemetryCycle) emit these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use core::time::Duration;

use super::commands::CommandIntent;
use crate::error::Error;
use crate::session::Phase;
use crate::state::{ActuatorState, DeviceSnapshot};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service is up (carries the resolved device id).
    Started { device_id: heapless::String<12> },

    /// One telemetry cycle ran.  `published` is false when the session
    /// was not subscribed and the document was dropped.
    Telemetry {
        snapshot: DeviceSnapshot,
        published: bool,
    },

    /// A command was applied to shared state.
    CommandApplied {
        intent: CommandIntent,
        state: ActuatorState,
    },

    /// A command payload could not be parsed.  Nothing changed.
    CommandRejected(Error),

    /// The supervisor moved between phases.
    PhaseChanged { from: Phase, to: Phase },

    /// The discovery set was published.
    DiscoveryPublished { count: usize },

    /// A link reconnect was requested.
    ReconnectScheduled { attempt: u8, after: Duration },

    /// A port call failed and was fed back as a session fault, or
    /// automatic reconnects stopped at the ceiling.
    SessionFault(Error),
}
