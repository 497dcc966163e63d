//! Connection supervisor: a function-pointer phase machine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PhaseTable                                                  │
//! │  ┌──────────────────┬──────────────┬────────────────────────┐│
//! │  │ Phase            │ on_enter     │ on_event               ││
//! │  ├──────────────────┼──────────────┼────────────────────────┤│
//! │  │ Disconnected     │ fn(ctx)      │ fn(ctx, ev)->Option<>  ││
//! │  │ Connecting       │ fn(ctx)      │ fn(ctx, ev)->Option<>  ││
//! │  │ Connected        │ fn(ctx)      │ fn(ctx, ev)->Option<>  ││
//! │  │ SubscribePending │ -            │ fn(ctx, ev)->Option<>  ││
//! │  │ Subscribed       │ -            │ fn(ctx, ev)->Option<>  ││
//! │  │ Erroring         │ fn(ctx)      │ fn(ctx, ev)->Option<>  ││
//! │  └──────────────────┴──────────────┴────────────────────────┘│
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each [`SessionEvent`] is handed to `on_event` of the **current** phase.
//! If it names a next phase, the engine moves there and runs its
//! `on_enter`, which may itself name a further phase (transient phases).
//! Handlers are pure: the only output is the list of [`Action`]s returned
//! from [`Supervisor::handle`].

pub mod context;
pub mod states;

use core::time::Duration;

use log::{info, warn};

pub use context::{Action, Actions, SessionContext};

use crate::events::{EventTopic, SessionEvent};

// ---------------------------------------------------------------------------
// Phase identity
// ---------------------------------------------------------------------------

/// Connection lifecycle phases.
/// Must stay in sync with the table built in [`states::build_phase_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Phase {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
    SubscribePending = 3,
    Subscribed = 4,
    Erroring = 5,
}

impl Phase {
    /// Number of phases, sizes the table array.
    pub const COUNT: usize = 6;

    /// Convert an index back to `Phase`.  Out-of-range maps to
    /// `Disconnected` in release builds.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Disconnected,
            1 => Self::Connecting,
            2 => Self::Connected,
            3 => Self::SubscribePending,
            4 => Self::Subscribed,
            5 => Self::Erroring,
            _ => {
                debug_assert!(false, "invalid phase index: {idx}");
                Self::Disconnected
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Runs once on entry.  Returning `Some(next)` chains straight on.
pub type PhaseEnterFn = fn(&mut SessionContext) -> Option<Phase>;

/// Handles one event.  Returns `Some(next)` to transition.
pub type PhaseEventFn = fn(&mut SessionContext, &SessionEvent) -> Option<Phase>;

/// One row in the phase table.
pub struct PhaseDescriptor {
    pub id: Phase,
    pub name: &'static str,
    pub on_enter: Option<PhaseEnterFn>,
    pub on_event: PhaseEventFn,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Owns the session record: current phase plus reconnect bookkeeping.
pub struct Supervisor {
    table: [PhaseDescriptor; Phase::COUNT],
    current: usize,
    ctx: SessionContext,
}

impl Supervisor {
    /// A fresh session in `Disconnected`.  No entry action runs: the first
    /// link attempt is made by bootstrap, not by the supervisor.
    pub fn new(command_topic: &str, max_attempts: u8, reconnect_delay: Duration) -> Self {
        let mut topic = EventTopic::new();
        if topic.push_str(command_topic).is_err() {
            warn!("SESSION: command topic truncated: {}", command_topic);
        }
        Self {
            table: states::build_phase_table(),
            current: Phase::Disconnected as usize,
            ctx: SessionContext::new(topic, max_attempts, reconnect_delay),
        }
    }

    /// Feed one event through the table and return the resulting actions.
    pub fn handle(&mut self, event: &SessionEvent) -> Actions {
        let next = (self.table[self.current].on_event)(&mut self.ctx, event);
        if let Some(mut next) = next {
            // Every chain ends within one pass of the table.
            for _ in 0..Phase::COUNT {
                match self.transition(next) {
                    Some(further) => next = further,
                    None => break,
                }
            }
        }
        self.ctx.take_actions()
    }

    pub fn phase(&self) -> Phase {
        Phase::from_index(self.current)
    }

    pub fn reconnect_attempts(&self) -> u8 {
        self.ctx.reconnect_attempts
    }

    pub fn is_subscribed(&self) -> bool {
        self.phase() == Phase::Subscribed
    }

    fn transition(&mut self, next: Phase) -> Option<Phase> {
        let next_idx = next as usize;
        info!(
            "SESSION: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );
        self.current = next_idx;
        self.table[next_idx].on_enter.and_then(|enter| enter(&mut self.ctx))
    }
}
