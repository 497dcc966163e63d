//! Concrete phase handlers and table builder.
//!
//! ```text
//!  DISCONNECTED ──[link up]──▶ CONNECTING ──[broker accepts]──▶ CONNECTED
//!       ▲                          ▲                               │
//!       │                          │ [broker lost]        (discovery, subscribe)
//!       │                          │                               ▼
//!       │                     SUBSCRIBED ◀──[subscribe ack]── SUBSCRIBE_PENDING
//!       │
//!   ERRORING ◀──[link down / transport error]── any phase
//! ```
//!
//! `Erroring` and `Connected` are transient: their `on_enter` always names
//! the next phase.

use log::{debug, info, warn};

use super::context::{Action, SessionContext};
use super::{Phase, PhaseDescriptor};
use crate::events::SessionEvent;

/// Build the static phase table.  Called once per supervisor.
pub fn build_phase_table() -> [PhaseDescriptor; Phase::COUNT] {
    [
        PhaseDescriptor {
            id: Phase::Disconnected,
            name: "Disconnected",
            on_enter: Some(disconnected_enter),
            on_event: disconnected_event,
        },
        PhaseDescriptor {
            id: Phase::Connecting,
            name: "Connecting",
            on_enter: Some(connecting_enter),
            on_event: connecting_event,
        },
        PhaseDescriptor {
            id: Phase::Connected,
            name: "Connected",
            on_enter: Some(connected_enter),
            on_event: session_event,
        },
        PhaseDescriptor {
            id: Phase::SubscribePending,
            name: "SubscribePending",
            on_enter: None,
            on_event: subscribe_pending_event,
        },
        PhaseDescriptor {
            id: Phase::Subscribed,
            name: "Subscribed",
            on_enter: None,
            on_event: subscribed_event,
        },
        PhaseDescriptor {
            id: Phase::Erroring,
            name: "Erroring",
            on_enter: Some(erroring_enter),
            on_event: erroring_event,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISCONNECTED
// ═══════════════════════════════════════════════════════════════════════════

fn disconnected_enter(ctx: &mut SessionContext) -> Option<Phase> {
    if ctx.can_retry() {
        ctx.push(Action::Reconnect {
            after: ctx.reconnect_delay,
        });
    } else if !ctx.exhausted_reported {
        ctx.exhausted_reported = true;
        warn!(
            "SESSION: {} consecutive link failures, auto-reconnect stopped",
            ctx.reconnect_attempts
        );
        ctx.push(Action::ReconnectExhausted {
            attempts: ctx.reconnect_attempts,
        });
    }
    None
}

fn disconnected_event(_ctx: &mut SessionContext, event: &SessionEvent) -> Option<Phase> {
    match event {
        SessionEvent::LinkUp => Some(Phase::Connecting),
        // A failed reconnect attempt surfaces as another link-down.
        SessionEvent::LinkDown => Some(Phase::Erroring),
        // No session to fault.
        SessionEvent::TransportError(e) => {
            debug!("SESSION: ignoring transport error while disconnected: {}", e);
            None
        }
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTING (link up, waiting for the broker)
// ═══════════════════════════════════════════════════════════════════════════

fn connecting_enter(ctx: &mut SessionContext) -> Option<Phase> {
    ctx.push(Action::CheckBroker);
    None
}

fn connecting_event(_ctx: &mut SessionContext, event: &SessionEvent) -> Option<Phase> {
    match event {
        SessionEvent::BrokerConnected => Some(Phase::Connected),
        SessionEvent::LinkDown | SessionEvent::TransportError(_) => Some(Phase::Erroring),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CONNECTED (transient: kick off discovery and subscription)
// ═══════════════════════════════════════════════════════════════════════════

fn connected_enter(ctx: &mut SessionContext) -> Option<Phase> {
    if ctx.reconnect_attempts > 0 {
        info!(
            "SESSION: established after {} failed attempts",
            ctx.reconnect_attempts
        );
    }
    ctx.reconnect_attempts = 0;
    ctx.exhausted_reported = false;
    ctx.push(Action::PublishDiscovery);
    ctx.push(Action::Subscribe);
    Some(Phase::SubscribePending)
}

/// Shared by every phase that owns a broker session.
fn session_event(_ctx: &mut SessionContext, event: &SessionEvent) -> Option<Phase> {
    match event {
        SessionEvent::LinkDown | SessionEvent::TransportError(_) => Some(Phase::Erroring),
        SessionEvent::BrokerDisconnected => Some(Phase::Connecting),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SUBSCRIBE_PENDING
// ═══════════════════════════════════════════════════════════════════════════

fn subscribe_pending_event(ctx: &mut SessionContext, event: &SessionEvent) -> Option<Phase> {
    match event {
        SessionEvent::SubscribeAck => Some(Phase::Subscribed),
        _ => session_event(ctx, event),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  SUBSCRIBED
// ═══════════════════════════════════════════════════════════════════════════

fn subscribed_event(ctx: &mut SessionContext, event: &SessionEvent) -> Option<Phase> {
    match event {
        SessionEvent::Message { topic, payload } => {
            if topic.as_str() == ctx.command_topic.as_str() {
                ctx.push(Action::HandleCommand(payload.clone()));
            } else {
                debug!("SESSION: ignoring message on {}", topic);
            }
            None
        }
        _ => session_event(ctx, event),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERRORING (transient: count the failure)
// ═══════════════════════════════════════════════════════════════════════════

fn erroring_enter(ctx: &mut SessionContext) -> Option<Phase> {
    ctx.reconnect_attempts = ctx
        .reconnect_attempts
        .saturating_add(1)
        .min(ctx.max_attempts);
    warn!(
        "SESSION: link failure {}/{}",
        ctx.reconnect_attempts, ctx.max_attempts
    );
    Some(Phase::Disconnected)
}

fn erroring_event(_ctx: &mut SessionContext, _event: &SessionEvent) -> Option<Phase> {
    Some(Phase::Disconnected)
}
