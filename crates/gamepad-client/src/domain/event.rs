//! The tagged event union consumed by the supervisor task.
//!
//! Every source of work — caller commands, transport completions, timer
//! fires — funnels through one mpsc channel of [`LinkEvent`]s into the
//! single supervisor task. That channel is the serialization point: no two
//! transitions can ever race, because there is exactly one consumer.

use std::fmt;

use gamepad_core::ControlCommand;

use crate::domain::ports::Transport;

/// The three timers the supervisor owns, one cancellable slot each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// One-shot, 5 s: connect attempt watchdog.
    ConnectTimeout,
    /// Periodic, 15 s: liveness probe while connected.
    LivenessProbe,
    /// One-shot, 5 s: delay before an automatic reconnect.
    ReconnectDelay,
}

/// Why a transport stopped being usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseCause {
    /// The connect attempt itself failed (refused, unreachable, handshake).
    ConnectFailed(String),
    /// An I/O error on an established connection.
    TransportError(String),
    /// The server closed the connection without a reason.
    PeerClosed,
    /// The server closed the connection with a close frame carrying a reason.
    Closed { reason: String },
    /// The transport hinted the connection is degraded and should be redone.
    ReconnectSuggested,
}

impl CloseCause {
    /// The human-readable message published on the snapshot.
    pub fn user_message(&self) -> String {
        match self {
            CloseCause::ConnectFailed(e) => format!("Could not reach the server: {e}"),
            CloseCause::TransportError(e) => format!("Connection error: {e}"),
            CloseCause::PeerClosed => "Server closed the connection".to_string(),
            CloseCause::Closed { reason } => format!("Disconnected: {reason}"),
            CloseCause::ReconnectSuggested => "Connection unstable; reconnecting".to_string(),
        }
    }
}

/// Requests from the public handle.
#[derive(Debug)]
pub enum LinkCommand {
    /// Open the connection (no-op while connecting or connected).
    Connect,
    /// Tear down the connection and disarm every timer.
    Disconnect,
    /// Change the endpoint; takes effect on the next connect attempt.
    SetEndpoint { host: String, port: u16 },
    /// Encode and send one input event (no-op unless connected).
    Send(ControlCommand),
    /// Tear down and exit the supervisor task.
    Shutdown,
}

/// Completions reported by the connector and the transport read loop.
///
/// `epoch` identifies the connect attempt that produced the event; the
/// supervisor bumps its epoch whenever it abandons an attempt, so stale
/// completions are recognised and discarded instead of racing fresh ones.
pub enum TransportEvent {
    /// The transport opened; carries the write half.
    Opened {
        epoch: u64,
        transport: Box<dyn Transport>,
    },
    /// The transport closed, failed, or never opened.
    Closed { epoch: u64, cause: CloseCause },
    /// One inbound text frame.
    TextReceived { epoch: u64, frame: String },
}

impl fmt::Debug for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEvent::Opened { epoch, .. } => {
                f.debug_struct("Opened").field("epoch", epoch).finish_non_exhaustive()
            }
            TransportEvent::Closed { epoch, cause } => f
                .debug_struct("Closed")
                .field("epoch", epoch)
                .field("cause", cause)
                .finish(),
            TransportEvent::TextReceived { epoch, frame } => f
                .debug_struct("TextReceived")
                .field("epoch", epoch)
                .field("frame", frame)
                .finish(),
        }
    }
}

/// Everything the supervisor task can be asked to do.
#[derive(Debug)]
pub enum LinkEvent {
    /// A request from the public handle.
    Command(LinkCommand),
    /// A completion from the connector or read loop.
    Transport(TransportEvent),
    /// A timer fired. `generation` must match the owning slot's current
    /// generation or the fire is stale (the slot was re-armed or disarmed
    /// after this fire was already in flight) and is ignored.
    Timer { kind: TimerKind, generation: u64 },
}

// ── Tests ─────────────────────────────────────────────────────────────────────
