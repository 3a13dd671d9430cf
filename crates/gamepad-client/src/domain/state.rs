//! Published connection state.
//!
//! The supervisor owns the single authoritative state value and pushes an
//! immutable [`ConnectionSnapshot`] to observers after every committed
//! transition. Observers (the UI layer) only ever see snapshots; they cannot
//! mutate supervisor state or observe a half-applied transition.

use serde::{Deserialize, Serialize};

/// Lifecycle state of the logical connection.
///
/// A single enum makes the "never `Connecting` and `Connected` at once"
/// invariant structural rather than something to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// No transport open and no attempt in progress.
    #[default]
    Disconnected,
    /// A connect attempt is in flight (watchdog armed).
    Connecting,
    /// The transport is open and frames may be sent.
    Connected,
}

impl ConnectionState {
    /// Returns `true` while a connect attempt is in flight.
    pub fn is_connecting(&self) -> bool {
        matches!(self, ConnectionState::Connecting)
    }

    /// Returns `true` when frames may be sent.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// Immutable snapshot delivered to observers on every transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionSnapshot {
    /// Current lifecycle state.
    pub state: ConnectionState,
    /// Human-readable reason for the most recent failure, if any.
    ///
    /// Cleared at the start of every new `connect()` attempt and preserved
    /// across `disconnect()`, so the UI can keep explaining why the link
    /// dropped until the user retries.
    pub last_error: Option<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
