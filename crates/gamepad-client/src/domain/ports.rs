//! Ports: the traits the supervisor drives without knowing the concrete
//! WebSocket library, haptic hardware, or settings storage behind them.
//!
//! The real implementations live in `infrastructure`; tests substitute
//! recording fakes so the whole lifecycle can be exercised without a
//! network or a clock.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use gamepad_core::VibrationCommand;

use crate::domain::event::LinkEvent;

/// Errors reported by transport write operations.
///
/// These never cross the public API: command-frame write failures are logged
/// and the frame is dropped (a newer input event supersedes it), and probe
/// failures are logged only — state transitions are driven exclusively by
/// transport-reported closure.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying write failed or the sink rejected the frame.
    #[error("transport write failed: {0}")]
    Write(String),
}

/// Write half of an open connection.
///
/// Owned exclusively by the supervisor task, so writes are naturally
/// serialized and frames can never interleave.
#[async_trait]
pub trait Transport: Send {
    /// Sends one JSON text frame.
    async fn send_text(&mut self, frame: &str) -> Result<(), TransportError>;

    /// Sends a transport-level liveness frame (WebSocket Ping).
    async fn send_ping(&mut self) -> Result<(), TransportError>;

    /// Closes the connection, best-effort.
    async fn close(&mut self);
}

/// Opens connections in the background.
///
/// `spawn_connect` must not block: it starts the attempt and returns. The
/// outcome arrives later as [`LinkEvent::Transport`] events tagged with
/// `epoch`, which the supervisor uses to discard results from attempts it
/// has already abandoned.
pub trait Connector: Send + Sync {
    fn spawn_connect(&self, url: String, epoch: u64, events: mpsc::UnboundedSender<LinkEvent>);
}

/// Receives decoded vibration commands.
///
/// The implementation triggers the device haptic engine (or records the
/// command in tests). Invoked synchronously from the supervisor task, so it
/// must be cheap; pulse scheduling belongs to the implementor.
pub trait HapticSink: Send + Sync {
    fn vibrate(&self, command: VibrationCommand);
}
