//! gamepad-client library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/` and
//! the binary entry point in `main.rs` share the same module tree.
//!
//! The client owns one logical connection to the gamepad server and keeps it
//! alive under unreliable network conditions:
//!
//! 1. `connect()` opens a WebSocket to `ws://{host}:{port}/ws`, guarded by a
//!    5 s watchdog.
//! 2. While connected, discrete input events (buttons, joysticks, triggers)
//!    are encoded as JSON frames and written to the transport; a 15 s
//!    periodic probe detects silently-dead connections.
//! 3. Inbound frames are decoded tolerantly; recognised vibration commands
//!    are routed to the registered haptic callback.
//! 4. When the transport drops, a reconnect attempt is scheduled after a
//!    fixed 5 s delay.
//!
//! All state transitions are serialized through a single supervisor task;
//! the UI layer observes progress through a `watch` channel of immutable
//! snapshots and never receives an error across the API boundary.

/// Application layer: the connection supervisor and its public handle.
pub mod application;

/// Domain layer: connection state, configuration, events, and ports.
pub mod domain;

/// Infrastructure layer: WebSocket transport, settings storage, haptics.
pub mod infrastructure;

pub use application::link::{GamepadLink, LinkOptions};
pub use domain::config::ConnectionConfig;
pub use domain::state::{ConnectionSnapshot, ConnectionState};
