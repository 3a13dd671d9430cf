//! gamepad-core library entry point.
//!
//! Shared building blocks for the Remote Gamepad client:
//!
//! - [`protocol`] — the JSON wire protocol: outbound control commands
//!   (buttons, joysticks, triggers) and tolerant decoding of inbound
//!   haptic-feedback frames.
//! - [`domain`] — pure domain logic with no I/O: joystick drag geometry
//!   (radial clamp + axis scaling) and haptic pulse planning.
//!
//! Everything here is deliberately transport-agnostic. The connection
//! lifecycle (WebSocket, timers, reconnection) lives in `gamepad-client`.

/// Domain logic: drag geometry and haptic pulse planning.
pub mod domain;

/// JSON wire protocol types and codecs.
pub mod protocol;

pub use protocol::commands::{ButtonAction, ControlCommand, Stick};
pub use protocol::feedback::{decode_feedback, VibrationCommand};
