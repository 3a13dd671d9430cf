//! Infrastructure: concrete implementations of the domain ports.
//!
//! - [`network`] — WebSocket connector and transport (tokio-tungstenite).
//! - [`haptics`] — vibration playback planned by `gamepad-core`.
//! - [`storage`] — TOML settings persistence in the platform config dir.

pub mod haptics;
pub mod network;
pub mod storage;
