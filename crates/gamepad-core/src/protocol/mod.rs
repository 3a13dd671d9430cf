//! JSON wire protocol for the gamepad control channel.
//!
//! All frames are JSON text over a message-oriented WebSocket. The two
//! directions carry different information and therefore use separate types:
//!
//! - Client → server: [`commands::ControlCommand`] — discrete input events
//!   (`{"type":"button",...}`, `{"type":"joystick",...}`,
//!   `{"type":"trigger",...}`).
//! - Server → client: free-form JSON objects, of which only the
//!   haptic-feedback shape is recognised (see [`feedback::decode_feedback`]).
//!   Everything else is ignored without error, because a mismatched or
//!   misbehaving server must never destabilise the connection.

pub mod commands;
pub mod feedback;
