//! Domain entities and ports for the connection manager.
//!
//! This layer holds the types the application and infrastructure layers
//! agree on: the connection configuration, the published state, the tagged
//! event union that serializes all work onto the supervisor task, and the
//! traits (`Transport`, `Connector`, `HapticSink`) that keep the supervisor
//! independent of the concrete WebSocket library and haptic hardware.

pub mod config;
pub mod event;
pub mod ports;
pub mod state;
