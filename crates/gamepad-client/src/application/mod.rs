//! Application layer: the connection supervisor, its timers, and the public
//! handle callers use to drive it.

pub mod link;
pub mod supervisor;
pub mod timer;
