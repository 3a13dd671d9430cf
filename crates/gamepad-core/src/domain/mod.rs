//! Pure domain logic shared by presentation layers.
//!
//! Nothing in this module performs I/O or touches the connection; it exists
//! so the geometry and haptics maths can be unit-tested in isolation and
//! reused by any control surface.

pub mod haptics;
pub mod stick;
