//! Outbound control commands: the client → server half of the wire protocol.
//!
//! Every command is a JSON object with a `"type"` field identifying the
//! variant; all other fields are flattened into the same object:
//!
//! ```json
//! {"type":"button","button":"a","action":"press"}
//! {"type":"joystick","stick":"left","x":32767,"y":0}
//! {"type":"trigger","trigger":"lt","value":255}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles the discriminant
//! automatically.

use serde::{Deserialize, Serialize};

/// Well-known button names used by the standard on-screen layout.
///
/// The wire protocol accepts any string, so custom layouts may send names
/// outside this list; these constants only exist so callers and tests do not
/// scatter string literals.
pub mod buttons {
    pub const A: &str = "a";
    pub const B: &str = "b";
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const LEFT_BUMPER: &str = "lb";
    pub const RIGHT_BUMPER: &str = "rb";
    pub const LEFT_TRIGGER: &str = "lt";
    pub const RIGHT_TRIGGER: &str = "rt";
    pub const LEFT_STICK: &str = "ls";
    pub const RIGHT_STICK: &str = "rs";
    pub const BACK: &str = "back";
    pub const HOME: &str = "home";
    pub const START: &str = "start";
    pub const DPAD_UP: &str = "up";
    pub const DPAD_DOWN: &str = "down";
    pub const DPAD_LEFT: &str = "left";
    pub const DPAD_RIGHT: &str = "right";
}

/// Button transition: the finger went down or came back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonAction {
    Press,
    Release,
}

/// Which physical joystick an axis pair belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stick {
    Left,
    Right,
}

/// All commands the client can send to the gamepad server.
///
/// Constructed transiently per user interaction and dropped after encoding;
/// nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlCommand {
    /// A named button was pressed or released.
    Button {
        /// Button identifier (`a`, `b`, `lb`, `start`, ...).
        button: String,
        /// Press or release.
        action: ButtonAction,
    },
    /// A joystick moved. Axes are pre-clamped by the caller to
    /// [-32767, 32767] (see `domain::stick`).
    Joystick { stick: Stick, x: i16, y: i16 },
    /// An analog trigger changed position.
    Trigger {
        /// Trigger identifier (`lt` or `rt` on the standard layout).
        trigger: String,
        /// Position, 0 (released) to 255 (fully pulled).
        value: u8,
    },
}

impl ControlCommand {
    /// Encodes this command as a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error when serialization fails.
    /// Callers on the hot input path log and drop the frame rather than
    /// propagate: input events are latency-sensitive and a newer event
    /// supersedes a dropped one.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
