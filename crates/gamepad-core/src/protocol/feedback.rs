//! Inbound haptic-feedback frames: the server → client half of the protocol.
//!
//! The server may send any JSON object; the only shape the client acts on is
//!
//! ```json
//! {"vibration":{"large_motor":200,"small_motor":50}}
//! ```
//!
//! Two field-name schemas exist in the wild for the motor intensities:
//! `large_motor`/`small_motor` and `leftMotor`/`rightMotor`. Both are
//! accepted (serde `alias`), since the client cannot know which server
//! version it is talking to.
//!
//! Decoding is deliberately tolerant: a malformed frame, a missing
//! `vibration` field, a wrong type, or an out-of-range intensity yields
//! `None` — never an error, and never a connection-state change. A server
//! speaking a newer protocol version must not be able to destabilise the
//! link by sending frames we do not understand.

use serde::Deserialize;
use tracing::trace;

/// One decoded vibration command: intensities for the two rumble motors.
///
/// Consumed immediately by the registered haptic callback; not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibrationCommand {
    /// Left (large / low-frequency) motor intensity, 0–255.
    pub left: u8,
    /// Right (small / high-frequency) motor intensity, 0–255.
    pub right: u8,
}

impl VibrationCommand {
    /// Returns `true` when both motors are at rest.
    ///
    /// Zero-intensity commands are treated as a no-op by the dispatcher, so
    /// the haptic callback only ever observes commands with some effect.
    pub fn is_idle(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

/// Envelope for inbound frames; any fields other than `vibration` are ignored.
#[derive(Debug, Deserialize)]
struct FeedbackFrame {
    #[serde(default)]
    vibration: Option<RawVibration>,
}

/// Raw motor intensities as sent on the wire.
///
/// Decoded as `i64` first so that out-of-range values can be rejected
/// explicitly instead of failing (or wrapping) inside serde.
#[derive(Debug, Deserialize)]
struct RawVibration {
    #[serde(rename = "large_motor", alias = "leftMotor", default)]
    left: Option<i64>,
    #[serde(rename = "small_motor", alias = "rightMotor", default)]
    right: Option<i64>,
}

/// Decodes one inbound text frame into a [`VibrationCommand`].
///
/// Returns `None` for anything that is not a well-formed vibration frame:
/// non-JSON text, a missing or mistyped `vibration` field, a missing motor
/// field, or an intensity outside 0–255. Unrecognised message shapes are a
/// normal occurrence (protocol-version skew), not an error.
pub fn decode_feedback(frame: &str) -> Option<VibrationCommand> {
    let parsed: FeedbackFrame = match serde_json::from_str(frame) {
        Ok(p) => p,
        Err(e) => {
            trace!("ignoring undecodable inbound frame: {e}");
            return None;
        }
    };

    let raw = parsed.vibration?;
    let left = in_motor_range(raw.left?)?;
    let right = in_motor_range(raw.right?)?;
    Some(VibrationCommand { left, right })
}

/// Validates a raw wire intensity against the 0–255 motor range.
fn in_motor_range(value: i64) -> Option<u8> {
    u8::try_from(value).ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
