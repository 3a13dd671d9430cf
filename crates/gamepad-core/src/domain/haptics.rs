//! Haptic pulse planning: turning a vibration command into a pulse schedule.
//!
//! Mobile haptic engines expose discrete impact "taps" rather than a
//! continuously running motor, so a sustained rumble is approximated by a
//! short train of impacts. This module computes that train as data; actually
//! firing the impacts is the presentation layer's job (it owns the haptic
//! hardware handle and the main-thread scheduling rules).
//!
//! The mapping: the stronger motor intensity stretches the total duration
//! between 200 ms and 600 ms, pulses repeat every 100 ms, and intensities
//! above the midpoint use the heavy impact style.

use std::time::Duration;

use crate::protocol::feedback::VibrationCommand;

/// Shortest pulse train, used for the weakest non-zero command.
const BASE_DURATION: Duration = Duration::from_millis(200);
/// Longest pulse train, used at full intensity.
const MAX_DURATION: Duration = Duration::from_millis(600);
/// Spacing between consecutive impacts.
const PULSE_INTERVAL: Duration = Duration::from_millis(100);

/// Impact style for one pulse train.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseStrength {
    Medium,
    Heavy,
}

/// A scheduled train of haptic impacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulsePlan {
    /// Impact style to use for every pulse in the train.
    pub strength: PulseStrength,
    /// Number of impacts to fire.
    pub repetitions: u32,
    /// Delay between consecutive impacts.
    pub interval: Duration,
}

/// Computes the pulse train for a vibration command.
///
/// Returns `None` when both motors are idle: a zero-intensity command means
/// "stop", and with discrete impacts there is nothing to stop.
pub fn plan(cmd: VibrationCommand) -> Option<PulsePlan> {
    let peak = cmd.left.max(cmd.right);
    if peak == 0 {
        return None;
    }

    // Integer millisecond arithmetic; floats would make the 255 → exactly
    // six pulses case depend on rounding.
    let range_ms = (MAX_DURATION - BASE_DURATION).as_millis() as u64;
    let duration_ms = BASE_DURATION.as_millis() as u64 + u64::from(peak) * range_ms / 255;
    let repetitions = (duration_ms / PULSE_INTERVAL.as_millis() as u64) as u32;

    let strength = if peak > 128 {
        PulseStrength::Heavy
    } else {
        PulseStrength::Medium
    };

    Some(PulsePlan {
        strength,
        repetitions,
        interval: PULSE_INTERVAL,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
