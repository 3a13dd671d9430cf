//! Haptic playback.
//!
//! The supervisor hands decoded [`VibrationCommand`]s to a [`HapticSink`];
//! this module provides the two stock sinks. Pulse planning itself (how
//! long, how hard, how many pulses) is pure and lives in
//! `gamepad_core::domain::haptics`.

use std::sync::Mutex;

use tracing::{debug, info};

use gamepad_core::domain::haptics::plan;
use gamepad_core::VibrationCommand;

use crate::domain::ports::HapticSink;

/// Plays vibration commands by logging the planned pulse train.
///
/// On a headless host there is no vibration hardware; this sink makes the
/// feedback path observable end to end. A device port would replace it with
/// one that drives the platform haptic engine from the same plan.
#[derive(Debug, Default)]
pub struct LogHaptics;

impl HapticSink for LogHaptics {
    fn vibrate(&self, command: VibrationCommand) {
        match plan(command) {
            Some(p) => info!(
                left = command.left,
                right = command.right,
                strength = ?p.strength,
                repetitions = p.repetitions,
                "vibration"
            ),
            None => debug!("idle vibration ignored"),
        }
    }
}

/// Records every command it receives, for tests.
#[derive(Debug, Default)]
pub struct RecordingHaptics {
    commands: Mutex<Vec<VibrationCommand>>,
}

impl RecordingHaptics {
    pub fn commands(&self) -> Vec<VibrationCommand> {
        self.commands.lock().unwrap().clone()
    }
}

impl HapticSink for RecordingHaptics {
    fn vibrate(&self, command: VibrationCommand) {
        self.commands.lock().unwrap().push(command);
    }
}
