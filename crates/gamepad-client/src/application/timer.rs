//! Cancellable timer slots.
//!
//! The supervisor owns one [`TimerSlot`] per [`TimerKind`]. A slot holds at
//! most one live timer: arming implicitly cancels the previous timer, and
//! `disarm` is always safe.
//!
//! # Cancellation races
//!
//! Aborting the sleep task is not enough on its own — a fire may already be
//! sitting in the event channel when the slot is disarmed or re-armed. Each
//! arm therefore bumps a generation counter that is baked into the emitted
//! event; the supervisor asks the slot (`accepts`) whether the firing
//! generation is still current before acting. A cancelled timer can
//! therefore never trigger a transition, no matter how the abort and the
//! fire interleave.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::event::{LinkEvent, TimerKind};

/// One exclusive, cancellable timer.
#[derive(Debug)]
pub struct TimerSlot {
    kind: TimerKind,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    /// Creates a disarmed slot for the given timer kind.
    pub fn new(kind: TimerKind) -> Self {
        Self { kind, generation: 0, handle: None }
    }

    /// Arms a one-shot timer, cancelling any previous timer in this slot.
    ///
    /// After `delay`, a `LinkEvent::Timer` carrying this slot's kind and the
    /// new generation is pushed onto `events`.
    pub fn arm_oneshot(&mut self, delay: Duration, events: &mpsc::UnboundedSender<LinkEvent>) {
        self.disarm();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let kind = self.kind;
        let tx = events.clone();
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(LinkEvent::Timer { kind, generation });
        }));
    }

    /// Arms a periodic timer that fires every `period` until disarmed.
    pub fn arm_periodic(&mut self, period: Duration, events: &mpsc::UnboundedSender<LinkEvent>) {
        self.disarm();
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        let kind = self.kind;
        let tx = events.clone();
        self.handle = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                if tx.send(LinkEvent::Timer { kind, generation }).is_err() {
                    break;
                }
            }
        }));
    }

    /// Cancels the live timer, if any. Idempotent.
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Returns `true` when a fire with this generation should act: the slot
    /// is armed and the generation is current.
    pub fn accepts(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    /// Returns `true` while a timer is live in this slot.
    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// The generation of the most recently armed timer.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.disarm();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
