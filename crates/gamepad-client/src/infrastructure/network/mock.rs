//! Recording fakes for the network ports.
//!
//! These let lifecycle tests drive the supervisor through every transition
//! without a socket: [`PendingConnector`] records connect attempts and never
//! resolves them (the test injects the outcome as an event by hand), and
//! [`RecordingTransport`] records everything written to it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::event::LinkEvent;
use crate::domain::ports::{Connector, Transport, TransportError};

/// A connector that records each attempt and leaves it pending.
#[derive(Debug, Default)]
pub struct PendingConnector {
    attempts: Mutex<Vec<(String, u64)>>,
}

impl PendingConnector {
    /// The `(url, epoch)` of every attempt so far, in order.
    pub fn attempts(&self) -> Vec<(String, u64)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

impl Connector for PendingConnector {
    fn spawn_connect(&self, url: String, epoch: u64, _events: mpsc::UnboundedSender<LinkEvent>) {
        self.attempts.lock().unwrap().push((url, epoch));
    }
}

/// A connector that immediately reports every attempt as refused.
#[derive(Debug, Default)]
pub struct RefusingConnector {
    attempts: Mutex<Vec<(String, u64)>>,
}

impl RefusingConnector {
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

impl Connector for RefusingConnector {
    fn spawn_connect(&self, url: String, epoch: u64, events: mpsc::UnboundedSender<LinkEvent>) {
        self.attempts.lock().unwrap().push((url, epoch));
        let _ = events.send(LinkEvent::Transport(
            crate::domain::event::TransportEvent::Closed {
                epoch,
                cause: crate::domain::event::CloseCause::ConnectFailed(
                    "connection refused".to_string(),
                ),
            },
        ));
    }
}

/// Shared log of everything a [`RecordingTransport`] was asked to do.
#[derive(Debug, Default)]
pub struct RecordingTransportLog {
    inner: Mutex<LogInner>,
}

#[derive(Debug, Default)]
struct LogInner {
    frames: Vec<String>,
    pings: usize,
    closed: bool,
}

impl RecordingTransportLog {
    pub fn frames(&self) -> Vec<String> {
        self.inner.lock().unwrap().frames.clone()
    }

    pub fn ping_count(&self) -> usize {
        self.inner.lock().unwrap().pings
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }
}

/// A transport that records writes into a shared [`RecordingTransportLog`].
///
/// With `fail_writes` set, every write returns an error while still being
/// recorded, for exercising the send-failure paths.
pub struct RecordingTransport {
    log: Arc<RecordingTransportLog>,
    fail_writes: bool,
}

impl RecordingTransport {
    /// A working transport plus the log it writes into.
    pub fn new() -> (Box<dyn Transport>, Arc<RecordingTransportLog>) {
        let log = Arc::new(RecordingTransportLog::default());
        (Box::new(Self { log: Arc::clone(&log), fail_writes: false }), log)
    }

    /// A transport whose writes all fail (after being recorded).
    pub fn failing() -> (Box<dyn Transport>, Arc<RecordingTransportLog>) {
        let log = Arc::new(RecordingTransportLog::default());
        (Box::new(Self { log: Arc::clone(&log), fail_writes: true }), log)
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_text(&mut self, frame: &str) -> Result<(), TransportError> {
        self.log.inner.lock().unwrap().frames.push(frame.to_string());
        if self.fail_writes {
            return Err(TransportError::Write("broken pipe".to_string()));
        }
        Ok(())
    }

    async fn send_ping(&mut self) -> Result<(), TransportError> {
        self.log.inner.lock().unwrap().pings += 1;
        if self.fail_writes {
            return Err(TransportError::Write("broken pipe".to_string()));
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.log.inner.lock().unwrap().closed = true;
    }
}
