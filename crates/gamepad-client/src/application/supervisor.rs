//! The connection supervisor: one task that owns the whole lifecycle.
//!
//! All state transitions, timer fires, and transport completions arrive as
//! [`LinkEvent`]s on a single mpsc channel and are handled one at a time,
//! so concurrent transitions are impossible by construction. The transport
//! itself does background I/O, but every resulting callback funnels through
//! this channel before touching state.
//!
//! # State machine
//!
//! ```text
//!                 connect()                 transport opened
//! Disconnected ──────────────> Connecting ──────────────────> Connected
//!      ^                           │                              │
//!      │      watchdog fired (5s,  │                              │ transport
//!      │<──────── no reconnect) ───┘        closed / I/O error    │ closed
//!      │<─────────────────────────────────────────────────────────┘
//!      │                                    (reconnect in 5 s)
//! ```
//!
//! Timeouts deliberately do not reconnect: no answer within the deadline
//! usually means a wrong address, which retrying cannot fix. Transport
//! closures are transient faults and schedule one retry after a fixed
//! delay; if that retry fails the same way, the cycle repeats.
//!
//! # Epochs
//!
//! Every connect attempt is tagged with a monotonically increasing epoch.
//! Whenever the supervisor abandons an attempt (timeout, disconnect, new
//! connect) it bumps the epoch, so completions from abandoned transports —
//! a late open, a stale close, frames from a half-dead socket — are
//! recognised and discarded instead of corrupting the current attempt.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use gamepad_core::{decode_feedback, ControlCommand};

use crate::application::link::LinkOptions;
use crate::application::timer::TimerSlot;
use crate::domain::config::ConnectionConfig;
use crate::domain::event::{CloseCause, LinkCommand, LinkEvent, TimerKind, TransportEvent};
use crate::domain::ports::{Connector, HapticSink, Transport};
use crate::domain::state::{ConnectionSnapshot, ConnectionState};
use crate::infrastructure::storage::SettingsStore;

/// Deadline for a connect attempt to produce an open transport.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Period of the liveness probe while connected.
pub const PROBE_PERIOD: Duration = Duration::from_secs(15);
/// Fixed delay before an automatic reconnect attempt.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Error text published when the connect watchdog fires.
const TIMEOUT_ERROR: &str = "Connection timeout. Check the server address and try again.";

/// Owns the connection state machine. See the module docs for the protocol.
pub struct Supervisor {
    config: ConnectionConfig,
    state: ConnectionState,
    last_error: Option<String>,
    /// Tag of the current connect attempt; bumped whenever an attempt is
    /// abandoned so stale transport events can be discarded.
    epoch: u64,
    /// Write half of the open transport, present only while `Connected`.
    transport: Option<Box<dyn Transport>>,
    connect_timeout: TimerSlot,
    liveness_probe: TimerSlot,
    reconnect_delay: TimerSlot,
    /// Loops back into our own event channel (timers, connector).
    events_tx: mpsc::UnboundedSender<LinkEvent>,
    status_tx: watch::Sender<ConnectionSnapshot>,
    connector: Arc<dyn Connector>,
    haptics: Arc<dyn HapticSink>,
    store: Option<Arc<dyn SettingsStore>>,
}

impl Supervisor {
    /// Creates a supervisor in the `Disconnected` state.
    ///
    /// `events_tx` must be the sender side of the channel whose receiver is
    /// later passed to [`Supervisor::run`]; timers and the connector report
    /// back through it.
    pub fn new(
        options: LinkOptions,
        events_tx: mpsc::UnboundedSender<LinkEvent>,
        status_tx: watch::Sender<ConnectionSnapshot>,
    ) -> Self {
        Self {
            config: options.config,
            state: ConnectionState::Disconnected,
            last_error: None,
            epoch: 0,
            transport: None,
            connect_timeout: TimerSlot::new(TimerKind::ConnectTimeout),
            liveness_probe: TimerSlot::new(TimerKind::LivenessProbe),
            reconnect_delay: TimerSlot::new(TimerKind::ReconnectDelay),
            events_tx,
            status_tx,
            connector: options.connector,
            haptics: options.haptics,
            store: options.store,
        }
    }

    /// Consumes events until a `Shutdown` command arrives, then tears down
    /// and exits. No timer can fire after this returns: teardown disarms
    /// every slot, and dropping the slots aborts their tasks besides.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<LinkEvent>) {
        while let Some(event) = events.recv().await {
            let stop = matches!(event, LinkEvent::Command(LinkCommand::Shutdown));
            self.handle_event(event).await;
            if stop {
                break;
            }
        }
        debug!("supervisor task exited");
    }

    /// Applies one event to the state machine.
    ///
    /// Public so lifecycle tests can drive the machine deterministically
    /// without a clock or a network.
    pub async fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Command(LinkCommand::Connect) => self.on_connect(),
            LinkEvent::Command(LinkCommand::Disconnect) => self.on_disconnect().await,
            LinkEvent::Command(LinkCommand::Shutdown) => self.on_disconnect().await,
            LinkEvent::Command(LinkCommand::SetEndpoint { host, port }) => {
                self.on_set_endpoint(host, port);
            }
            LinkEvent::Command(LinkCommand::Send(command)) => self.on_send(command).await,
            LinkEvent::Transport(TransportEvent::Opened { epoch, transport }) => {
                self.on_opened(epoch, transport);
            }
            LinkEvent::Transport(TransportEvent::Closed { epoch, cause }) => {
                self.on_closed(epoch, cause);
            }
            LinkEvent::Transport(TransportEvent::TextReceived { epoch, frame }) => {
                self.on_text(epoch, &frame);
            }
            LinkEvent::Timer { kind, generation } => self.on_timer(kind, generation).await,
        }
    }

    // ── Lifecycle transitions ─────────────────────────────────────────────────

    fn on_connect(&mut self) {
        // Idempotent while an attempt is in flight or a transport is open:
        // no duplicate transport, no watchdog reset.
        if self.state != ConnectionState::Disconnected {
            debug!(state = ?self.state, "connect ignored; already in progress");
            return;
        }

        let url = match self.config.endpoint_url() {
            Ok(url) => url,
            Err(e) => {
                // Configuration error: stays Disconnected, no transport,
                // no retry — the user has to fix the endpoint.
                warn!("refusing to connect: {e}");
                self.last_error = Some(format!("Invalid server address: {e}"));
                self.publish();
                return;
            }
        };

        info!(%url, "opening control channel");
        self.last_error = None;
        self.state = ConnectionState::Connecting;
        self.epoch += 1;
        // A manual connect during the reconnect window supersedes the
        // pending automatic retry; the watchdog and the reconnect delay
        // are never armed together.
        self.reconnect_delay.disarm();
        self.connector.spawn_connect(url, self.epoch, self.events_tx.clone());
        self.connect_timeout.arm_oneshot(CONNECT_TIMEOUT, &self.events_tx);
        self.liveness_probe.arm_periodic(PROBE_PERIOD, &self.events_tx);
        self.publish();
    }

    /// Full teardown. Safe from any state; always ends `Disconnected` with
    /// every timer disarmed. The last error is deliberately preserved so
    /// the UI can keep explaining the failure until the next `connect()`.
    async fn on_disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
        // Orphan any in-flight connect attempt.
        self.epoch += 1;
        self.connect_timeout.disarm();
        self.liveness_probe.disarm();
        self.reconnect_delay.disarm();
        self.state = ConnectionState::Disconnected;
        self.publish();
    }

    fn on_set_endpoint(&mut self, host: String, port: u16) {
        self.config.host = host;
        self.config.port = port;
        debug!(host = %self.config.host, port = self.config.port, "endpoint updated");
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.config) {
                warn!("failed to persist endpoint: {e}");
            }
        }
    }

    async fn on_send(&mut self, command: ControlCommand) {
        // Silent no-op when not connected: input events are fire-and-forget
        // and a stale event is worthless by the time the link is back.
        if self.state != ConnectionState::Connected {
            debug!(?command, "dropping command; not connected");
            return;
        }
        let frame = match command.to_frame() {
            Ok(frame) => frame,
            Err(e) => {
                // Dropped, never surfaced: a newer event supersedes it.
                warn!("failed to encode command: {e}");
                return;
            }
        };
        if let Some(transport) = self.transport.as_mut() {
            if let Err(e) = transport.send_text(&frame).await {
                warn!("failed to send frame: {e}");
            }
        }
    }

    // ── Transport completions ─────────────────────────────────────────────────

    fn on_opened(&mut self, epoch: u64, transport: Box<dyn Transport>) {
        if epoch != self.epoch || self.state != ConnectionState::Connecting {
            // An attempt we already abandoned finally opened; close it in
            // the background so it cannot linger as a duplicate transport.
            debug!(epoch, "discarding stale transport");
            tokio::spawn(async move {
                let mut stale = transport;
                stale.close().await;
            });
            return;
        }

        info!("control channel connected");
        self.transport = Some(transport);
        self.state = ConnectionState::Connected;
        self.last_error = None;
        self.connect_timeout.disarm();
        self.publish();
    }

    fn on_closed(&mut self, epoch: u64, cause: CloseCause) {
        if epoch != self.epoch || self.state == ConnectionState::Disconnected {
            debug!(epoch, ?cause, "ignoring stale close");
            return;
        }

        warn!(?cause, "control channel lost");
        self.last_error = Some(cause.user_message());
        self.transport = None;
        self.state = ConnectionState::Disconnected;
        // Invariant: the watchdog is disarmed before the reconnect delay is
        // armed, so the two are never live at the same time.
        self.connect_timeout.disarm();
        self.liveness_probe.disarm();
        self.epoch += 1;
        self.reconnect_delay.arm_oneshot(RECONNECT_DELAY, &self.events_tx);
        self.publish();
    }

    fn on_text(&mut self, epoch: u64, frame: &str) {
        if epoch != self.epoch || self.state != ConnectionState::Connected {
            return;
        }
        // Anything unrecognised decodes to None and is dropped here; a
        // misbehaving server must never destabilise the connection.
        if let Some(command) = decode_feedback(frame) {
            if !command.is_idle() {
                self.haptics.vibrate(command);
            }
        }
    }

    // ── Timer fires ───────────────────────────────────────────────────────────

    async fn on_timer(&mut self, kind: TimerKind, generation: u64) {
        match kind {
            TimerKind::ConnectTimeout => {
                if !self.connect_timeout.accepts(generation) {
                    return;
                }
                self.connect_timeout.disarm();
                if self.state != ConnectionState::Connecting {
                    return;
                }
                warn!("connect attempt timed out");
                self.last_error = Some(TIMEOUT_ERROR.to_string());
                self.state = ConnectionState::Disconnected;
                self.epoch += 1;
                self.liveness_probe.disarm();
                // No reconnect: a timeout is user-actionable misconfiguration,
                // not a transient fault.
                self.publish();
            }
            TimerKind::LivenessProbe => {
                if !self.liveness_probe.accepts(generation) {
                    return;
                }
                if self.state != ConnectionState::Connected {
                    return;
                }
                if let Some(transport) = self.transport.as_mut() {
                    // A failed probe is not itself a transition; only a
                    // transport-reported closure drives state.
                    if let Err(e) = transport.send_ping().await {
                        debug!("liveness probe failed: {e}");
                    }
                }
            }
            TimerKind::ReconnectDelay => {
                if !self.reconnect_delay.accepts(generation) {
                    return;
                }
                self.reconnect_delay.disarm();
                if self.state != ConnectionState::Disconnected {
                    return;
                }
                info!("reconnect delay elapsed; retrying");
                self.on_disconnect().await;
                self.on_connect();
            }
        }
    }

    // ── Publishing ────────────────────────────────────────────────────────────

    /// Pushes an immutable snapshot of the committed state to observers.
    fn publish(&self) {
        self.status_tx.send_replace(ConnectionSnapshot {
            state: self.state,
            last_error: self.last_error.clone(),
        });
    }

    // ── Introspection (used by tests and diagnostics) ─────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Most recent published error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Epoch of the current connect attempt.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the given timer slot currently holds a live timer.
    pub fn is_timer_armed(&self, kind: TimerKind) -> bool {
        self.slot(kind).is_armed()
    }

    /// Generation a fire must carry for the given slot to act on it.
    pub fn timer_generation(&self, kind: TimerKind) -> u64 {
        self.slot(kind).generation()
    }

    /// Number of live timers across all three slots.
    pub fn armed_timer_count(&self) -> usize {
        [&self.connect_timeout, &self.liveness_probe, &self.reconnect_delay]
            .iter()
            .filter(|slot| slot.is_armed())
            .count()
    }

    fn slot(&self, kind: TimerKind) -> &TimerSlot {
        match kind {
            TimerKind::ConnectTimeout => &self.connect_timeout,
            TimerKind::LivenessProbe => &self.liveness_probe,
            TimerKind::ReconnectDelay => &self.reconnect_delay,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
