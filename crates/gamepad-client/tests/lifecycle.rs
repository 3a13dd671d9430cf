//! Connection lifecycle integration tests.
//!
//! Most tests drive the supervisor state machine directly: they construct a
//! [`Supervisor`], feed it hand-crafted [`LinkEvent`]s (including timer
//! fires carrying the correct generation), and assert on the resulting
//! state, timers, and recorded transport traffic. No sockets, no real time.
//!
//! The last few tests go end to end through the [`GamepadLink`] handle on a
//! paused tokio clock, so the actual timer wiring is exercised as well.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use gamepad_client::application::supervisor::{
    Supervisor, CONNECT_TIMEOUT, RECONNECT_DELAY,
};
use gamepad_client::application::link::{GamepadLink, LinkOptions};
use gamepad_client::domain::config::ConnectionConfig;
use gamepad_client::domain::event::{CloseCause, LinkCommand, LinkEvent, TimerKind, TransportEvent};
use gamepad_client::domain::ports::{Connector, HapticSink};
use gamepad_client::domain::state::{ConnectionSnapshot, ConnectionState};
use gamepad_client::infrastructure::haptics::RecordingHaptics;
use gamepad_client::infrastructure::network::mock::{
    PendingConnector, RecordingTransport, RefusingConnector,
};
use gamepad_client::infrastructure::storage::{MemorySettingsStore, SettingsStore};
use gamepad_core::{ButtonAction, ControlCommand, Stick, VibrationCommand};

// ── Harness ───────────────────────────────────────────────────────────────────

struct Harness {
    supervisor: Supervisor,
    connector: Arc<PendingConnector>,
    haptics: Arc<RecordingHaptics>,
    store: Arc<MemorySettingsStore>,
    status: watch::Receiver<ConnectionSnapshot>,
}

fn harness() -> Harness {
    let connector = Arc::new(PendingConnector::default());
    let haptics = Arc::new(RecordingHaptics::default());
    let store = Arc::new(MemorySettingsStore::default());
    let (events_tx, _events_rx) = mpsc::unbounded_channel();
    let (status_tx, status) = watch::channel(ConnectionSnapshot::default());
    let options = LinkOptions {
        config: ConnectionConfig::default(),
        connector: Arc::clone(&connector) as Arc<dyn Connector>,
        haptics: Arc::clone(&haptics) as Arc<dyn HapticSink>,
        store: Some(Arc::clone(&store) as Arc<dyn SettingsStore>),
    };
    let supervisor = Supervisor::new(options, events_tx, status_tx);
    Harness { supervisor, connector, haptics, store, status }
}

impl Harness {
    async fn connect(&mut self) {
        self.supervisor
            .handle_event(LinkEvent::Command(LinkCommand::Connect))
            .await;
    }

    /// Drives the machine to `Connected` with a recording transport.
    async fn connect_and_open(
        &mut self,
    ) -> Arc<gamepad_client::infrastructure::network::mock::RecordingTransportLog> {
        self.connect().await;
        let (transport, log) = RecordingTransport::new();
        let epoch = self.supervisor.epoch();
        self.supervisor
            .handle_event(LinkEvent::Transport(TransportEvent::Opened { epoch, transport }))
            .await;
        assert_eq!(self.supervisor.state(), ConnectionState::Connected);
        log
    }

    /// A timer-fire event carrying the slot's current generation.
    fn timer_fire(&self, kind: TimerKind) -> LinkEvent {
        LinkEvent::Timer { kind, generation: self.supervisor.timer_generation(kind) }
    }
}

// ── Connect attempt ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_connect_starts_attempt_and_arms_watchdog_and_probe() {
    // Arrange
    let mut h = harness();

    // Act
    h.connect().await;

    // Assert
    assert_eq!(h.supervisor.state(), ConnectionState::Connecting);
    assert_eq!(h.connector.attempts(), vec![("ws://127.0.0.1:8000/ws".to_string(), 1)]);
    assert!(h.supervisor.is_timer_armed(TimerKind::ConnectTimeout));
    assert!(h.supervisor.is_timer_armed(TimerKind::LivenessProbe));
    assert!(!h.supervisor.is_timer_armed(TimerKind::ReconnectDelay));
    let snapshot = h.status.borrow().clone();
    assert_eq!(snapshot.state, ConnectionState::Connecting);
    assert!(snapshot.last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_connect_while_connecting_is_idempotent() {
    // Arrange
    let mut h = harness();
    h.connect().await;
    let watchdog_generation = h.supervisor.timer_generation(TimerKind::ConnectTimeout);

    // Act: a second connect while the first attempt is in flight
    h.connect().await;

    // Assert: no second attempt, and the watchdog was not reset
    assert_eq!(h.connector.attempt_count(), 1);
    assert_eq!(
        h.supervisor.timer_generation(TimerKind::ConnectTimeout),
        watchdog_generation
    );
}

#[tokio::test(start_paused = true)]
async fn test_invalid_endpoint_records_error_and_stays_disconnected() {
    // Arrange
    let mut h = harness();
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::SetEndpoint {
            host: "   ".to_string(),
            port: 8000,
        }))
        .await;

    // Act
    h.connect().await;

    // Assert: no transport was opened and nothing is scheduled
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert_eq!(h.connector.attempt_count(), 0);
    assert_eq!(h.supervisor.armed_timer_count(), 0);
    let snapshot = h.status.borrow().clone();
    let error = snapshot.last_error.expect("error must be published");
    assert!(error.starts_with("Invalid server address"), "got: {error}");
}

#[tokio::test(start_paused = true)]
async fn test_opened_promotes_to_connected_and_disarms_watchdog() {
    // Arrange
    let mut h = harness();
    h.connect().await;
    let (transport, _log) = RecordingTransport::new();
    let epoch = h.supervisor.epoch();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Opened { epoch, transport }))
        .await;

    // Assert
    assert_eq!(h.supervisor.state(), ConnectionState::Connected);
    assert!(!h.supervisor.is_timer_armed(TimerKind::ConnectTimeout));
    assert!(h.supervisor.is_timer_armed(TimerKind::LivenessProbe));
    let snapshot = h.status.borrow().clone();
    assert_eq!(snapshot.state, ConnectionState::Connected);
    assert!(snapshot.last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stale_epoch_open_is_discarded_and_closed() {
    // Arrange: an attempt, then a teardown that abandons it
    let mut h = harness();
    h.connect().await;
    let stale_epoch = h.supervisor.epoch();
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::Disconnect))
        .await;

    // Act: the abandoned attempt finally opens
    let (transport, log) = RecordingTransport::new();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Opened {
            epoch: stale_epoch,
            transport,
        }))
        .await;
    tokio::task::yield_now().await; // let the spawned close run

    // Assert: still disconnected, and the stale socket was closed
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert!(log.is_closed());
}

// ── Connect timeout ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_watchdog_fire_fails_the_attempt_without_retry() {
    // Arrange
    let mut h = harness();
    h.connect().await;
    let fire = h.timer_fire(TimerKind::ConnectTimeout);

    // Act
    h.supervisor.handle_event(fire).await;

    // Assert: disconnected with the timeout message, nothing scheduled
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert_eq!(
        h.supervisor.last_error(),
        Some("Connection timeout. Check the server address and try again.")
    );
    assert_eq!(h.supervisor.armed_timer_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_open_after_timeout_is_ignored() {
    // Arrange: the watchdog fires, invalidating the attempt
    let mut h = harness();
    h.connect().await;
    let stale_epoch = h.supervisor.epoch();
    let fire = h.timer_fire(TimerKind::ConnectTimeout);
    h.supervisor.handle_event(fire).await;

    // Act: the slow transport opens anyway
    let (transport, log) = RecordingTransport::new();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Opened {
            epoch: stale_epoch,
            transport,
        }))
        .await;
    tokio::task::yield_now().await;

    // Assert
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert!(log.is_closed());
}

#[tokio::test(start_paused = true)]
async fn test_stale_generation_timer_fire_is_ignored() {
    // Arrange: capture a fire, then reach Connected (which disarms the slot)
    let mut h = harness();
    h.connect().await;
    let stale_fire = h.timer_fire(TimerKind::ConnectTimeout);
    let _log = {
        let (transport, log) = RecordingTransport::new();
        let epoch = h.supervisor.epoch();
        h.supervisor
            .handle_event(LinkEvent::Transport(TransportEvent::Opened { epoch, transport }))
            .await;
        log
    };

    // Act: the fire that was already in flight when the slot was disarmed
    h.supervisor.handle_event(stale_fire).await;

    // Assert: no transition happened
    assert_eq!(h.supervisor.state(), ConnectionState::Connected);
    assert!(h.supervisor.last_error().is_none());
}

// ── Transport closure and reconnect ───────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_closed_while_connected_arms_reconnect() {
    // Arrange
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch,
            cause: CloseCause::PeerClosed,
        }))
        .await;

    // Assert: error published, reconnect armed, watchdog and probe disarmed
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert_eq!(h.supervisor.last_error(), Some("Server closed the connection"));
    assert!(h.supervisor.is_timer_armed(TimerKind::ReconnectDelay));
    assert!(!h.supervisor.is_timer_armed(TimerKind::ConnectTimeout));
    assert!(!h.supervisor.is_timer_armed(TimerKind::LivenessProbe));
}

#[tokio::test(start_paused = true)]
async fn test_connect_refusal_arms_reconnect() {
    // Arrange: attempt in flight
    let mut h = harness();
    h.connect().await;
    let epoch = h.supervisor.epoch();

    // Act: the connector reports the attempt failed
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch,
            cause: CloseCause::ConnectFailed("connection refused".to_string()),
        }))
        .await;

    // Assert
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert_eq!(
        h.supervisor.last_error(),
        Some("Could not reach the server: connection refused")
    );
    assert!(h.supervisor.is_timer_armed(TimerKind::ReconnectDelay));
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_fire_retries_and_clears_error() {
    // Arrange: a closed connection with reconnect armed
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch,
            cause: CloseCause::TransportError("reset by peer".to_string()),
        }))
        .await;
    let fire = h.timer_fire(TimerKind::ReconnectDelay);

    // Act
    h.supervisor.handle_event(fire).await;

    // Assert: a fresh attempt with a fresh epoch, error cleared
    assert_eq!(h.supervisor.state(), ConnectionState::Connecting);
    assert_eq!(h.connector.attempt_count(), 2);
    assert!(h.supervisor.last_error().is_none());
    assert!(h.supervisor.is_timer_armed(TimerKind::ConnectTimeout));
    assert!(!h.supervisor.is_timer_armed(TimerKind::ReconnectDelay));
    let attempts = h.connector.attempts();
    assert!(attempts[1].1 > attempts[0].1, "retry must use a newer epoch");
}

#[tokio::test(start_paused = true)]
async fn test_failed_retry_schedules_another_retry() {
    // Arrange: first cycle — close, reconnect fire, attempt fails again
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch,
            cause: CloseCause::PeerClosed,
        }))
        .await;
    let fire = h.timer_fire(TimerKind::ReconnectDelay);
    h.supervisor.handle_event(fire).await;

    // Act: the retry is refused as well
    let retry_epoch = h.supervisor.epoch();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch: retry_epoch,
            cause: CloseCause::ConnectFailed("connection refused".to_string()),
        }))
        .await;

    // Assert: the cycle repeats
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert!(h.supervisor.is_timer_armed(TimerKind::ReconnectDelay));
}

#[tokio::test(start_paused = true)]
async fn test_connect_during_reconnect_window_cancels_pending_retry() {
    // Arrange: a closed connection with the reconnect delay armed
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch,
            cause: CloseCause::PeerClosed,
        }))
        .await;
    let pending_retry = h.timer_fire(TimerKind::ReconnectDelay);

    // Act: the user retries by hand before the delay elapses
    h.connect().await;

    // Assert: the manual attempt supersedes the automatic one — the
    // reconnect delay and the watchdog are never armed together
    assert_eq!(h.supervisor.state(), ConnectionState::Connecting);
    assert!(h.supervisor.is_timer_armed(TimerKind::ConnectTimeout));
    assert!(!h.supervisor.is_timer_armed(TimerKind::ReconnectDelay));
    assert_eq!(h.supervisor.armed_timer_count(), 2);
    assert_eq!(h.connector.attempt_count(), 2);

    // The cancelled retry's fire must not start a third attempt
    h.supervisor.handle_event(pending_retry).await;
    assert_eq!(h.connector.attempt_count(), 2);
    assert_eq!(h.supervisor.state(), ConnectionState::Connecting);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_suggestion_is_treated_as_transient() {
    // Arrange: the transport hints the connection is degraded
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch,
            cause: CloseCause::ReconnectSuggested,
        }))
        .await;

    // Assert: same handling as any other transient closure
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert_eq!(h.supervisor.last_error(), Some("Connection unstable; reconnecting"));
    assert!(h.supervisor.is_timer_armed(TimerKind::ReconnectDelay));
}

#[tokio::test(start_paused = true)]
async fn test_stale_epoch_close_is_ignored() {
    // Arrange: connected on epoch N; a close from epoch N-1 arrives late
    let mut h = harness();
    h.connect_and_open().await;
    let current = h.supervisor.epoch();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch: current - 1,
            cause: CloseCause::PeerClosed,
        }))
        .await;

    // Assert
    assert_eq!(h.supervisor.state(), ConnectionState::Connected);
    assert!(h.supervisor.last_error().is_none());
}

// ── Disconnect ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_disconnect_closes_transport_and_preserves_error() {
    // Arrange: connected, then a failure recorded an error and armed reconnect
    let mut h = harness();
    let log = h.connect_and_open().await;
    let epoch = h.supervisor.epoch();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Closed {
            epoch,
            cause: CloseCause::PeerClosed,
        }))
        .await;

    // Act: explicit disconnect cancels the pending reconnect
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::Disconnect))
        .await;

    // Assert: error stays visible until the next connect
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert_eq!(h.supervisor.last_error(), Some("Server closed the connection"));
    assert_eq!(h.supervisor.armed_timer_count(), 0);
    drop(log);

    // A fresh connect clears the stale error
    h.connect().await;
    assert!(h.supervisor.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_while_connected_closes_the_socket() {
    // Arrange
    let mut h = harness();
    let log = h.connect_and_open().await;

    // Act
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::Disconnect))
        .await;

    // Assert
    assert!(log.is_closed());
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
}

// ── Sending commands ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_send_while_disconnected_is_a_silent_no_op() {
    // Arrange
    let mut h = harness();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::Send(ControlCommand::Button {
            button: "a".to_string(),
            action: ButtonAction::Press,
        })))
        .await;

    // Assert: no state change, no error published
    assert_eq!(h.supervisor.state(), ConnectionState::Disconnected);
    assert!(h.supervisor.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_send_while_connected_writes_encoded_frame() {
    // Arrange
    let mut h = harness();
    let log = h.connect_and_open().await;

    // Act
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::Send(ControlCommand::Joystick {
            stick: Stick::Left,
            x: 16384,
            y: -16384,
        })))
        .await;

    // Assert
    let frames = log.frames();
    assert_eq!(frames.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
    assert_eq!(value["type"], "joystick");
    assert_eq!(value["stick"], "left");
    assert_eq!(value["x"], 16384);
    assert_eq!(value["y"], -16384);
}

#[tokio::test(start_paused = true)]
async fn test_send_failure_does_not_change_state() {
    // Arrange: a transport whose writes fail
    let mut h = harness();
    h.connect().await;
    let (transport, log) = RecordingTransport::failing();
    let epoch = h.supervisor.epoch();
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::Opened { epoch, transport }))
        .await;

    // Act
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::Send(ControlCommand::Trigger {
            trigger: "lt".to_string(),
            value: 255,
        })))
        .await;

    // Assert: the write was attempted, the failure only logged
    assert_eq!(log.frames().len(), 1);
    assert_eq!(h.supervisor.state(), ConnectionState::Connected);
    assert!(h.supervisor.last_error().is_none());
}

// ── Liveness probe ────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_probe_fire_pings_while_connected() {
    // Arrange
    let mut h = harness();
    let log = h.connect_and_open().await;
    let fire = h.timer_fire(TimerKind::LivenessProbe);

    // Act
    h.supervisor.handle_event(fire).await;

    // Assert
    assert_eq!(log.ping_count(), 1);
    assert_eq!(h.supervisor.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_probe_fire_while_connecting_does_nothing() {
    // Arrange: the probe slot is armed from connect() but no transport yet
    let mut h = harness();
    h.connect().await;
    let fire = h.timer_fire(TimerKind::LivenessProbe);

    // Act / Assert: no transport to ping, no panic, no transition
    h.supervisor.handle_event(fire).await;
    assert_eq!(h.supervisor.state(), ConnectionState::Connecting);
}

// ── Inbound feedback ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_vibration_frame_reaches_the_haptic_sink() {
    // Arrange
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::TextReceived {
            epoch,
            frame: r#"{"vibration":{"large_motor":200,"small_motor":50}}"#.to_string(),
        }))
        .await;

    // Assert
    assert_eq!(h.haptics.commands(), vec![VibrationCommand { left: 200, right: 50 }]);
}

#[tokio::test(start_paused = true)]
async fn test_zero_intensity_vibration_does_not_invoke_the_sink() {
    // Arrange
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::TextReceived {
            epoch,
            frame: r#"{"vibration":{"large_motor":0,"small_motor":0}}"#.to_string(),
        }))
        .await;

    // Assert
    assert!(h.haptics.commands().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_malformed_inbound_frame_is_dropped() {
    // Arrange
    let mut h = harness();
    h.connect_and_open().await;
    let epoch = h.supervisor.epoch();

    // Act: garbage, wrong shape, and out-of-range intensities
    for frame in [
        "not json at all",
        r#"{"status":"ok"}"#,
        r#"{"vibration":{"large_motor":900,"small_motor":-3}}"#,
    ] {
        h.supervisor
            .handle_event(LinkEvent::Transport(TransportEvent::TextReceived {
                epoch,
                frame: frame.to_string(),
            }))
            .await;
    }

    // Assert: nothing reached the sink and the connection survived
    assert!(h.haptics.commands().is_empty());
    assert_eq!(h.supervisor.state(), ConnectionState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_stale_epoch_text_is_ignored() {
    // Arrange
    let mut h = harness();
    h.connect_and_open().await;
    let current = h.supervisor.epoch();

    // Act: a frame from a previous connection
    h.supervisor
        .handle_event(LinkEvent::Transport(TransportEvent::TextReceived {
            epoch: current - 1,
            frame: r#"{"vibration":{"large_motor":100,"small_motor":100}}"#.to_string(),
        }))
        .await;

    // Assert
    assert!(h.haptics.commands().is_empty());
}

// ── Endpoint changes ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_set_endpoint_takes_effect_on_next_connect_and_persists() {
    // Arrange
    let mut h = harness();

    // Act
    h.supervisor
        .handle_event(LinkEvent::Command(LinkCommand::SetEndpoint {
            host: "192.168.1.39".to_string(),
            port: 9100,
        }))
        .await;
    h.connect().await;

    // Assert: the new endpoint was dialled and saved
    assert_eq!(h.connector.attempts()[0].0, "ws://192.168.1.39:9100/ws");
    assert_eq!(
        h.store.saved(),
        Some(ConnectionConfig { host: "192.168.1.39".to_string(), port: 9100 })
    );
}

// ── End to end through the handle, paused clock ───────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_end_to_end_connect_timeout_via_real_timers() {
    // Arrange
    let connector = Arc::new(PendingConnector::default());
    let (link, task) = GamepadLink::start(LinkOptions {
        config: ConnectionConfig::default(),
        connector: Arc::clone(&connector) as Arc<dyn Connector>,
        haptics: Arc::new(RecordingHaptics::default()),
        store: None,
    });
    let mut status = link.subscribe();

    // Act
    link.connect();
    // Wait for Connecting, then let the watchdog deadline pass.
    loop {
        status.changed().await.unwrap();
        if status.borrow_and_update().state == ConnectionState::Connecting {
            break;
        }
    }
    tokio::time::advance(CONNECT_TIMEOUT + Duration::from_secs(1)).await;
    loop {
        status.changed().await.unwrap();
        if status.borrow_and_update().state == ConnectionState::Disconnected {
            break;
        }
    }

    // Assert: timeout error published, and no automatic retry followed
    let snapshot = link.snapshot();
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some("Connection timeout. Check the server address and try again.")
    );
    assert_eq!(connector.attempt_count(), 1);

    link.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_refused_connect_retries_after_delay() {
    // Arrange: every attempt is refused immediately
    let connector = Arc::new(RefusingConnector::default());
    let (link, task) = GamepadLink::start(LinkOptions {
        config: ConnectionConfig::default(),
        connector: Arc::clone(&connector) as Arc<dyn Connector>,
        haptics: Arc::new(RecordingHaptics::default()),
        store: None,
    });
    let mut status = link.subscribe();

    // Act
    link.connect();
    // First failure published.
    loop {
        status.changed().await.unwrap();
        let snapshot = status.borrow_and_update().clone();
        if snapshot.state == ConnectionState::Disconnected && snapshot.last_error.is_some() {
            break;
        }
    }
    assert_eq!(connector.attempt_count(), 1);

    // The reconnect delay elapses; the paused clock advances past it.
    tokio::time::advance(RECONNECT_DELAY + Duration::from_secs(1)).await;
    loop {
        tokio::task::yield_now().await;
        if connector.attempt_count() >= 2 {
            break;
        }
    }

    // Assert
    assert!(connector.attempt_count() >= 2, "a retry must have been attempted");
    assert_eq!(
        link.snapshot().last_error.as_deref(),
        Some("Could not reach the server: connection refused")
    );

    link.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_the_supervisor_task() {
    // Arrange
    let (link, task) = GamepadLink::start(LinkOptions {
        config: ConnectionConfig::default(),
        connector: Arc::new(PendingConnector::default()),
        haptics: Arc::new(RecordingHaptics::default()),
        store: None,
    });

    // Act
    link.connect();
    link.shutdown();

    // Assert: the task exits and later commands are harmless no-ops
    task.await.unwrap();
    link.connect();
    assert_eq!(link.snapshot().state, ConnectionState::Disconnected);
}
