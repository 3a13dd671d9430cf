//! The public handle to the connection supervisor.
//!
//! [`GamepadLink::start`] spawns the supervisor task and returns a cheap,
//! cloneable handle. Every method is non-blocking: commands are pushed onto
//! the supervisor's event channel and applied in order, and state is
//! observed through a `watch` channel of [`ConnectionSnapshot`]s.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use gamepad_core::{ButtonAction, ControlCommand, Stick};

use crate::application::supervisor::Supervisor;
use crate::domain::config::ConnectionConfig;
use crate::domain::event::{LinkCommand, LinkEvent};
use crate::domain::ports::{Connector, HapticSink};
use crate::domain::state::ConnectionSnapshot;
use crate::infrastructure::storage::SettingsStore;

/// Everything the supervisor needs at startup.
pub struct LinkOptions {
    /// Initial endpoint. May be changed later via `set_endpoint`.
    pub config: ConnectionConfig,
    /// Opens connections in the background.
    pub connector: Arc<dyn Connector>,
    /// Receives decoded vibration commands.
    pub haptics: Arc<dyn HapticSink>,
    /// Persists endpoint changes, when present.
    pub store: Option<Arc<dyn SettingsStore>>,
}

/// Cloneable, non-blocking handle to a running supervisor.
///
/// Dropping every handle does not stop the supervisor; call
/// [`GamepadLink::shutdown`] for an orderly exit.
#[derive(Clone)]
pub struct GamepadLink {
    commands: mpsc::UnboundedSender<LinkEvent>,
    status: watch::Receiver<ConnectionSnapshot>,
}

impl GamepadLink {
    /// Spawns the supervisor task and returns the handle plus the task's
    /// join handle (resolves after [`GamepadLink::shutdown`]).
    pub fn start(options: LinkOptions) -> (Self, JoinHandle<()>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ConnectionSnapshot::default());
        let supervisor = Supervisor::new(options, events_tx.clone(), status_tx);
        let task = tokio::spawn(supervisor.run(events_rx));
        (Self { commands: events_tx, status: status_rx }, task)
    }

    /// Requests a connect. No-op while connecting or connected.
    pub fn connect(&self) {
        self.send_command(LinkCommand::Connect);
    }

    /// Requests a full teardown. The last error stays published.
    pub fn disconnect(&self) {
        self.send_command(LinkCommand::Disconnect);
    }

    /// Tears down and exits the supervisor task.
    pub fn shutdown(&self) {
        self.send_command(LinkCommand::Shutdown);
    }

    /// Changes the endpoint; takes effect on the next connect attempt and
    /// is persisted when a settings store was provided.
    pub fn set_endpoint(&self, host: impl Into<String>, port: u16) {
        self.send_command(LinkCommand::SetEndpoint { host: host.into(), port });
    }

    /// Sends a button press or release. Dropped silently unless connected.
    pub fn send_button(&self, button: impl Into<String>, action: ButtonAction) {
        self.send_command(LinkCommand::Send(ControlCommand::Button {
            button: button.into(),
            action,
        }));
    }

    /// Sends a joystick position in axis units. Dropped silently unless
    /// connected.
    pub fn send_joystick(&self, stick: Stick, x: i16, y: i16) {
        self.send_command(LinkCommand::Send(ControlCommand::Joystick { stick, x, y }));
    }

    /// Sends an analog trigger value. Dropped silently unless connected.
    pub fn send_trigger(&self, trigger: impl Into<String>, value: u8) {
        self.send_command(LinkCommand::Send(ControlCommand::Trigger {
            trigger: trigger.into(),
            value,
        }));
    }

    /// A receiver that yields a fresh [`ConnectionSnapshot`] after every
    /// committed transition.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionSnapshot> {
        self.status.clone()
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> ConnectionSnapshot {
        self.status.borrow().clone()
    }

    fn send_command(&self, command: LinkCommand) {
        // A send error means the supervisor already exited; commands after
        // shutdown are defined as no-ops.
        let _ = self.commands.send(LinkEvent::Command(command));
    }
}
