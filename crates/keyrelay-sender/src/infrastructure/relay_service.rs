//! The relay service: the one task that owns the dispatcher.
//!
//! # Why a single owner? (for beginners)
//!
//! Key events arrive from the operator, while connection outcomes and peer
//! bytes arrive from the transport's background task.  Rather than sharing
//! the dispatcher behind a lock, every input becomes a message in one
//! mailbox:
//!
//! ```text
//!  RelayHandle ──RelayCommand──▶ ┐
//!                                ├─▶ mailbox ─▶ RelayService::run ─▶ InputEventDispatcher
//!  TcpTransport ─TransportEvent─▶ ┘
//! ```
//!
//! `run` takes one message at a time, in arrival order, and applies it
//! completely before taking the next, so the state machine never observes a
//! half-finished transition.
//! Transport events from a session that has since been closed are discarded
//! using the transport's [`SessionGate`].

use std::sync::Arc;

use keyrelay_core::KeyId;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::application::dispatch_keys::{InputEventDispatcher, RawKeyEvent};
use crate::application::relay_connection::{ConnectionState, RelayObserver};
use crate::infrastructure::network::{
    SessionGate, TcpTransport, TcpTransportConfig, TransportEvent, TransportSignal,
};
use crate::infrastructure::storage::config::RelayConfig;

/// Returned by [`RelayHandle`] methods once the service has stopped.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("relay service has stopped")]
pub struct RelayStopped;

/// Snapshot of the relay for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStatus {
    pub state: ConnectionState,
    pub pressed: Vec<KeyId>,
}

/// Operator requests delivered to the service.
#[derive(Debug)]
pub enum RelayCommand {
    Key(RawKeyEvent),
    Connect { host: String, port: u16 },
    Disconnect,
    Status(oneshot::Sender<RelayStatus>),
    Shutdown,
}

/// Everything the service loop consumes.
#[derive(Debug)]
enum RelayMessage {
    Command(RelayCommand),
    Transport(TransportEvent),
}

impl From<TransportEvent> for RelayMessage {
    fn from(event: TransportEvent) -> Self {
        RelayMessage::Transport(event)
    }
}

/// Cloneable operator side of the service mailbox.
///
/// The transport also posts into the mailbox, so the channel never closes on
/// its own.  When the last handle clone is dropped it posts a shutdown.
#[derive(Debug, Clone)]
pub struct RelayHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    tx: mpsc::UnboundedSender<RelayMessage>,
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        // The service may already have stopped.
        let _ = self.tx.send(RelayMessage::Command(RelayCommand::Shutdown));
    }
}

impl RelayHandle {
    fn send(&self, command: RelayCommand) -> Result<(), RelayStopped> {
        self.inner
            .tx
            .send(RelayMessage::Command(command))
            .map_err(|_| RelayStopped)
    }

    pub fn key_down(&self, key: KeyId) -> Result<(), RelayStopped> {
        self.send(RelayCommand::Key(RawKeyEvent::KeyDown { key }))
    }

    pub fn key_up(&self, key: KeyId) -> Result<(), RelayStopped> {
        self.send(RelayCommand::Key(RawKeyEvent::KeyUp { key }))
    }

    pub fn connect(&self, host: impl Into<String>, port: u16) -> Result<(), RelayStopped> {
        self.send(RelayCommand::Connect {
            host: host.into(),
            port,
        })
    }

    pub fn disconnect(&self) -> Result<(), RelayStopped> {
        self.send(RelayCommand::Disconnect)
    }

    /// Asks the service for its current state and held keys.
    pub async fn status(&self) -> Result<RelayStatus, RelayStopped> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RelayCommand::Status(reply_tx))?;
        reply_rx.await.map_err(|_| RelayStopped)
    }

    /// Asks the service to close any connection and stop.
    pub fn shutdown(&self) -> Result<(), RelayStopped> {
        self.send(RelayCommand::Shutdown)
    }
}

/// Owns the dispatcher and its TCP transport.
pub struct RelayService {
    dispatcher: InputEventDispatcher<TcpTransport<RelayMessage>>,
    gate: SessionGate,
    mailbox: mpsc::UnboundedReceiver<RelayMessage>,
}

impl RelayService {
    /// Builds the service and the handle used to drive it.
    pub fn new(config: &RelayConfig, observer: Arc<dyn RelayObserver>) -> (Self, RelayHandle) {
        let (tx, mailbox) = mpsc::unbounded_channel();

        let transport = TcpTransport::new(
            TcpTransportConfig {
                connect_timeout: config.connect_timeout(),
            },
            tx.clone(),
        );
        let gate = transport.gate();
        let dispatcher = InputEventDispatcher::new(transport, observer, config.max_line_len);

        let service = Self {
            dispatcher,
            gate,
            mailbox,
        };
        let handle = RelayHandle {
            inner: Arc::new(HandleInner { tx }),
        };
        (service, handle)
    }

    /// Processes messages until [`RelayHandle::shutdown`] is called or every
    /// handle has been dropped.
    pub async fn run(mut self) {
        info!("relay service started");
        while let Some(message) = self.mailbox.recv().await {
            match message {
                RelayMessage::Command(RelayCommand::Shutdown) => break,
                RelayMessage::Command(command) => self.apply_command(command),
                RelayMessage::Transport(event) => self.apply_transport_event(event),
            }
        }

        self.dispatcher.request_disconnect();
        info!("relay service stopped");
    }

    fn apply_command(&mut self, command: RelayCommand) {
        match command {
            RelayCommand::Key(event) => self.dispatcher.handle_event(event),
            RelayCommand::Connect { host, port } => {
                self.dispatcher.request_connect(&host, port);
            }
            RelayCommand::Disconnect => self.dispatcher.request_disconnect(),
            RelayCommand::Status(reply) => {
                let status = RelayStatus {
                    state: self.dispatcher.connection_state(),
                    pressed: self.dispatcher.pressed_keys(),
                };
                // The requester may have given up waiting.
                let _ = reply.send(status);
            }
            RelayCommand::Shutdown => {}
        }
    }

    fn apply_transport_event(&mut self, event: TransportEvent) {
        if !self.gate.is_current(&event) {
            debug!("discarding event from retired session {}", event.generation);
            return;
        }

        match event.signal {
            TransportSignal::Connected => self.dispatcher.on_connected(),
            TransportSignal::Bytes(bytes) => self.dispatcher.on_bytes_received(&bytes),
            TransportSignal::Error(e) => self.dispatcher.on_transport_error(e),
        }
    }
}
