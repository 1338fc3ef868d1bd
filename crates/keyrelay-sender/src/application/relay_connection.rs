//! RelayConnection: the connection lifecycle state machine.
//!
//! ```text
//!            request_connect            on_connected
//!   Idle ───────────────────▶ Connecting ───────────▶ Connected
//!    ▲                            │                     │   │
//!    │        on_transport_error  │                     │   │ request_disconnect
//!    ├──────────── Error ◀────────┘◀────────────────────┘   │
//!    └──────────────────────────────────────────────────────┘
//! ```
//!
//! The state machine performs no I/O of its own.  It drives a [`Transport`]
//! (open / write / close, all non-blocking) and reports to a [`RelayObserver`]
//! (the operator UI).  Transport outcomes come back as explicit calls to
//! [`RelayConnection::on_connected`], [`RelayConnection::on_transport_error`]
//! and [`RelayConnection::on_bytes_received`], so the same object works with
//! callbacks, a message loop, or a test that calls the methods directly.
//!
//! `Error` is transient: a failure closes the transport, tells the operator,
//! and lands in `Idle` within the same call.  There is no automatic reconnect.

use std::sync::Arc;
use std::time::Duration;

use keyrelay_core::protocol::is_ambiguous_scan_code;
use keyrelay_core::{encode_command, KeyId, LineSplitter, WireCommand, HANDSHAKE};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Operator log line written once the transport reports success.
pub const CONNECTED_LINE: &str = "Connected to host";

/// Operator log line written after an operator-initiated disconnect.
pub const DISCONNECTED_LINE: &str = "Disconnected from host.";

/// Prefix of the operator log line written on any transport failure.
pub const CONNECTION_ERROR_PREFIX: &str = "Connection error";

/// Failures reported by a [`Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP connection could not be established.
    #[error("failed to connect to {host}:{port}: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    /// The connection attempt did not complete in time.
    #[error("connecting to {host}:{port} timed out after {timeout:?}")]
    ConnectTimedOut {
        host: String,
        port: u16,
        timeout: Duration,
    },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The peer closed the connection.
    #[error("connection closed by peer")]
    Closed,
    /// A write was attempted with no open connection.
    #[error("transport is not open")]
    NotOpen,
}

impl TransportError {
    /// `true` for failures of the connect attempt itself, as opposed to
    /// failures of an established session.
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectFailed { .. } | TransportError::ConnectTimedOut { .. }
        )
    }
}

/// A bidirectional byte stream opened on demand.
///
/// None of the methods may block.  `open` only *starts* a connection attempt;
/// its outcome is delivered later through [`RelayConnection::on_connected`] or
/// [`RelayConnection::on_transport_error`].
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send {
    /// Starts connecting to `host:port`.
    fn open(&mut self, host: &str, port: u16);

    /// Queues `bytes` for sending on the open connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the connection is not open or has failed.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Closes the connection or abandons the pending attempt.
    fn close(&mut self);
}

/// Connection status as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionUiState {
    Disconnected,
    Connecting,
    Connected { host: String, port: u16 },
}

/// The operator-facing surface the relay reports to.
///
/// Implementations must be cheap and must not call back into the relay.
pub trait RelayObserver: Send + Sync {
    /// Shows the keys currently held down.
    fn show_pressed_keys(&self, keys: &[KeyId]);

    /// Appends a line to the operator log.
    fn append_log_line(&self, line: &str);

    /// Updates the connection status display.
    fn set_connection_ui_state(&self, state: ConnectionUiState);
}

/// Lifecycle state of the relay connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in flight.
    Idle,
    /// A connection attempt has been started.
    Connecting,
    /// Ready to send commands and receive log lines.
    Connected,
    /// A transport failure is being handled; always followed by `Idle`.
    Error,
}

/// The relay connection state machine.
pub struct RelayConnection<T: Transport> {
    state: ConnectionState,
    transport: T,
    observer: Arc<dyn RelayObserver>,
    splitter: LineSplitter,
    endpoint: Option<(String, u16)>,
    /// Set when a disconnect arrives while the attempt is still in flight.
    close_when_settled: bool,
}

impl<T: Transport> RelayConnection<T> {
    /// Creates an idle connection.
    pub fn new(transport: T, observer: Arc<dyn RelayObserver>, max_line_len: usize) -> Self {
        Self {
            state: ConnectionState::Idle,
            transport,
            observer,
            splitter: LineSplitter::new(max_line_len),
            endpoint: None,
            close_when_settled: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The `(host, port)` of the current or pending connection.
    pub fn endpoint(&self) -> Option<(&str, u16)> {
        self.endpoint.as_ref().map(|(h, p)| (h.as_str(), *p))
    }

    /// Starts a connection attempt.
    ///
    /// Returns `false` and changes nothing if an attempt is already in flight
    /// or a connection is already established.
    pub fn request_connect(&mut self, host: &str, port: u16) -> bool {
        if self.state != ConnectionState::Idle {
            debug!("connect to {host}:{port} rejected while {:?}", self.state);
            return false;
        }

        info!("connecting to {host}:{port}");
        self.state = ConnectionState::Connecting;
        self.endpoint = Some((host.to_string(), port));
        self.close_when_settled = false;
        self.splitter.clear();
        self.observer
            .set_connection_ui_state(ConnectionUiState::Connecting);
        self.transport.open(host, port);
        true
    }

    /// Closes the connection, or arranges for a pending attempt to be closed
    /// as soon as its outcome is known.
    pub fn request_disconnect(&mut self) {
        match self.state {
            ConnectionState::Connected => {
                info!("disconnecting from {}", self.endpoint_label());
                self.transport.close();
                self.settle_idle();
                self.observer.append_log_line(DISCONNECTED_LINE);
            }
            ConnectionState::Connecting => {
                info!("disconnect requested while connecting; closing once the attempt settles");
                self.close_when_settled = true;
            }
            ConnectionState::Idle | ConnectionState::Error => {
                debug!("disconnect ignored while {:?}", self.state);
            }
        }
    }

    /// Transport signal: the pending attempt succeeded.
    pub fn on_connected(&mut self) {
        if self.state != ConnectionState::Connecting {
            debug!("stray connected signal ignored while {:?}", self.state);
            return;
        }

        if self.close_when_settled {
            info!("attempt to {} settled after disconnect; closing", self.endpoint_label());
            self.transport.close();
            self.settle_idle();
            self.observer.append_log_line(DISCONNECTED_LINE);
            return;
        }

        info!("connected to {}", self.endpoint_label());
        self.state = ConnectionState::Connected;
        self.observer.append_log_line(CONNECTED_LINE);

        if let Err(e) = self.transport.write(HANDSHAKE) {
            self.on_transport_error(e);
            return;
        }

        if let Some((host, port)) = self.endpoint.clone() {
            self.observer
                .set_connection_ui_state(ConnectionUiState::Connected { host, port });
        }
    }

    /// Transport signal: the attempt or the established session failed.
    pub fn on_transport_error(&mut self, error: TransportError) {
        if matches!(self.state, ConnectionState::Idle | ConnectionState::Error) {
            debug!("transport error ignored while {:?}: {error}", self.state);
            return;
        }

        let during = self.state;
        self.state = ConnectionState::Error;
        warn!("transport error while {during:?} ({}): {error}", self.endpoint_label());

        self.transport.close();
        self.observer
            .append_log_line(&format!("{CONNECTION_ERROR_PREFIX}: {error}"));
        self.settle_idle();
    }

    /// Transport signal: bytes arrived from the peer.
    ///
    /// Every line they complete is appended to the operator log.  Bytes that
    /// arrive outside `Connected` are discarded.
    pub fn on_bytes_received(&mut self, bytes: &[u8]) {
        if self.state != ConnectionState::Connected {
            trace!("discarding {} inbound bytes while {:?}", bytes.len(), self.state);
            return;
        }

        for line in self.splitter.push(bytes) {
            self.observer.append_log_line(line.as_str());
        }
    }

    /// Sends one command if connected.
    ///
    /// Outside `Connected` the command is stale and is dropped without error.
    /// Returns `true` if the frame was handed to the transport.
    pub fn send(&mut self, cmd: &WireCommand) -> bool {
        if self.state != ConnectionState::Connected {
            trace!("dropping {cmd:?} while {:?}", self.state);
            return false;
        }

        if is_ambiguous_scan_code(cmd.scan_code) {
            warn!(
                "scan code {} collides with a line terminator; the peer may misframe it",
                cmd.scan_code
            );
        }

        match self.transport.write(&encode_command(cmd)) {
            Ok(()) => true,
            Err(e) => {
                self.on_transport_error(e);
                false
            }
        }
    }

    fn settle_idle(&mut self) {
        self.state = ConnectionState::Idle;
        self.endpoint = None;
        self.close_when_settled = false;
        self.splitter.clear();
        self.observer
            .set_connection_ui_state(ConnectionUiState::Disconnected);
    }

    fn endpoint_label(&self) -> String {
        match &self.endpoint {
            Some((host, port)) => format!("{host}:{port}"),
            None => "<none>".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
