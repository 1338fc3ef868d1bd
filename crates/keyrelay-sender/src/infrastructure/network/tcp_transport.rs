//! tokio TCP implementation of the application's [`Transport`] trait.
//!
//! Each `open` spawns one session task:
//!
//! ```text
//! connect (with timeout) ──▶ Connected ──▶ ┌ read_loop  ─▶ Bytes(..) ┐
//!                                          └ write_loop ◀─ outbound  ┘ ──▶ Error(..)
//! ```
//!
//! Whichever half finishes first ends the session; its error is the last
//! event the session emits.  `close` aborts the task, which drops the socket.
//!
//! Events go out on an `mpsc` channel of any message type `M` that can be
//! built from a [`TransportEvent`], so the transport can post into a mailbox
//! that other producers share.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info};

use super::{SessionGate, TransportEvent, TransportSignal};
use crate::application::relay_connection::{Transport, TransportError};

/// Size of the scratch buffer used for each socket read.
const READ_CHUNK: usize = 4096;

/// Tunables for [`TcpTransport`].
#[derive(Debug, Clone)]
pub struct TcpTransportConfig {
    /// How long a connection attempt may take before it is reported as failed.
    pub connect_timeout: Duration,
}

impl Default for TcpTransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
        }
    }
}

struct Session {
    outbound: mpsc::UnboundedSender<Vec<u8>>,
    task: JoinHandle<()>,
}

/// TCP transport driven from a tokio runtime.
///
/// `open` must be called from within a tokio runtime.
pub struct TcpTransport<M = TransportEvent> {
    config: TcpTransportConfig,
    events: mpsc::UnboundedSender<M>,
    gate: SessionGate,
    session: Option<Session>,
}

impl<M> TcpTransport<M> {
    pub fn new(config: TcpTransportConfig, events: mpsc::UnboundedSender<M>) -> Self {
        Self {
            config,
            events,
            gate: SessionGate::default(),
            session: None,
        }
    }

    /// A handle for discarding events from retired sessions.
    pub fn gate(&self) -> SessionGate {
        self.gate.clone()
    }

    fn teardown(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                session.task.abort();
                true
            }
            None => false,
        }
    }
}

impl<M> Transport for TcpTransport<M>
where
    M: From<TransportEvent> + Send + 'static,
{
    fn open(&mut self, host: &str, port: u16) {
        self.teardown();
        let generation = self.gate.advance();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        debug!("session {generation}: opening {host}:{port}");
        let task = tokio::spawn(run_session(
            host.to_string(),
            port,
            self.config.connect_timeout,
            generation,
            self.events.clone(),
            outbound_rx,
        ));

        self.session = Some(Session {
            outbound: outbound_tx,
            task,
        });
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let session = self.session.as_ref().ok_or(TransportError::NotOpen)?;
        session
            .outbound
            .send(bytes.to_vec())
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        if self.teardown() {
            debug!("session {} closed", self.gate.current());
        }
        self.gate.advance();
    }
}

impl<M> Drop for TcpTransport<M> {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Session task ──────────────────────────────────────────────────────────────

async fn run_session<M>(
    host: String,
    port: u16,
    connect_timeout: Duration,
    generation: u64,
    events: mpsc::UnboundedSender<M>,
    outbound: mpsc::UnboundedReceiver<Vec<u8>>,
) where
    M: From<TransportEvent>,
{
    let emit = |signal| {
        events
            .send(M::from(TransportEvent { generation, signal }))
            .is_ok()
    };

    let stream = match connect(&host, port, connect_timeout).await {
        Ok(stream) => stream,
        Err(e) => {
            emit(TransportSignal::Error(e));
            return;
        }
    };

    info!("session {generation}: TCP connection to {host}:{port} established");
    if !emit(TransportSignal::Connected) {
        return;
    }

    let (reader, writer) = stream.into_split();
    let error = tokio::select! {
        e = read_loop(reader, generation, &events) => e,
        e = write_loop(writer, outbound) => e,
    };

    debug!("session {generation}: ended: {error}");
    emit(TransportSignal::Error(error));
}

/// Connects to `host:port`, failing after `timeout`.
pub(crate) async fn connect(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<TcpStream, TransportError> {
    match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            // Frames are 4 bytes; Nagle would hold them back.
            if let Err(e) = stream.set_nodelay(true) {
                debug!("could not set TCP_NODELAY on {host}:{port}: {e}");
            }
            Ok(stream)
        }
        Ok(Err(source)) => Err(TransportError::ConnectFailed {
            host: host.to_string(),
            port,
            source,
        }),
        Err(_) => Err(TransportError::ConnectTimedOut {
            host: host.to_string(),
            port,
            timeout,
        }),
    }
}

/// Forwards everything read from `reader` as [`TransportSignal::Bytes`].
///
/// Returns the error that ended the stream; a clean EOF is
/// [`TransportError::Closed`].
pub(crate) async fn read_loop<R, M>(
    mut reader: R,
    generation: u64,
    events: &mpsc::UnboundedSender<M>,
) -> TransportError
where
    R: AsyncRead + Unpin,
    M: From<TransportEvent>,
{
    let mut read_tmp = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut read_tmp).await {
            Ok(0) => return TransportError::Closed,
            Ok(n) => {
                let event = TransportEvent {
                    generation,
                    signal: TransportSignal::Bytes(read_tmp[..n].to_vec()),
                };
                if events.send(M::from(event)).is_err() {
                    return TransportError::Closed;
                }
            }
            Err(e) => return TransportError::Io(e),
        }
    }
}

/// Writes every queued buffer to `writer` in order.
///
/// Returns when a write fails or when the queue's sender is dropped.
pub(crate) async fn write_loop<W>(
    mut writer: W,
    mut outbound: mpsc::UnboundedReceiver<Vec<u8>>,
) -> TransportError
where
    W: AsyncWrite + Unpin,
{
    while let Some(bytes) = outbound.recv().await {
        if let Err(e) = writer.write_all(&bytes).await {
            return TransportError::Io(e);
        }
    }
    TransportError::Closed
}

// ── Tests ─────────────────────────────────────────────────────────────────────
