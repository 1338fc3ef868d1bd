//! Network infrastructure for the sender.
//!
//! Architecture:
//! - `TcpTransport` implements the application's `Transport` trait.  Its
//!   methods return immediately; each `open` spawns one session task that
//!   connects, then pumps bytes in both directions.
//! - Session outcomes travel back to the service loop as [`TransportEvent`]s
//!   on an unbounded `mpsc` channel.
//! - Every session carries a generation number.  `close` retires the current
//!   generation, and the [`SessionGate`] lets the receiver discard events a
//!   retired session queued before it was torn down.

pub mod tcp_transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::relay_connection::TransportError;

pub use tcp_transport::{TcpTransport, TcpTransportConfig};

/// What a transport session reports.
#[derive(Debug)]
pub enum TransportSignal {
    /// The connection attempt succeeded.
    Connected,
    /// Bytes arrived from the peer.
    Bytes(Vec<u8>),
    /// The attempt or the session failed; the session is over.
    Error(TransportError),
}

/// A [`TransportSignal`] tagged with the session that produced it.
#[derive(Debug)]
pub struct TransportEvent {
    pub generation: u64,
    pub signal: TransportSignal,
}

/// Shared view of the transport's current session generation.
#[derive(Debug, Clone, Default)]
pub struct SessionGate {
    current: Arc<AtomicU64>,
}

impl SessionGate {
    /// `true` if `event` was produced by the live session.
    pub fn is_current(&self, event: &TransportEvent) -> bool {
        event.generation == self.current.load(Ordering::Acquire)
    }

    pub(crate) fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Retires the current generation and returns the new one.
    pub(crate) fn advance(&self) -> u64 {
        self.current.fetch_add(1, Ordering::AcqRel) + 1
    }
}
