//! # keyrelay-core
//!
//! Shared library for KeyRelay containing the key remap table, the per-key
//! pressed state tracker and the line-oriented wire codec.
//!
//! This crate has zero dependencies on OS APIs, UI frameworks, or network
//! sockets.  Everything in it is synchronous and pure enough to be unit-tested
//! without any setup.
//!
//! # Architecture overview (for beginners)
//!
//! KeyRelay forwards local key presses to a remote machine, where an injector
//! replays them through a DirectInput-style virtual keyboard.  The sender runs
//! next to the operator's keyboard; the peer runs on the target machine.
//!
//! - **`keymap`** – Translates the local platform's key identifiers (Qt key
//!   codes) into the DirectInput scan codes the remote injector understands.
//!
//! - **`domain`** – The [`KeyStateTracker`], which remembers which keys are
//!   currently held down so the operator can see them.
//!
//! - **`protocol`** – How bytes travel over the network.  Each key event is a
//!   4-byte frame (`+`/`-`, scan code, CR, LF); the peer answers with plain
//!   newline-terminated log lines.

// Rust will look for each module in a subdirectory with the same name
// (e.g., src/protocol/mod.rs).
pub mod domain;
pub mod keymap;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `keyrelay_core::ScanCode` instead of `keyrelay_core::keymap::ScanCode`.
pub use domain::key_state::KeyStateTracker;
pub use keymap::{translate, KeyId, RemapError, RemapTable, ScanCode};
pub use protocol::codec::{decode_command, decode_line, encode_command, ProtocolError};
pub use protocol::line_buffer::LineSplitter;
pub use protocol::messages::{Direction, InboundLine, WireCommand, HANDSHAKE};
