//! Console front end: the headless operator surface.
//!
//! - **`observer`** – `ConsoleObserver`, a `RelayObserver` that prints the
//!   held keys, the operator log and the connection status to a terminal.
//! - **`commands`** – Parses the lines an operator types on stdin into
//!   `ConsoleCommand`s.

pub mod commands;
pub mod observer;

pub use commands::{CommandError, ConsoleCommand};
pub use observer::ConsoleObserver;
