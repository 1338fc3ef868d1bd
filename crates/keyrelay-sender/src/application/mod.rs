//! Application layer for the sender.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure state and rules) and the infrastructure (OS/network/storage).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain objects to fulfil a user goal (e.g., "relay this
//!   key press to the remote injector").
//! - **Depends on abstractions** (the [`relay_connection::Transport`] and
//!   [`relay_connection::RelayObserver`] traits) rather than on sockets or
//!   widgets, so every transition is unit-testable.
//! - **Never blocks and performs no I/O itself**.
//!
//! # Sub-modules
//!
//! - **`relay_connection`** – The connection lifecycle state machine:
//!   Idle → Connecting → Connected → Idle, with error recovery.
//!
//! - **`dispatch_keys`** – Receives key press/release notifications, keeps the
//!   pressed-key display current and relays mapped keys while connected.

pub mod dispatch_keys;
pub mod relay_connection;

#[cfg(test)]
pub(crate) mod test_support;
