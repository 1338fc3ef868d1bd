//! Infrastructure layer for the sender.
//!
//! Contains the OS-facing adapters: the tokio TCP transport, the console
//! front end, config file storage, and the service loop that ties them to
//! the application layer.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keyrelay_core`, but MUST NOT be imported by the `application` layer.
//!
//! # Sub-modules
//!
//! - **`network`** – `TcpTransport`, the tokio implementation of the
//!   application's `Transport` trait.  Connects, reads and writes in spawned
//!   tasks and reports every outcome as a generation-tagged event.
//!
//! - **`console`** – Headless operator surface: a `RelayObserver` that prints
//!   to a terminal and a parser for typed commands.
//!
//! - **`storage`** – TOML configuration file loading.
//!
//! - **`relay_service`** – The single task that owns the dispatcher and
//!   applies operator commands and transport events in arrival order.

pub mod console;
pub mod network;
pub mod relay_service;
pub mod storage;
