//! `RelayObserver` that renders to a text stream.

use std::io::Write;
use std::sync::Mutex;

use keyrelay_core::KeyId;
use tracing::debug;

use crate::application::relay_connection::{ConnectionUiState, RelayObserver};

/// Status text shown while no connection exists.
pub const NOT_CONNECTED_LABEL: &str = "Not Connected";

/// Status text shown while a connection attempt is in flight.
pub const CONNECTING_LABEL: &str = "Connecting…";

/// Renders a [`ConnectionUiState`] as status text.
pub fn status_label(state: &ConnectionUiState) -> String {
    match state {
        ConnectionUiState::Disconnected => NOT_CONNECTED_LABEL.to_string(),
        ConnectionUiState::Connecting => CONNECTING_LABEL.to_string(),
        ConnectionUiState::Connected { host, port } => format!("Connected to {host}:{port}"),
    }
}

/// Renders a pressed-key list as space-separated key names.
pub fn pressed_line(keys: &[KeyId]) -> String {
    if keys.is_empty() {
        return "(none)".to_string();
    }
    keys.iter()
        .map(KeyId::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Prints relay output, one line per notification.
///
/// ```text
/// keys: W Space
/// > Connected to host
/// [Connected to 10.0.0.5:7777]
/// ```
pub struct ConsoleObserver {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleObserver {
    /// Writes to standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    fn emit(&self, line: &str) {
        let Ok(mut out) = self.out.lock() else {
            debug!("console output lock poisoned; dropping {line:?}");
            return;
        };
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            debug!("console write failed: {e}");
        }
    }
}

impl RelayObserver for ConsoleObserver {
    fn show_pressed_keys(&self, keys: &[KeyId]) {
        self.emit(&format!("keys: {}", pressed_line(keys)));
    }

    fn append_log_line(&self, line: &str) {
        self.emit(&format!("> {line}"));
    }

    fn set_connection_ui_state(&self, state: ConnectionUiState) {
        self.emit(&format!("[{}]", status_label(&state)));
    }
}
