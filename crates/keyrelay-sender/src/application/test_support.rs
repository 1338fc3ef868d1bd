//! Recording test doubles shared by the application-layer unit tests.

use std::sync::{Arc, Mutex};

use keyrelay_core::KeyId;

use super::relay_connection::{ConnectionUiState, RelayObserver, Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Open(String, u16),
    Write(Vec<u8>),
    Close,
}

/// Records every call; clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl RecordingTransport {
    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    /// All bytes successfully written, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                TransportCall::Write(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    pub fn fail_writes(&self) {
        *self.fail_writes.lock().unwrap() = true;
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Transport for RecordingTransport {
    fn open(&mut self, host: &str, port: u16) {
        self.calls
            .lock()
            .unwrap()
            .push(TransportCall::Open(host.to_string(), port));
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if *self.fail_writes.lock().unwrap() {
            return Err(TransportError::Io(std::io::Error::from(
                std::io::ErrorKind::BrokenPipe,
            )));
        }
        self.calls
            .lock()
            .unwrap()
            .push(TransportCall::Write(bytes.to_vec()));
        Ok(())
    }

    fn close(&mut self) {
        self.calls.lock().unwrap().push(TransportCall::Close);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverCall {
    Pressed(Vec<KeyId>),
    Log(String),
    UiState(ConnectionUiState),
}

#[derive(Default)]
pub struct RecordingObserver {
    calls: Mutex<Vec<ObserverCall>>,
}

impl RecordingObserver {
    pub fn calls(&self) -> Vec<ObserverCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ObserverCall::Log(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    /// The most recent pressed-key display, if any.
    pub fn last_pressed(&self) -> Option<Vec<KeyId>> {
        self.calls().into_iter().rev().find_map(|c| match c {
            ObserverCall::Pressed(keys) => Some(keys),
            _ => None,
        })
    }

    pub fn has_log_starting_with(&self, prefix: &str) -> bool {
        self.logs().iter().any(|l| l.starts_with(prefix))
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl RelayObserver for RecordingObserver {
    fn show_pressed_keys(&self, keys: &[KeyId]) {
        self.calls
            .lock()
            .unwrap()
            .push(ObserverCall::Pressed(keys.to_vec()));
    }

    fn append_log_line(&self, line: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(ObserverCall::Log(line.to_string()));
    }

    fn set_connection_ui_state(&self, state: ConnectionUiState) {
        self.calls.lock().unwrap().push(ObserverCall::UiState(state));
    }
}
