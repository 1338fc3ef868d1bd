//! DispatchKeys use case: turns raw key notifications into display updates
//! and wire commands.
//!
//! For every press or release the dispatcher:
//!
//! 1. Records the new state in the [`KeyStateTracker`].
//! 2. Pushes the full list of held keys to the [`RelayObserver`], whether or
//!    not the key is mapped and whether or not a connection exists.
//! 3. Translates the key through the [`RemapTable`] and, if it is mapped and
//!    the connection is up, sends exactly one 4-byte command.
//!
//! Auto-repeat presses are not filtered: each one is re-sent.

use std::sync::Arc;

use keyrelay_core::{Direction, KeyId, KeyStateTracker, RemapTable, WireCommand};
use tracing::{debug, trace};

use super::relay_connection::{
    ConnectionState, RelayConnection, RelayObserver, Transport, TransportError,
};

/// A key notification from the local input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKeyEvent {
    KeyDown { key: KeyId },
    KeyUp { key: KeyId },
}

/// Owns the key state and the relay connection and routes input to both.
pub struct InputEventDispatcher<T: Transport> {
    tracker: KeyStateTracker,
    remap: &'static RemapTable,
    connection: RelayConnection<T>,
    observer: Arc<dyn RelayObserver>,
}

impl<T: Transport> InputEventDispatcher<T> {
    /// Creates a dispatcher using the standard remap table.
    pub fn new(transport: T, observer: Arc<dyn RelayObserver>, max_line_len: usize) -> Self {
        Self::with_remap(transport, observer, max_line_len, RemapTable::standard())
    }

    /// Creates a dispatcher with a caller-supplied remap table.
    pub fn with_remap(
        transport: T,
        observer: Arc<dyn RelayObserver>,
        max_line_len: usize,
        remap: &'static RemapTable,
    ) -> Self {
        Self {
            tracker: KeyStateTracker::new(),
            remap,
            connection: RelayConnection::new(transport, observer.clone(), max_line_len),
            observer,
        }
    }

    pub fn handle_event(&mut self, event: RawKeyEvent) {
        match event {
            RawKeyEvent::KeyDown { key } => self.on_key_press(key),
            RawKeyEvent::KeyUp { key } => self.on_key_release(key),
        }
    }

    pub fn on_key_press(&mut self, key: KeyId) {
        self.on_key(key, Direction::Pressed);
    }

    pub fn on_key_release(&mut self, key: KeyId) {
        self.on_key(key, Direction::Released);
    }

    fn on_key(&mut self, key: KeyId, direction: Direction) {
        self.tracker
            .set_pressed(key, direction == Direction::Pressed);
        self.observer
            .show_pressed_keys(&self.tracker.pressed_keys());

        let Some(scan_code) = self.remap.translate(key) else {
            trace!("{key} is not mapped; display only");
            return;
        };

        if self.connection.send(&WireCommand { direction, scan_code }) {
            debug!("relayed {key} {direction:?} as {scan_code}");
        }
    }

    // ── Connection pass-throughs ──────────────────────────────────────────────

    pub fn request_connect(&mut self, host: &str, port: u16) -> bool {
        self.connection.request_connect(host, port)
    }

    pub fn request_disconnect(&mut self) {
        self.connection.request_disconnect();
    }

    pub fn on_connected(&mut self) {
        self.connection.on_connected();
    }

    pub fn on_transport_error(&mut self, error: TransportError) {
        self.connection.on_transport_error(error);
    }

    pub fn on_bytes_received(&mut self, bytes: &[u8]) {
        self.connection.on_bytes_received(bytes);
    }

    // ── Queries ───────────────────────────────────────────────────────────────

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn pressed_keys(&self) -> Vec<KeyId> {
        self.tracker.pressed_keys()
    }

    pub fn is_pressed(&self, key: KeyId) -> bool {
        self.tracker.is_pressed(key)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::relay_connection::{
        ConnectionUiState, MockTransport, CONNECTED_LINE, CONNECTION_ERROR_PREFIX,
    };
    use crate::application::test_support::{ObserverCall, RecordingObserver, RecordingTransport};
    use keyrelay_core::keymap::qt;

    fn make_dispatcher() -> (
        InputEventDispatcher<RecordingTransport>,
        RecordingTransport,
        Arc<RecordingObserver>,
    ) {
        let transport = RecordingTransport::default();
        let observer = Arc::new(RecordingObserver::default());
        let dispatcher = InputEventDispatcher::new(transport.clone(), observer.clone(), 1024);
        (dispatcher, transport, observer)
    }

    fn connected_dispatcher() -> (
        InputEventDispatcher<RecordingTransport>,
        RecordingTransport,
        Arc<RecordingObserver>,
    ) {
        let (mut dispatcher, transport, observer) = make_dispatcher();
        dispatcher.request_connect("10.0.0.5", 7777);
        dispatcher.on_connected();
        transport.clear();
        observer.clear();
        (dispatcher, transport, observer)
    }

    #[test]
    fn test_press_while_idle_updates_display_without_sending() {
        let mut transport = MockTransport::new();
        transport.expect_write().never();
        let observer = Arc::new(RecordingObserver::default());
        let mut dispatcher = InputEventDispatcher::new(transport, observer.clone(), 64);

        dispatcher.on_key_press(qt::KEY_W);

        assert_eq!(observer.last_pressed(), Some(vec![qt::KEY_W]));
        assert!(dispatcher.is_pressed(qt::KEY_W));
    }

    #[test]
    fn test_press_while_connected_sends_pressed_frame() {
        let (mut dispatcher, transport, _) = connected_dispatcher();

        dispatcher.on_key_press(qt::KEY_W);

        assert_eq!(transport.written(), vec![0x2B, 0x11, 0x0D, 0x0A]);
    }

    #[test]
    fn test_release_while_connected_sends_released_frame() {
        let (mut dispatcher, transport, observer) = connected_dispatcher();
        dispatcher.on_key_press(qt::KEY_SPACE);
        transport.clear();

        dispatcher.on_key_release(qt::KEY_SPACE);

        assert_eq!(transport.written(), vec![0x2D, 0x39, 0x0D, 0x0A]);
        assert_eq!(observer.last_pressed(), Some(vec![]));
    }

    #[test]
    fn test_unmapped_key_updates_display_but_sends_nothing() {
        // Arrange
        let (mut dispatcher, transport, observer) = connected_dispatcher();
        let q = KeyId(0x51);

        // Act
        dispatcher.on_key_press(q);

        // Assert
        assert!(transport.written().is_empty());
        assert_eq!(observer.last_pressed(), Some(vec![q]));
    }

    #[test]
    fn test_control_key_maps_to_left_control() {
        let (mut dispatcher, transport, _) = connected_dispatcher();

        dispatcher.on_key_press(qt::KEY_CONTROL);

        assert_eq!(transport.written(), vec![0x2B, 0x1D, 0x0D, 0x0A]);
    }

    #[test]
    fn test_auto_repeat_is_resent() {
        let (mut dispatcher, transport, observer) = connected_dispatcher();

        dispatcher.on_key_press(qt::KEY_A);
        dispatcher.on_key_press(qt::KEY_A);

        assert_eq!(
            transport.written(),
            vec![0x2B, 0x1E, 0x0D, 0x0A, 0x2B, 0x1E, 0x0D, 0x0A]
        );
        assert_eq!(observer.last_pressed(), Some(vec![qt::KEY_A]));
    }

    #[test]
    fn test_release_of_never_pressed_key_is_sent() {
        let (mut dispatcher, transport, observer) = connected_dispatcher();

        dispatcher.on_key_release(qt::KEY_D);

        assert_eq!(transport.written(), vec![0x2D, 0x20, 0x0D, 0x0A]);
        assert_eq!(observer.last_pressed(), Some(vec![]));
    }

    #[test]
    fn test_display_lists_held_keys_in_ascending_order() {
        let (mut dispatcher, _, observer) = make_dispatcher();

        dispatcher.handle_event(RawKeyEvent::KeyDown { key: qt::KEY_SPACE });
        dispatcher.handle_event(RawKeyEvent::KeyDown { key: qt::KEY_W });
        dispatcher.handle_event(RawKeyEvent::KeyDown { key: qt::KEY_A });

        assert_eq!(
            observer.last_pressed(),
            Some(vec![qt::KEY_SPACE, qt::KEY_A, qt::KEY_W])
        );
    }

    #[test]
    fn test_key_state_survives_connection_changes() {
        let (mut dispatcher, _, _) = connected_dispatcher();
        dispatcher.on_key_press(qt::KEY_W);

        dispatcher.on_transport_error(TransportError::Closed);

        assert_eq!(dispatcher.connection_state(), ConnectionState::Idle);
        assert_eq!(dispatcher.pressed_keys(), vec![qt::KEY_W]);
    }

    #[test]
    fn test_custom_remap_table_is_honoured() {
        static TABLE: std::sync::OnceLock<RemapTable> = std::sync::OnceLock::new();
        let table = TABLE.get_or_init(|| {
            RemapTable::from_pairs(&[(KeyId(0x51), keyrelay_core::ScanCode(0x10))])
                .expect("valid table")
        });
        let transport = RecordingTransport::default();
        let mut dispatcher = InputEventDispatcher::with_remap(
            transport.clone(),
            Arc::new(RecordingObserver::default()),
            64,
            table,
        );
        dispatcher.request_connect("h", 1);
        dispatcher.on_connected();
        transport.clear();

        dispatcher.on_key_press(KeyId(0x51));
        dispatcher.on_key_press(qt::KEY_W);

        assert_eq!(transport.written(), vec![0x2B, 0x10, 0x0D, 0x0A]);
    }

    /// Walks an operator session from idle typing through a dropped
    /// connection.
    #[test]
    fn test_full_session_scenario() {
        let (mut dispatcher, transport, observer) = make_dispatcher();

        // Idle: display only.
        dispatcher.on_key_press(qt::KEY_W);
        assert!(transport.written().is_empty());
        assert_eq!(observer.last_pressed(), Some(vec![qt::KEY_W]));
        dispatcher.on_key_release(qt::KEY_W);

        // Connect.
        assert!(dispatcher.request_connect("10.0.0.5", 7777));
        dispatcher.on_connected();
        assert_eq!(transport.written(), b"hello\r\n".to_vec());
        assert!(observer.logs().contains(&CONNECTED_LINE.to_string()));
        assert!(observer.calls().contains(&ObserverCall::UiState(
            ConnectionUiState::Connected {
                host: "10.0.0.5".to_string(),
                port: 7777
            }
        )));
        transport.clear();

        // Relay A down/up.
        dispatcher.on_key_press(qt::KEY_A);
        dispatcher.on_key_release(qt::KEY_A);
        assert_eq!(
            transport.written(),
            vec![0x2B, 0x1E, 0x0D, 0x0A, 0x2D, 0x1E, 0x0D, 0x0A]
        );

        // Peer log line.
        dispatcher.on_bytes_received(b"injected 0x11\r\n");
        assert_eq!(observer.logs().last().map(String::as_str), Some("injected 0x11"));

        // Transport failure: back to Idle with an error line.
        dispatcher.on_transport_error(TransportError::Closed);
        assert_eq!(dispatcher.connection_state(), ConnectionState::Idle);
        assert!(observer.has_log_starting_with(CONNECTION_ERROR_PREFIX));
        assert_eq!(
            observer.calls().last(),
            Some(&ObserverCall::UiState(ConnectionUiState::Disconnected))
        );

        // Later keys update the display only.
        transport.clear();
        dispatcher.on_key_press(qt::KEY_A);
        assert!(transport.written().is_empty());
        assert_eq!(observer.last_pressed(), Some(vec![qt::KEY_A]));
    }
}
