//! Wire types exchanged between the sender and the remote injector.
//!
//! Outbound (sender → peer):
//! ```text
//! [marker:1][scan_code:1][CR][LF]      marker = '+' (pressed) | '-' (released)
//! ```
//! plus the literal `hello\r\n` once per connection.
//!
//! Inbound (peer → sender): free-form text lines terminated by `\n`.

use crate::keymap::ScanCode;

/// Greeting written once, right after the connection is established.
/// The peer is not expected to answer it.
pub const HANDSHAKE: &[u8] = b"hello\r\n";

/// Size of one encoded [`WireCommand`] in bytes.
pub const FRAME_LEN: usize = 4;

/// Marker byte for a key press.
pub const PRESSED_MARKER: u8 = b'+';

/// Marker byte for a key release.
pub const RELEASED_MARKER: u8 = b'-';

/// Line terminator closing every outbound frame.
pub const FRAME_TERMINATOR: [u8; 2] = *b"\r\n";

/// Longest inbound line surfaced in one piece.
///
/// Longer runs without a terminator are split into chunks of this size.
pub const DEFAULT_MAX_LINE_LEN: usize = 65_534;

/// Whether a key went down or came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Pressed,
    Released,
}

impl Direction {
    /// The marker byte that opens a frame for this direction.
    pub fn marker(self) -> u8 {
        match self {
            Direction::Pressed => PRESSED_MARKER,
            Direction::Released => RELEASED_MARKER,
        }
    }

    /// Parses a marker byte.
    pub fn from_marker(byte: u8) -> Option<Self> {
        match byte {
            PRESSED_MARKER => Some(Direction::Pressed),
            RELEASED_MARKER => Some(Direction::Released),
            _ => None,
        }
    }
}

impl From<bool> for Direction {
    fn from(pressed: bool) -> Self {
        if pressed {
            Direction::Pressed
        } else {
            Direction::Released
        }
    }
}

/// A single key event destined for the remote injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireCommand {
    pub direction: Direction,
    pub scan_code: ScanCode,
}

impl WireCommand {
    pub fn pressed(scan_code: ScanCode) -> Self {
        Self {
            direction: Direction::Pressed,
            scan_code,
        }
    }

    pub fn released(scan_code: ScanCode) -> Self {
        Self {
            direction: Direction::Released,
            scan_code,
        }
    }
}

/// One decoded line of text received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundLine(pub String);

impl InboundLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InboundLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_markers() {
        assert_eq!(Direction::Pressed.marker(), 0x2B);
        assert_eq!(Direction::Released.marker(), 0x2D);
    }

    #[test]
    fn test_direction_from_marker_rejects_other_bytes() {
        assert_eq!(Direction::from_marker(b'+'), Some(Direction::Pressed));
        assert_eq!(Direction::from_marker(b'-'), Some(Direction::Released));
        assert_eq!(Direction::from_marker(b'*'), None);
    }

    #[test]
    fn test_direction_from_bool() {
        assert_eq!(Direction::from(true), Direction::Pressed);
        assert_eq!(Direction::from(false), Direction::Released);
    }

    #[test]
    fn test_handshake_is_hello_crlf() {
        assert_eq!(HANDSHAKE, &[0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x0D, 0x0A]);
    }
}
