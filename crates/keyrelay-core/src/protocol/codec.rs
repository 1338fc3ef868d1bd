//! Codec for the KeyRelay wire format.
//!
//! Outbound frames are exactly four bytes:
//! ```text
//! [marker:1][scan_code:1][0x0D][0x0A]
//! ```
//! There is no length prefix and no escaping.  The scan code is a raw byte, so
//! a scan code of `0x0A` or `0x0D` produces a frame that a naive line reader on
//! the peer will split in the wrong place.  Existing peers depend on the exact
//! byte layout, so the frame is emitted unchanged; [`is_ambiguous_scan_code`]
//! lets callers detect and log the case.
//!
//! Inbound traffic is plain text, one message per `\n`-terminated line.

use thiserror::Error;

use crate::keymap::ScanCode;
use crate::protocol::messages::{
    Direction, InboundLine, WireCommand, FRAME_LEN, FRAME_TERMINATOR,
};

/// Errors that can occur while decoding an outbound frame.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than one frame.
    #[error("insufficient data: need at least {needed} bytes, got {available}")]
    InsufficientData { needed: usize, available: usize },

    /// The first byte is neither `+` nor `-`.
    #[error("unknown direction marker: 0x{0:02X}")]
    UnknownMarker(u8),

    /// The frame does not end with CR LF.
    #[error("frame is not terminated by CR LF (found 0x{0:02X} 0x{1:02X})")]
    MissingTerminator(u8, u8),
}

// ── Outbound frames ───────────────────────────────────────────────────────────

/// Encodes a [`WireCommand`] into its 4-byte frame.
///
/// # Examples
///
/// ```rust
/// use keyrelay_core::{encode_command, ScanCode, WireCommand};
///
/// let bytes = encode_command(&WireCommand::pressed(ScanCode(0x11)));
/// assert_eq!(bytes, [0x2B, 0x11, 0x0D, 0x0A]);
/// ```
pub fn encode_command(cmd: &WireCommand) -> [u8; FRAME_LEN] {
    [
        cmd.direction.marker(),
        cmd.scan_code.0,
        FRAME_TERMINATOR[0],
        FRAME_TERMINATOR[1],
    ]
}

/// Decodes one [`WireCommand`] from the beginning of `bytes`.
///
/// Returns the command and the number of bytes consumed (always
/// [`FRAME_LEN`]) so the caller can advance its read cursor.
///
/// # Errors
///
/// Returns [`ProtocolError`] if fewer than four bytes are available or the
/// frame is malformed.
///
/// # Examples
///
/// ```rust
/// use keyrelay_core::{decode_command, Direction, ScanCode};
///
/// let (cmd, n) = decode_command(&[b'-', 0x39, b'\r', b'\n']).unwrap();
/// assert_eq!(cmd.direction, Direction::Released);
/// assert_eq!(cmd.scan_code, ScanCode(0x39));
/// assert_eq!(n, 4);
/// ```
pub fn decode_command(bytes: &[u8]) -> Result<(WireCommand, usize), ProtocolError> {
    if bytes.len() < FRAME_LEN {
        return Err(ProtocolError::InsufficientData {
            needed: FRAME_LEN,
            available: bytes.len(),
        });
    }

    let direction =
        Direction::from_marker(bytes[0]).ok_or(ProtocolError::UnknownMarker(bytes[0]))?;

    // bytes[1] is the raw scan code and may legitimately be CR or LF.
    if bytes[2..4] != FRAME_TERMINATOR {
        return Err(ProtocolError::MissingTerminator(bytes[2], bytes[3]));
    }

    let cmd = WireCommand {
        direction,
        scan_code: ScanCode(bytes[1]),
    };
    Ok((cmd, FRAME_LEN))
}

/// Returns `true` if `scan_code` collides with a line terminator byte.
pub fn is_ambiguous_scan_code(scan_code: ScanCode) -> bool {
    matches!(scan_code.0, b'\r' | b'\n')
}

// ── Inbound lines ─────────────────────────────────────────────────────────────

/// Converts one raw inbound line into displayable text.
///
/// Strips a trailing `\n` (and a `\r` right before it), truncates at the first
/// NUL byte, and replaces invalid UTF-8 with U+FFFD.
pub fn decode_line(raw: &[u8]) -> InboundLine {
    let mut line = match raw.strip_suffix(b"\n") {
        Some(body) => body.strip_suffix(b"\r").unwrap_or(body),
        None => raw,
    };
    if let Some(nul) = line.iter().position(|&b| b == 0) {
        line = &line[..nul];
    }
    InboundLine(String::from_utf8_lossy(line).into_owned())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
