//! Key code translation from the local input platform to DirectInput scan codes.
//!
//! The local side reports keys as Qt key codes ([`qt`]); the remote injector
//! expects DirectInput `DIK_*` scan codes ([`directinput`]).  The
//! [`RemapTable`] connects the two.  Only a small, fixed set of keys is relayed;
//! every other key is "unmapped" and silently ignored by the sender.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

pub mod directinput;
pub mod qt;

/// Opaque key identifier as reported by the local input platform.
///
/// Values may exceed 16 bits: Qt places non-printable keys in the
/// `0x0100_0000` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyId(pub u32);

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match qt::key_name(*self) {
            Some(name) => f.write_str(name),
            None => write!(f, "0x{:X}", self.0),
        }
    }
}

/// An 8-bit scan code meaningful only to the remote injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScanCode(pub u8);

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}", self.0)
    }
}

/// Error returned when building a [`RemapTable`] from a pair list.
#[derive(Debug, Error, PartialEq)]
pub enum RemapError {
    /// The same key identifier appears more than once.
    #[error("duplicate remap entry for key {0}")]
    DuplicateKey(KeyId),
}

/// Immutable mapping from [`KeyId`] to [`ScanCode`].
#[derive(Debug, Clone, PartialEq)]
pub struct RemapTable {
    entries: HashMap<KeyId, ScanCode>,
}

impl RemapTable {
    /// Builds a table from `(key, scan code)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`RemapError::DuplicateKey`] if a key appears twice.
    pub fn from_pairs(pairs: &[(KeyId, ScanCode)]) -> Result<Self, RemapError> {
        let mut entries = HashMap::with_capacity(pairs.len());
        for &(key, scan_code) in pairs {
            if entries.insert(key, scan_code).is_some() {
                return Err(RemapError::DuplicateKey(key));
            }
        }
        Ok(Self { entries })
    }

    /// Returns the process-wide default table, built on first use.
    pub fn standard() -> &'static RemapTable {
        static STANDARD: OnceLock<RemapTable> = OnceLock::new();
        STANDARD.get_or_init(|| Self {
            entries: STANDARD_REMAP.iter().copied().collect(),
        })
    }

    /// Translates `key` into the target scan code.
    ///
    /// Returns `None` when the key is not relayed.  This is not an error.
    pub fn translate(&self, key: KeyId) -> Option<ScanCode> {
        self.entries.get(&key).copied()
    }

    /// Number of mapped keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table maps no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over every `(key, scan code)` pair in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (KeyId, ScanCode)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, *v))
    }
}

/// Translates `key` with the [`RemapTable::standard`] table.
pub fn translate(key: KeyId) -> Option<ScanCode> {
    RemapTable::standard().translate(key)
}

/// The relayed keys: WASDFER, 1–5, Tab, Escape, Space and Control.
const STANDARD_REMAP: &[(KeyId, ScanCode)] = &[
    // ── Movement / action letters ────────────────────────────────────────────
    (qt::KEY_W, directinput::DIK_W),
    (qt::KEY_A, directinput::DIK_A),
    (qt::KEY_S, directinput::DIK_S),
    (qt::KEY_D, directinput::DIK_D),
    (qt::KEY_F, directinput::DIK_F),
    (qt::KEY_E, directinput::DIK_E),
    (qt::KEY_R, directinput::DIK_R),
    // ── Digit row ────────────────────────────────────────────────────────────
    (qt::KEY_1, directinput::DIK_1),
    (qt::KEY_2, directinput::DIK_2),
    (qt::KEY_3, directinput::DIK_3),
    (qt::KEY_4, directinput::DIK_4),
    (qt::KEY_5, directinput::DIK_5),
    // ── Special keys (Qt extended range) ─────────────────────────────────────
    (qt::KEY_CONTROL, directinput::DIK_LCONTROL),
    (qt::KEY_TAB, directinput::DIK_TAB),
    (qt::KEY_ESCAPE, directinput::DIK_ESCAPE),
    (qt::KEY_SPACE, directinput::DIK_SPACE),
];
