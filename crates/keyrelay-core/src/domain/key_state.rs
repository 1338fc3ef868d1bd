//! Tracks which keys are currently held down.
//!
//! Entries are never removed: a released key stays in the map with `false`.
//! The universe of key identifiers a keyboard can produce is small, so the
//! map's growth is bounded in practice.

use std::collections::BTreeMap;

use crate::keymap::KeyId;

/// Mapping from [`KeyId`] to "currently held".
///
/// A key that has never been seen is treated exactly like a released key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStateTracker {
    keys: BTreeMap<KeyId, bool>,
}

impl KeyStateTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state of `key`, overwriting any previous value.
    pub fn set_pressed(&mut self, key: KeyId, pressed: bool) {
        self.keys.insert(key, pressed);
    }

    /// Returns `true` if `key` is currently held.
    pub fn is_pressed(&self, key: KeyId) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    /// Returns every held key in ascending identifier order.
    pub fn pressed_keys(&self) -> Vec<KeyId> {
        self.keys
            .iter()
            .filter(|(_, held)| **held)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Number of distinct keys ever seen, held or not.
    pub fn known_keys(&self) -> usize {
        self.keys.len()
    }
}
