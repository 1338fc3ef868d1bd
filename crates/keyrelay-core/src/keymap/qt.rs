//! Qt key codes (`Qt::Key`) as reported by `QKeyEvent::key()`.
//!
//! Reference: `qnamespace.h`.
//!
//! # How Qt numbers its keys (for beginners)
//!
//! Printable keys use their upper-case Latin-1 code point: `Key_W` is `0x57`
//! (ASCII `'W'`) and `Key_Space` is `0x20`.  Keys without a printable
//! character live in a reserved range starting at `0x0100_0000`, e.g.
//! `Key_Escape = 0x0100_0000` and `Key_Control = 0x0100_0021`.  That is why
//! [`KeyId`] is 32 bits wide.
//!
//! Only the keys needed for display and console input are named here; the
//! relay itself only cares about the entries in the remap table.

use super::KeyId;

pub const KEY_SPACE: KeyId = KeyId(0x20);
pub const KEY_1: KeyId = KeyId(0x31);
pub const KEY_2: KeyId = KeyId(0x32);
pub const KEY_3: KeyId = KeyId(0x33);
pub const KEY_4: KeyId = KeyId(0x34);
pub const KEY_5: KeyId = KeyId(0x35);
pub const KEY_A: KeyId = KeyId(0x41);
pub const KEY_D: KeyId = KeyId(0x44);
pub const KEY_E: KeyId = KeyId(0x45);
pub const KEY_F: KeyId = KeyId(0x46);
pub const KEY_R: KeyId = KeyId(0x52);
pub const KEY_S: KeyId = KeyId(0x53);
pub const KEY_W: KeyId = KeyId(0x57);

pub const KEY_ESCAPE: KeyId = KeyId(0x0100_0000);
pub const KEY_TAB: KeyId = KeyId(0x0100_0001);
pub const KEY_CONTROL: KeyId = KeyId(0x0100_0021);

/// Names for keys in the `0x0100_0000` range plus Space.
const NAMED_KEYS: &[(u32, &str)] = &[
    (0x20, "Space"),
    (0x0100_0000, "Escape"),
    (0x0100_0001, "Tab"),
    (0x0100_0002, "Backtab"),
    (0x0100_0003, "Backspace"),
    (0x0100_0004, "Return"),
    (0x0100_0005, "Enter"),
    (0x0100_0006, "Insert"),
    (0x0100_0007, "Delete"),
    (0x0100_0008, "Pause"),
    (0x0100_0009, "Print"),
    (0x0100_0010, "Home"),
    (0x0100_0011, "End"),
    (0x0100_0012, "Left"),
    (0x0100_0013, "Up"),
    (0x0100_0014, "Right"),
    (0x0100_0015, "Down"),
    (0x0100_0016, "PageUp"),
    (0x0100_0017, "PageDown"),
    (0x0100_0020, "Shift"),
    (0x0100_0021, "Control"),
    (0x0100_0022, "Meta"),
    (0x0100_0023, "Alt"),
    (0x0100_0024, "CapsLock"),
    (0x0100_0025, "NumLock"),
    (0x0100_0026, "ScrollLock"),
    (0x0100_0030, "F1"),
    (0x0100_0031, "F2"),
    (0x0100_0032, "F3"),
    (0x0100_0033, "F4"),
    (0x0100_0034, "F5"),
    (0x0100_0035, "F6"),
    (0x0100_0036, "F7"),
    (0x0100_0037, "F8"),
    (0x0100_0038, "F9"),
    (0x0100_0039, "F10"),
    (0x0100_003A, "F11"),
    (0x0100_003B, "F12"),
];

const LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Returns the display name of `key`, or `None` for keys without a name here.
pub fn key_name(key: KeyId) -> Option<&'static str> {
    match key.0 {
        c @ 0x41..=0x5A => Some(LETTERS[(c - 0x41) as usize]),
        c @ 0x30..=0x39 => Some(DIGITS[(c - 0x30) as usize]),
        c => NAMED_KEYS
            .iter()
            .find(|(code, _)| *code == c)
            .map(|(_, name)| *name),
    }
}

/// Looks up a key by name, case-insensitively.
///
/// Accepts single letters and digits (`"w"`, `"1"`), the names from
/// [`key_name`] (`"space"`, `"Control"`), the aliases `"esc"` and `"ctrl"`, and
/// hexadecimal identifiers (`"0x57"`).
pub fn key_from_name(name: &str) -> Option<KeyId> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix("0x").or_else(|| name.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok().map(KeyId);
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Some(KeyId(c.to_ascii_uppercase() as u32));
        }
    }

    let canonical = match name.to_ascii_lowercase().as_str() {
        "esc" => "escape",
        "ctrl" => "control",
        other => return find_named(other),
    };
    find_named(canonical)
}

fn find_named(lower: &str) -> Option<KeyId> {
    NAMED_KEYS
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(lower))
        .map(|(code, _)| KeyId(*code))
}
