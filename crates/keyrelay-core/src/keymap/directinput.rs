//! DirectInput keyboard scan codes (`DIK_*`) understood by the remote injector.
//!
//! Reference: `dinput.h`.  These are IBM PC set-1 make codes; extended keys
//! such as the right-hand modifiers would carry an `0x80` bit, but none of the
//! relayed keys need it.

use super::ScanCode;

pub const DIK_ESCAPE: ScanCode = ScanCode(0x01);
pub const DIK_1: ScanCode = ScanCode(0x02);
pub const DIK_2: ScanCode = ScanCode(0x03);
pub const DIK_3: ScanCode = ScanCode(0x04);
pub const DIK_4: ScanCode = ScanCode(0x05);
pub const DIK_5: ScanCode = ScanCode(0x06);
pub const DIK_TAB: ScanCode = ScanCode(0x0F);
pub const DIK_W: ScanCode = ScanCode(0x11);
pub const DIK_E: ScanCode = ScanCode(0x12);
pub const DIK_R: ScanCode = ScanCode(0x13);
pub const DIK_LCONTROL: ScanCode = ScanCode(0x1D);
pub const DIK_A: ScanCode = ScanCode(0x1E);
pub const DIK_S: ScanCode = ScanCode(0x1F);
pub const DIK_D: ScanCode = ScanCode(0x20);
pub const DIK_F: ScanCode = ScanCode(0x21);
pub const DIK_SPACE: ScanCode = ScanCode(0x39);
