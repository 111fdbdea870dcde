//! HID boot-protocol keyboard report decoding.
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved
//! Byte 2-7: Up to 6 simultaneous key usage codes, 0 = empty slot
//! ```

use crate::hid::keymap::{apply_shift, usage_to_char};
use crate::hid::Key;

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Standard HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte, ignored.
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key usage codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// Parse from raw notification bytes.
    ///
    /// Reports shorter than 8 bytes are malformed and yield `None`; longer
    /// payloads are accepted with the extra bytes ignored.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < KEYBOARD_REPORT_SIZE {
            return None;
        }
        Some(Self {
            modifier: data[0],
            reserved: data[1],
            keycodes: [data[2], data[3], data[4], data[5], data[6], data[7]],
        })
    }

    /// Lazy iterator over the decoded keys of this report, in slot order.
    ///
    /// Slot order is a design choice, not press order - the report format
    /// already lost sub-report ordering on the wire.
    pub fn keys(&self) -> Keys {
        Keys {
            report: *self,
            slot: 0,
        }
    }
}

/// Iterator produced by [`KeyboardReport::keys`].
///
/// Owns a copy of the (8-byte) report.  Empty slots (usage 0) are skipped;
/// mapped usages come out as [`Key::Char`] with the shift modifier applied,
/// unmapped ones as exactly one [`Key::Unmapped`] carrying the raw code.
#[derive(Clone)]
pub struct Keys {
    report: KeyboardReport,
    slot: usize,
}

impl Iterator for Keys {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        while self.slot < self.report.keycodes.len() {
            let usage = self.report.keycodes[self.slot];
            self.slot += 1;
            if usage == 0 {
                continue;
            }
            let key = match usage_to_char(usage) {
                Some(ch) => Key::Char(apply_shift(ch, self.report.modifier)),
                None => Key::Unmapped(usage),
            };
            return Some(key);
        }
        None
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
