//! HID boot-keyboard report decoding.
//!
//! Pure logic, no BLE dependencies: raw 8-byte reports in, a lazy stream
//! of decoded keys out.

pub mod keyboard;
pub mod keymap;

pub use keyboard::{KeyboardReport, Keys, KEYBOARD_REPORT_SIZE};

/// One decoded key from an input report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Printable character (shift modifier already applied).
    Char(char),
    /// Usage code with no entry in the translation table (F-keys, arrows,
    /// ...).  Carries the raw code so callers can render a placeholder.
    Unmapped(u8),
}

/// Decode a raw notification payload into a key iterator.
///
/// Returns `None` for reports shorter than 8 bytes (malformed or partial;
/// silently discarded per the boot-protocol contract).
pub fn decode_report(data: &[u8]) -> Option<Keys> {
    KeyboardReport::from_bytes(data).map(|r| r.keys())
}
