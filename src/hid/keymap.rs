//! HID usage-code to character translation (US layout, boot protocol).
//!
//! Usage IDs come from the HID Usage Tables, Keyboard/Keypad page: letters
//! `a`..`z` start at 0x04, the digit row `1`..`0` occupies 0x1E..0x27.
//! Keys without a printable mapping (F-keys, arrows, ...) have no entry.

/// Modifier-byte mask covering Left Shift (bit 1) and Right Shift (bit 5).
pub const SHIFT_MASK: u8 = 0x22;

/// Translate a key usage code to its unshifted US-layout character.
///
/// Returns `None` for usage codes with no printable mapping.
pub fn usage_to_char(usage: u8) -> Option<char> {
    let ch = match usage {
        0x04..=0x1D => (b'a' + (usage - 0x04)) as char,
        0x1E..=0x26 => (b'1' + (usage - 0x1E)) as char,
        0x27 => '0',
        0x28 => '\n',       // Enter
        0x2A => '\u{8}',    // Backspace
        0x2C => ' ',
        0x2D => '-',
        0x2E => '=',
        0x2F => '[',
        0x30 => ']',
        0x31 => '\\',
        0x33 => ';',
        0x34 => '\'',
        0x35 => '`',
        0x36 => ',',
        0x37 => '.',
        0x38 => '/',
        _ => return None,
    };
    Some(ch)
}

/// Shifted variant of an unshifted character.
///
/// Letters uppercase; digits and punctuation map through the fixed US
/// table; characters with no shifted variant are returned unchanged.
pub fn shifted(ch: char) -> char {
    if ch.is_ascii_lowercase() {
        return ch.to_ascii_uppercase();
    }
    match ch {
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        '`' => '~',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        other => other,
    }
}

/// Apply the modifier byte to an unshifted character.
pub fn apply_shift(ch: char, modifier: u8) -> char {
    if modifier & SHIFT_MASK != 0 {
        shifted(ch)
    } else {
        ch
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_range_maps_to_lowercase() {
        assert_eq!(usage_to_char(0x04), Some('a'));
        assert_eq!(usage_to_char(0x0B), Some('h'));
        assert_eq!(usage_to_char(0x1D), Some('z'));
    }

    #[test]
    fn digit_row_wraps_zero() {
        assert_eq!(usage_to_char(0x1E), Some('1'));
        assert_eq!(usage_to_char(0x26), Some('9'));
        assert_eq!(usage_to_char(0x27), Some('0'));
    }

    #[test]
    fn whitespace_and_control_keys() {
        assert_eq!(usage_to_char(0x2C), Some(' '));
        assert_eq!(usage_to_char(0x28), Some('\n'));
        assert_eq!(usage_to_char(0x2A), Some('\u{8}'));
    }

    #[test]
    fn unmapped_usages_return_none() {
        assert_eq!(usage_to_char(0x00), None);
        assert_eq!(usage_to_char(0x29), None); // Escape
        assert_eq!(usage_to_char(0x32), None); // Non-US # / ~
        assert_eq!(usage_to_char(0x3A), None); // F1
        assert_eq!(usage_to_char(0xFF), None);
    }

    #[test]
    fn shift_uppercases_letters() {
        assert_eq!(shifted('a'), 'A');
        assert_eq!(shifted('z'), 'Z');
    }

    #[test]
    fn shift_maps_digits_and_punctuation() {
        assert_eq!(shifted('1'), '!');
        assert_eq!(shifted('0'), ')');
        assert_eq!(shifted('\''), '"');
        assert_eq!(shifted('/'), '?');
        assert_eq!(shifted('`'), '~');
    }

    #[test]
    fn shift_without_variant_is_identity() {
        assert_eq!(shifted(' '), ' ');
        assert_eq!(shifted('\n'), '\n');
    }

    #[test]
    fn apply_shift_respects_either_shift_bit() {
        assert_eq!(apply_shift('a', 0x02), 'A'); // left shift
        assert_eq!(apply_shift('a', 0x20), 'A'); // right shift
        assert_eq!(apply_shift('a', 0x22), 'A'); // both
        assert_eq!(apply_shift('a', 0x00), 'a');
        assert_eq!(apply_shift('a', 0x01), 'a'); // ctrl is not shift
    }
}
