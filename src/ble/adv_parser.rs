//! BLE advertisement payload parsing.
//!
//! Advertisement data is a sequence of AD structures: `len | type | data`,
//! where `len` counts the type byte plus the data.  We only care about
//! three of them: 16-bit service UUID lists (to spot the HID service),
//! and the shortened/complete local name.

use heapless::String;

use crate::config::{MAX_NAME_LEN, UUID_HID_SERVICE};

/// AD type: incomplete list of 16-bit service UUIDs.
const AD_UUID16_INCOMPLETE: u8 = 0x02;
/// AD type: complete list of 16-bit service UUIDs.
const AD_UUID16_COMPLETE: u8 = 0x03;
/// AD type: shortened local name.
const AD_NAME_SHORT: u8 = 0x08;
/// AD type: complete local name.
const AD_NAME_COMPLETE: u8 = 0x09;

/// Connectable undirected advertising.
pub const ADV_IND: u8 = 0x00;
/// Connectable directed advertising.
pub const ADV_DIRECT_IND: u8 = 0x01;

/// Iterator over the AD structures of an advertisement payload.
///
/// Malformed input (zero length, structure running past the buffer) ends
/// iteration rather than erroring; a scan report is never worth failing on.
struct AdStructures<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = (u8, &'a [u8]);

    fn next(&mut self) -> Option<(u8, &'a [u8])> {
        let (&len, tail) = self.rest.split_first()?;
        let len = len as usize;
        if len == 0 || len > tail.len() {
            return None;
        }
        let (body, rest) = tail.split_at(len);
        self.rest = rest;
        Some((body[0], &body[1..]))
    }
}

fn structures(payload: &[u8]) -> AdStructures<'_> {
    AdStructures { rest: payload }
}

/// Is this advertisement kind one we can connect to?
pub fn is_connectable(adv_kind: u8) -> bool {
    matches!(adv_kind, ADV_IND | ADV_DIRECT_IND)
}

/// Does the payload advertise the HID service (0x1812)?
pub fn has_hid_service(payload: &[u8]) -> bool {
    structures(payload)
        .filter(|&(t, _)| t == AD_UUID16_INCOMPLETE || t == AD_UUID16_COMPLETE)
        .flat_map(|(_, data)| data.chunks_exact(2))
        .any(|uuid| u16::from_le_bytes([uuid[0], uuid[1]]) == UUID_HID_SERVICE)
}

/// Extract the shortened or complete local name, truncated to the buffer
/// capacity.  Returns `None` if the payload carries no name.
pub fn local_name(payload: &[u8]) -> Option<String<MAX_NAME_LEN>> {
    structures(payload)
        .find(|&(t, _)| t == AD_NAME_SHORT || t == AD_NAME_COMPLETE)
        .map(|(_, data)| {
            let mut name = String::new();
            for &b in data {
                if name.push(b as char).is_err() {
                    break;
                }
            }
            name
        })
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_hid_uuid_in_complete_list() {
        // len=3, type=0x03 (Complete 16-bit UUIDs), UUID=0x1812 LE
        let payload = [0x03, 0x03, 0x12, 0x18];
        assert!(has_hid_service(&payload));
    }

    #[test]
    fn detect_hid_uuid_in_incomplete_list() {
        let payload = [0x03, 0x02, 0x12, 0x18];
        assert!(has_hid_service(&payload));
    }

    #[test]
    fn reject_other_service_uuid() {
        // Battery Service (0x180F)
        let payload = [0x03, 0x03, 0x0F, 0x18];
        assert!(!has_hid_service(&payload));
    }

    #[test]
    fn hid_uuid_among_multiple_uuids() {
        let payload = [
            0x07, 0x03, // len=7, Complete 16-bit UUIDs
            0x0F, 0x18, // Battery
            0x12, 0x18, // HID
            0x01, 0x18, // GATT
        ];
        assert!(has_hid_service(&payload));
    }

    #[test]
    fn empty_payload() {
        assert!(!has_hid_service(&[]));
        assert!(local_name(&[]).is_none());
    }

    #[test]
    fn malformed_zero_length_structure() {
        assert!(!has_hid_service(&[0x00]));
    }

    #[test]
    fn malformed_structure_past_end() {
        // Claims 5 bytes but only 2 follow.
        assert!(!has_hid_service(&[0x05, 0x03, 0x12]));
    }

    #[test]
    fn extract_complete_local_name() {
        let payload = [
            0x09, 0x09, b'K', b'e', b'y', b'b', b'o', b'a', b'r', b'd',
        ];
        assert_eq!(local_name(&payload).unwrap().as_str(), "Keyboard");
    }

    #[test]
    fn extract_shortened_local_name() {
        let payload = [0x05, 0x08, b'B', b'T', b' ', b'K'];
        assert_eq!(local_name(&payload).unwrap().as_str(), "BT K");
    }

    #[test]
    fn no_name_in_flags_only_payload() {
        let payload = [0x02, 0x01, 0x06];
        assert!(local_name(&payload).is_none());
    }

    #[test]
    fn name_truncated_to_capacity() {
        let mut payload = [b'X'; 40];
        payload[0] = 36;
        payload[1] = AD_NAME_COMPLETE;
        let name = local_name(&payload).unwrap();
        assert_eq!(name.len(), MAX_NAME_LEN);
    }

    #[test]
    fn name_and_uuids_in_same_payload() {
        let payload = [
            0x03, 0x03, 0x12, 0x18, // HID UUID
            0x04, 0x09, b'K', b'b', b'd', // name
        ];
        assert!(has_hid_service(&payload));
        assert_eq!(local_name(&payload).unwrap().as_str(), "Kbd");
    }

    #[test]
    fn connectable_adv_kinds() {
        assert!(is_connectable(ADV_IND));
        assert!(is_connectable(ADV_DIRECT_IND));
        assert!(!is_connectable(0x02)); // ADV_SCAN_IND
        assert!(!is_connectable(0x03)); // ADV_NONCONN_IND
    }
}
