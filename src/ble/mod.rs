//! Bluetooth Low Energy subsystem.
//!
//! This module drives a BLE stack (reached through
//! [`GattTransport`](crate::transport::GattTransport)) in **Central** role:
//!
//! 1. **Advertisement parser** - filters scan reports to peripherals
//!    advertising the HID-over-GATT Profile (HOGP).
//! 2. **Discovery engine** - walks the GATT
//!    service/characteristic/descriptor hierarchy of a connected
//!    peripheral, classifies its Report characteristics, and subscribes to
//!    input-report notifications.

pub mod adv_parser;
pub mod discovery;

use heapless::String;

use crate::config::MAX_NAME_LEN;

/// BLE peer address as delivered by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress {
    /// Address kind (public / random), transport-defined encoding.
    pub kind: u8,
    /// 48-bit device address.
    pub addr: [u8; 6],
}

/// Identity of the peripheral captured during scanning.
///
/// Fixed on advertisement match and compared by value to correlate later
/// connect/disconnect events to the chosen target.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    pub peer: PeerAddress,
    /// Advertised local name, truncated to `MAX_NAME_LEN` bytes.
    pub name: String<MAX_NAME_LEN>,
}

/// HID report type from a Report Reference descriptor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportType {
    Input,
    Output,
    Feature,
    /// Value outside the assigned 1..=3 range.
    Unknown(u8),
}

impl From<u8> for ReportType {
    fn from(raw: u8) -> Self {
        match raw {
            1 => ReportType::Input,
            2 => ReportType::Output,
            3 => ReportType::Feature,
            other => ReportType::Unknown(other),
        }
    }
}
