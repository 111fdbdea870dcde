//! Protocol constants and compile-time configuration.
//!
//! All GATT UUIDs, timing parameters, and table capacities live here so
//! they can be tuned in one place.

// Scanning

/// Default scan timeout if the caller does not supply one (ms).
pub const SCAN_TIMEOUT_MS: u32 = 5_000;

/// Scan interval passed to the transport (microseconds).
pub const SCAN_INTERVAL_US: u32 = 30_000;

/// Scan window passed to the transport (microseconds).
pub const SCAN_WINDOW_US: u32 = 30_000;

// GATT discovery

/// Maximum number of HID Report characteristics tracked per connection.
///
/// Real keyboards expose one to three (input, output LED, feature); eight
/// leaves room for combo devices that also carry mouse/consumer reports.
pub const MAX_REPORT_SLOTS: usize = 8;

/// Descriptor-discovery window after a Report characteristic's value
/// handle.  The exact end handle of a characteristic is not tracked
/// separately, so descriptors are searched in `value_handle + 1 ..=
/// value_handle + DESCRIPTOR_WINDOW`.
pub const DESCRIPTOR_WINDOW: u16 = 5;

/// Capacity of the advertised-name buffer.
pub const MAX_NAME_LEN: usize = 32;

// 16-bit assigned numbers (Bluetooth SIG)

/// HID service (HOGP).
pub const UUID_HID_SERVICE: u16 = 0x1812;

/// HID Report characteristic.
pub const UUID_HID_REPORT: u16 = 0x2A4D;

/// Client Characteristic Configuration descriptor.
pub const UUID_CCCD: u16 = 0x2902;

/// Report Reference descriptor (report ID + report type).
pub const UUID_REPORT_REFERENCE: u16 = 0x2908;

/// CCCD value enabling notifications (16-bit little-endian on the wire).
pub const CCCD_NOTIFY_ENABLE: u16 = 0x0001;
