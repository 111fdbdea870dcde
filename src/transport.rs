//! Transport boundary: the GATT client primitives this crate consumes.
//!
//! The radio and its BLE stack live behind [`GattTransport`].  Every method
//! is fire-and-forget: a `Ok(())` return only means the command was
//! accepted.  Results arrive later as [`TransportEvent`]s fed into
//! [`KeyboardHost::handle_transport_event`](crate::host::KeyboardHost::handle_transport_event),
//! correlated by connection and attribute handle - never by call-site
//! continuation.

use crate::ble::PeerAddress;

/// Formatting bound for transport errors: `defmt::Format` under the
/// `defmt` feature, `core::fmt::Debug` otherwise.
#[cfg(not(feature = "defmt"))]
pub trait ErrorFormat: core::fmt::Debug {}
#[cfg(not(feature = "defmt"))]
impl<T: core::fmt::Debug> ErrorFormat for T {}

/// Formatting bound for transport errors: `defmt::Format` under the
/// `defmt` feature, `core::fmt::Debug` otherwise.
#[cfg(feature = "defmt")]
pub trait ErrorFormat: defmt::Format {}
#[cfg(feature = "defmt")]
impl<T: defmt::Format> ErrorFormat for T {}

/// Asynchronous GATT client primitives, implemented over a concrete BLE
/// stack by the embedding application.
pub trait GattTransport {
    /// Error returned when the stack rejects a command outright.
    type Error: ErrorFormat;

    /// Start a scan for `timeout_ms`.  Advertisement reports and the
    /// terminal [`TransportEvent::ScanDone`] arrive as events.
    fn scan(&mut self, timeout_ms: u32, interval_us: u32, window_us: u32)
        -> Result<(), Self::Error>;

    /// Stop an in-progress scan early.
    fn stop_scan(&mut self) -> Result<(), Self::Error>;

    /// Initiate a connection to the given peer.
    fn connect(&mut self, peer: PeerAddress) -> Result<(), Self::Error>;

    /// Tear down the given connection.
    fn disconnect(&mut self, conn: u16) -> Result<(), Self::Error>;

    /// Discover primary services, filtered to a 16-bit service UUID.
    fn discover_services(&mut self, conn: u16, uuid16: u16) -> Result<(), Self::Error>;

    /// Discover characteristics in a handle range.
    fn discover_characteristics(&mut self, conn: u16, start: u16, end: u16)
        -> Result<(), Self::Error>;

    /// Discover descriptors in a handle range.
    fn discover_descriptors(&mut self, conn: u16, start: u16, end: u16)
        -> Result<(), Self::Error>;

    /// Read an attribute value; the data arrives as
    /// [`TransportEvent::ReadResult`].
    fn read(&mut self, conn: u16, handle: u16) -> Result<(), Self::Error>;

    /// Write an attribute value.  `request` selects write-with-response.
    fn write(&mut self, conn: u16, handle: u16, data: &[u8], request: bool)
        -> Result<(), Self::Error>;
}

/// Events delivered by the transport.
///
/// Payloads are borrowed from the transport's receive buffers; the core
/// copies out whatever it needs before the handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportEvent<'a> {
    /// A single advertisement report observed during scanning.
    AdvReport {
        peer: PeerAddress,
        /// Raw advertisement kind (0x00 = ADV_IND, 0x01 = ADV_DIRECT_IND, ...).
        adv_kind: u8,
        rssi: i8,
        payload: &'a [u8],
    },
    /// The scan window closed (or the scan was stopped).
    ScanDone,
    /// A connection attempt completed.
    Connected { conn: u16, peer: PeerAddress },
    /// The link dropped, or a requested disconnect completed.
    Disconnected { conn: u16 },
    /// One primary service matching the discovery filter.
    ServiceRange { conn: u16, start: u16, end: u16, uuid16: u16 },
    /// Service discovery finished.
    ServicesDone { conn: u16 },
    /// One characteristic in the requested range.
    Characteristic { conn: u16, value_handle: u16, properties: u8, uuid16: u16 },
    /// Characteristic discovery finished.
    CharacteristicsDone { conn: u16 },
    /// One descriptor in the requested range.
    Descriptor { conn: u16, handle: u16, uuid16: u16 },
    /// One descriptor-discovery request finished.
    DescriptorsDone { conn: u16 },
    /// Completion of a `read`.
    ReadResult { conn: u16, handle: u16, data: &'a [u8] },
    /// Completion of a `write` (`ok == false` means the peer rejected it).
    WriteDone { conn: u16, handle: u16, ok: bool },
    /// Unsolicited notification on a subscribed characteristic.
    Notify { conn: u16, value_handle: u16, data: &'a [u8] },
}
