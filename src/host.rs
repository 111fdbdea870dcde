//! Host controller façade.
//!
//! [`KeyboardHost`] wires the discovery state machine to the report
//! decoder and to the transport.  The application constructs one, holds
//! it, and feeds it every low-level event its BLE stack produces; decoded
//! keys and lifecycle changes come back through a [`HostHandler`].
//!
//! The handler is invoked synchronously from
//! [`handle_transport_event`](KeyboardHost::handle_transport_event), on the
//! caller's event-dispatch context.  Nothing here blocks or sleeps.

use crate::ble::discovery::{DiscoveryEngine, Outcome, Phase};
use crate::ble::DeviceIdentity;
use crate::error::HostError;
use crate::hid::{decode_report, Keys};
use crate::transport::{GattTransport, TransportEvent};

/// Lifecycle events reported to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostEvent {
    /// A matching peripheral was found; connecting to it.
    DeviceFound(DeviceIdentity),
    /// The scan window elapsed with no match.  Rescan at will.
    ScanTimeout,
    /// Link established; GATT discovery running.
    Connected,
    /// The peripheral lacks the HID service; connection released.
    ServiceNotFound,
    /// The HID service exposes no Report characteristics; connection
    /// released.
    NoInputReports,
    /// Enabling notifications failed for one report; the rest proceed.
    SubscribeFailed { value_handle: u16 },
    /// Steady state: notifications enabled on `inputs` report(s).
    Ready { inputs: usize },
    /// The link dropped; a new session starts with a fresh scan.
    Disconnected,
}

/// Application callbacks.
///
/// `on_report` fires once per well-formed notify; the iterator may be
/// empty (key-release reports carry no pressed keys).
pub trait HostHandler {
    /// Decoded keys of one input report, in slot order.
    fn on_report(&mut self, keys: Keys);

    /// Lifecycle change.  Default: ignore.
    fn on_event(&mut self, event: HostEvent) {
        let _ = event;
    }
}

/// BLE HID keyboard host: scan, connect, discover, subscribe, decode.
///
/// Single-peripheral by design; at most one live connection at a time.
pub struct KeyboardHost<T: GattTransport> {
    transport: T,
    engine: DiscoveryEngine,
}

impl<T: GattTransport> KeyboardHost<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            engine: DiscoveryEngine::new(),
        }
    }

    /// Current discovery phase (diagnostics).
    pub fn phase(&self) -> Phase {
        self.engine.phase()
    }

    /// Access the wrapped transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Start scanning for a HID peripheral and connect to the first match.
    ///
    /// Returns [`HostError::Busy`] while a session is in progress.
    pub fn start_discovery(&mut self, timeout_ms: u32) -> Result<(), HostError<T::Error>> {
        self.engine.start_scan(&mut self.transport, timeout_ms)
    }

    /// Abort the session: stop scanning or drop the connection, whatever
    /// is in flight.  Completions of abandoned requests are discarded as
    /// stale when they eventually arrive.
    pub fn disconnect(&mut self) -> Result<(), HostError<T::Error>> {
        match self.engine.phase() {
            Phase::Idle => {}
            Phase::Scanning => {
                self.transport.stop_scan()?;
            }
            _ => {
                if let Some(conn) = self.engine.connection() {
                    self.transport.disconnect(conn)?;
                }
            }
        }
        self.engine.reset();
        Ok(())
    }

    /// The single inbound hook: feed every transport event here.
    pub fn handle_transport_event<H: HostHandler>(
        &mut self,
        event: TransportEvent<'_>,
        handler: &mut H,
    ) {
        self.engine
            .handle_event(&mut self.transport, event, &mut |outcome| match outcome {
                Outcome::InputReport { data, .. } => {
                    // Reports shorter than 8 bytes are malformed partials;
                    // dropped without surfacing an error.
                    if let Some(keys) = decode_report(data) {
                        handler.on_report(keys);
                    }
                }
                Outcome::DeviceFound(id) => handler.on_event(HostEvent::DeviceFound(id)),
                Outcome::ScanTimeout => handler.on_event(HostEvent::ScanTimeout),
                Outcome::Connected => handler.on_event(HostEvent::Connected),
                Outcome::ServiceNotFound => handler.on_event(HostEvent::ServiceNotFound),
                Outcome::NoInputReports => handler.on_event(HostEvent::NoInputReports),
                Outcome::SubscribeFailed { value_handle } => {
                    handler.on_event(HostEvent::SubscribeFailed { value_handle })
                }
                Outcome::Ready { inputs } => handler.on_event(HostEvent::Ready { inputs }),
                Outcome::Disconnected => handler.on_event(HostEvent::Disconnected),
            });
    }
}
