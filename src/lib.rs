//! BLE HID-over-GATT keyboard host protocol engine.
//!
//! Sans-IO core of a HOGP (HID over GATT Profile) central: it finds a
//! keyboard peripheral in scan reports, walks its GATT hierarchy to locate
//! the input Report characteristics, subscribes to their notifications,
//! and decodes the 8-byte boot-keyboard reports into a character stream.
//!
//! The crate never talks to a radio.  The embedding application implements
//! [`GattTransport`] over its BLE stack and feeds every stack callback into
//! [`KeyboardHost::handle_transport_event`]; decoded keys come back through
//! a [`HostHandler`].
//!
//! ```no_run
//! use hogp_host::{Key, KeyboardHost, HostHandler, Keys};
//!
//! struct Printer;
//!
//! impl HostHandler for Printer {
//!     fn on_report(&mut self, keys: Keys) {
//!         for key in keys {
//!             match key {
//!                 Key::Char(c) => print!("{c}"),
//!                 Key::Unmapped(code) => print!("[0x{code:02X}]"),
//!             }
//!         }
//!     }
//! }
//!
//! # fn demo<T: hogp_host::GattTransport>(transport: T) {
//! let mut host = KeyboardHost::new(transport);
//! host.start_discovery(5_000).unwrap();
//! // ... feed transport events into host.handle_transport_event(...)
//! # }
//! ```
//!
//! No alloc, no blocking; everything runs on the caller's event-dispatch
//! context.  Logging goes through `defmt` or `log` by cargo feature and is
//! off by default.

#![cfg_attr(not(test), no_std)]

// This module MUST come first so the others see its macros.
pub(crate) mod fmt;

pub mod ble;
pub mod config;
pub mod error;
pub mod hid;
pub mod host;
pub mod transport;

pub use ble::discovery::{DiscoveryEngine, Outcome, Phase, ReportSlot};
pub use ble::{DeviceIdentity, PeerAddress, ReportType};
pub use error::HostError;
pub use hid::{decode_report, Key, KeyboardReport, Keys};
pub use host::{HostEvent, HostHandler, KeyboardHost};
pub use transport::{GattTransport, TransportEvent};
