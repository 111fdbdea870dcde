//! GATT discovery state machine.
//!
//! Drives a peripheral through scan → connect → discover-services →
//! discover-characteristics → discover-descriptors → read report
//! references → enable notifications, reacting to transport events as they
//! arrive.  Nothing here blocks; every outbound call is fire-and-forget and
//! its completion is routed back by attribute handle, not by continuation.
//!
//! Peripherals get the service hierarchy wrong in every way imaginable -
//! descriptors out of order, missing Report Reference descriptors, reads
//! completing in arbitrary order - so all cross-stage bookkeeping is
//! per-slot, keyed by value handle.

use heapless::Vec;

use crate::ble::adv_parser;
use crate::ble::{DeviceIdentity, ReportType};
use crate::config::{
    CCCD_NOTIFY_ENABLE, DESCRIPTOR_WINDOW, MAX_REPORT_SLOTS, SCAN_INTERVAL_US, SCAN_WINDOW_US,
    UUID_CCCD, UUID_HID_REPORT, UUID_HID_SERVICE, UUID_REPORT_REFERENCE,
};
use crate::error::HostError;
use crate::transport::{GattTransport, TransportEvent};

/// Discovery phases, in strict forward order.
///
/// The only backward transition is the reset to `Idle` on disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Idle,
    Scanning,
    Connecting,
    DiscoveringServices,
    DiscoveringCharacteristics,
    /// Covers descriptor discovery and the interleaved Report Reference
    /// reads; per-slot pending flags track the fan-out.
    DiscoveringDescriptors,
    SubscribingNotifications,
    Active,
}

/// Bookkeeping for one discovered HID Report characteristic.
///
/// Created with only the value handle, progressively filled in as its
/// descriptors turn up, classified once the Report Reference value is read
/// back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReportSlot {
    pub value_handle: u16,
    /// Client Characteristic Configuration descriptor handle, if found.
    pub cccd_handle: Option<u16>,
    pub report_id: Option<u8>,
    pub report_type: Option<ReportType>,
    /// Handle of an outstanding Report Reference read.
    pending_ref_read: Option<u16>,
    /// A subscribe attempt was issued for this slot.  A failed CCCD write
    /// does not clear it: a notify that arrives anyway is still decoded.
    pub armed: bool,
}

impl ReportSlot {
    fn new(value_handle: u16) -> Self {
        Self {
            value_handle,
            cccd_handle: None,
            report_id: None,
            report_type: None,
            pending_ref_read: None,
            armed: false,
        }
    }

    /// Subscription target?  Slots definitively classified as something
    /// other than input are excluded; slots that never resolved a Report
    /// Reference stay in (boot keyboards may omit the descriptor).
    fn is_input_candidate(&self) -> bool {
        matches!(self.report_type, None | Some(ReportType::Input))
    }
}

/// Everything the state machine wants the caller to know about.
///
/// Report payloads are borrowed from the triggering event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome<'a> {
    /// A matching peripheral was found; connection is being attempted.
    DeviceFound(DeviceIdentity),
    /// The scan window elapsed with no match.  State is unchanged.
    ScanTimeout,
    /// The link is up; service discovery started.
    Connected,
    /// The peripheral lacks the HID service.  Connection released.
    ServiceNotFound,
    /// The HID service carries no Report characteristics.  Connection
    /// released.
    NoInputReports,
    /// A CCCD write was rejected; that slot is skipped, the rest proceed.
    SubscribeFailed { value_handle: u16 },
    /// Steady state reached; `inputs` CCCD writes were issued.
    Ready { inputs: usize },
    /// The link dropped; all tables were reset.
    Disconnected,
    /// An input report arrived on an armed characteristic.
    InputReport { value_handle: u16, data: &'a [u8] },
}

/// The discovery state machine.  One instance per host; owns the report
/// table exclusively.
pub struct DiscoveryEngine {
    phase: Phase,
    identity: Option<DeviceIdentity>,
    conn: Option<u16>,
    svc_range: Option<(u16, u16)>,
    slots: Vec<ReportSlot, MAX_REPORT_SLOTS>,
    /// Descriptor-discovery requests issued / done signals received.
    desc_requests: usize,
    desc_done: usize,
}

impl DiscoveryEngine {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            identity: None,
            conn: None,
            svc_range: None,
            slots: Vec::new(),
            desc_requests: 0,
            desc_done: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn connection(&self) -> Option<u16> {
        self.conn
    }

    pub fn slots(&self) -> &[ReportSlot] {
        &self.slots
    }

    /// Drop all accumulated state and return to `Idle`.  The captured
    /// identity goes too: a new session starts with a fresh scan.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.identity = None;
        self.conn = None;
        self.svc_range = None;
        self.slots.clear();
        self.desc_requests = 0;
        self.desc_done = 0;
    }

    /// Start a scan filtered (in software) to HID peripherals.
    ///
    /// Rejected while a session is in progress: wait for completion,
    /// timeout, or call a disconnect first.
    pub fn start_scan<T: GattTransport>(
        &mut self,
        transport: &mut T,
        timeout_ms: u32,
    ) -> Result<(), HostError<T::Error>> {
        if self.phase != Phase::Idle {
            return Err(HostError::Busy);
        }
        transport.scan(timeout_ms, SCAN_INTERVAL_US, SCAN_WINDOW_US)?;
        info!("scan started ({} ms window)", timeout_ms);
        self.phase = Phase::Scanning;
        Ok(())
    }

    /// Events for a connection other than the live one are stale: they
    /// belong to an abandoned session and must be dropped.
    fn is_current(&self, conn: u16) -> bool {
        self.conn == Some(conn)
    }

    /// Feed one transport event through the machine.
    ///
    /// `emit` receives zero or more [`Outcome`]s; further transport
    /// commands may be issued before it returns.
    pub fn handle_event<'a, T, F>(
        &mut self,
        transport: &mut T,
        event: TransportEvent<'a>,
        emit: &mut F,
    ) where
        T: GattTransport,
        F: FnMut(Outcome<'a>),
    {
        match event {
            TransportEvent::AdvReport {
                peer,
                adv_kind,
                payload,
                ..
            } => {
                if self.phase != Phase::Scanning
                    || !adv_parser::is_connectable(adv_kind)
                    || !adv_parser::has_hid_service(payload)
                {
                    return;
                }
                // First match wins; no RSSI or name ranking.
                let identity = DeviceIdentity {
                    peer,
                    name: adv_parser::local_name(payload).unwrap_or_default(),
                };
                info!("HID peripheral found: {}", identity.name.as_str());
                self.identity = Some(identity.clone());
                if let Err(e) = transport.stop_scan() {
                    warn!("stop_scan rejected: {:?}", e);
                }
                if let Err(e) = transport.connect(peer) {
                    warn!("connect rejected: {:?}", e);
                    self.reset();
                    return;
                }
                self.phase = Phase::Connecting;
                emit(Outcome::DeviceFound(identity));
            }

            TransportEvent::ScanDone => match self.phase {
                Phase::Scanning => {
                    info!("scan window elapsed, no HID peripheral");
                    self.phase = Phase::Idle;
                    emit(Outcome::ScanTimeout);
                }
                // Confirmation of our own stop_scan after a match.
                Phase::Connecting => {}
                _ => {}
            },

            TransportEvent::Connected { conn, peer } => {
                if self.phase != Phase::Connecting {
                    // A connect attempt from an abandoned session just
                    // completed; release the link instead of leaving the
                    // peripheral attached to a host that will ignore it.
                    if !self.is_current(conn) {
                        debug!("unexpected connect for conn {}, releasing", conn);
                        let _ = transport.disconnect(conn);
                    }
                    return;
                }
                match &self.identity {
                    Some(id) if id.peer == peer => {}
                    // Another central's peripheral, not our target.
                    _ => {
                        debug!("connect event for unknown peer, ignoring");
                        return;
                    }
                }
                self.conn = Some(conn);
                if let Err(e) = transport.discover_services(conn, UUID_HID_SERVICE) {
                    warn!("service discovery rejected: {:?}", e);
                    let _ = transport.disconnect(conn);
                    self.reset();
                    return;
                }
                self.phase = Phase::DiscoveringServices;
                emit(Outcome::Connected);
            }

            TransportEvent::Disconnected { conn } => {
                // While connecting no handle exists yet; treat the drop as
                // a failed connect attempt.
                let ours =
                    self.is_current(conn) || (self.phase == Phase::Connecting && self.conn.is_none());
                if !ours {
                    trace!("stale disconnect for conn {}", conn);
                    return;
                }
                info!("disconnected");
                self.reset();
                emit(Outcome::Disconnected);
            }

            TransportEvent::ServiceRange {
                conn,
                start,
                end,
                uuid16,
            } => {
                if !self.is_current(conn) || self.phase != Phase::DiscoveringServices {
                    return;
                }
                if uuid16 == UUID_HID_SERVICE && self.svc_range.is_none() {
                    debug!("HID service at {}..={}", start, end);
                    self.svc_range = Some((start, end));
                }
            }

            TransportEvent::ServicesDone { conn } => {
                if !self.is_current(conn) || self.phase != Phase::DiscoveringServices {
                    return;
                }
                let Some((start, end)) = self.svc_range else {
                    warn!("peripheral has no HID service");
                    let _ = transport.disconnect(conn);
                    self.reset();
                    emit(Outcome::ServiceNotFound);
                    return;
                };
                if let Err(e) = transport.discover_characteristics(conn, start, end) {
                    warn!("characteristic discovery rejected: {:?}", e);
                    let _ = transport.disconnect(conn);
                    self.reset();
                    return;
                }
                self.phase = Phase::DiscoveringCharacteristics;
            }

            TransportEvent::Characteristic {
                conn,
                value_handle,
                uuid16,
                ..
            } => {
                if !self.is_current(conn) || self.phase != Phase::DiscoveringCharacteristics {
                    return;
                }
                if uuid16 != UUID_HID_REPORT {
                    return;
                }
                // Input, output, or feature: the Report Reference
                // descriptor will tell.  Register the handle for now.
                if self.slots.iter().any(|s| s.value_handle == value_handle) {
                    return;
                }
                if self.slots.push(ReportSlot::new(value_handle)).is_err() {
                    warn!("report table full, ignoring handle {}", value_handle);
                }
            }

            TransportEvent::CharacteristicsDone { conn } => {
                if !self.is_current(conn) || self.phase != Phase::DiscoveringCharacteristics {
                    return;
                }
                if self.slots.is_empty() {
                    warn!("HID service has no Report characteristics");
                    let _ = transport.disconnect(conn);
                    self.reset();
                    emit(Outcome::NoInputReports);
                    return;
                }
                // One bounded-window descriptor sweep per report; the exact
                // end handle of each characteristic is not tracked.  The
                // attribute table ends at 0xFFFF, so the window is clamped
                // there and a report at the very end has no descriptors.
                self.phase = Phase::DiscoveringDescriptors;
                for slot in &self.slots {
                    let vh = slot.value_handle;
                    let Some(start) = vh.checked_add(1) else {
                        warn!("report {} leaves no room for descriptors", vh);
                        continue;
                    };
                    let end = vh.saturating_add(DESCRIPTOR_WINDOW);
                    match transport.discover_descriptors(conn, start, end) {
                        Ok(()) => self.desc_requests += 1,
                        Err(e) => warn!("descriptor discovery for {} rejected: {:?}", vh, e),
                    }
                }
                self.maybe_subscribe(transport, emit);
            }

            TransportEvent::Descriptor {
                conn,
                handle,
                uuid16,
            } => {
                if !self.is_current(conn) || self.phase != Phase::DiscoveringDescriptors {
                    return;
                }
                // The descriptor belongs to the nearest report whose value
                // handle precedes it within the sweep window.
                let slot = self
                    .slots
                    .iter_mut()
                    .filter(|s| {
                        s.value_handle < handle && handle - s.value_handle <= DESCRIPTOR_WINDOW
                    })
                    .max_by_key(|s| s.value_handle);
                let Some(slot) = slot else {
                    trace!("descriptor {} outside any report window", handle);
                    return;
                };
                match uuid16 {
                    // First CCCD wins, never overwritten.
                    UUID_CCCD if slot.cccd_handle.is_none() => {
                        slot.cccd_handle = Some(handle);
                    }
                    UUID_REPORT_REFERENCE
                        if slot.report_type.is_none() && slot.pending_ref_read.is_none() =>
                    {
                        match transport.read(conn, handle) {
                            Ok(()) => slot.pending_ref_read = Some(handle),
                            // Leave the slot unclassified; it stays a
                            // subscription candidate.
                            Err(e) => warn!("report reference read rejected: {:?}", e),
                        }
                    }
                    _ => {}
                }
            }

            TransportEvent::DescriptorsDone { conn } => {
                if !self.is_current(conn) || self.phase != Phase::DiscoveringDescriptors {
                    return;
                }
                self.desc_done += 1;
                self.maybe_subscribe(transport, emit);
            }

            TransportEvent::ReadResult { conn, handle, data } => {
                if !self.is_current(conn) {
                    return;
                }
                let Some(slot) = self
                    .slots
                    .iter_mut()
                    .find(|s| s.pending_ref_read == Some(handle))
                else {
                    trace!("read result for unknown handle {}", handle);
                    return;
                };
                slot.pending_ref_read = None;
                if data.len() >= 2 {
                    slot.report_id = Some(data[0]);
                    slot.report_type = Some(ReportType::from(data[1]));
                    debug!(
                        "report {} classified: id={} type={}",
                        slot.value_handle, data[0], data[1]
                    );
                } else {
                    warn!("short report reference value on handle {}", handle);
                }
                self.maybe_subscribe(transport, emit);
            }

            TransportEvent::WriteDone { conn, handle, ok } => {
                if !self.is_current(conn) || ok {
                    return;
                }
                // The slot stays armed: a notify that shows up regardless
                // is still worth decoding.
                if let Some(slot) = self.slots.iter().find(|s| s.cccd_handle == Some(handle)) {
                    warn!("CCCD write to {} failed", handle);
                    emit(Outcome::SubscribeFailed {
                        value_handle: slot.value_handle,
                    });
                }
            }

            TransportEvent::Notify {
                conn,
                value_handle,
                data,
            } => {
                if !self.is_current(conn) {
                    trace!("stale notify for conn {}", conn);
                    return;
                }
                // Phase ordering is never perfectly clean: gate on the
                // slot's armed flag, not on `Phase::Active`.
                match self.slots.iter().find(|s| s.value_handle == value_handle) {
                    Some(slot) if slot.armed => emit(Outcome::InputReport { value_handle, data }),
                    Some(_) => debug!("notify on {} before arming, dropped", value_handle),
                    None => trace!("notify on unknown handle {}", value_handle),
                }
            }
        }
    }

    /// Advance to the subscribe pass once every descriptor sweep has
    /// finished and no Report Reference read is outstanding.
    fn maybe_subscribe<'a, T, F>(&mut self, transport: &mut T, emit: &mut F)
    where
        T: GattTransport,
        F: FnMut(Outcome<'a>),
    {
        if self.phase != Phase::DiscoveringDescriptors
            || self.desc_done < self.desc_requests
            || self.slots.iter().any(|s| s.pending_ref_read.is_some())
        {
            return;
        }
        self.phase = Phase::SubscribingNotifications;

        let conn = match self.conn {
            Some(c) => c,
            None => return,
        };
        let mut inputs = 0;
        for slot in self.slots.iter_mut() {
            if !slot.is_input_candidate() {
                debug!("report {} is not input, skipping", slot.value_handle);
                continue;
            }
            let Some(cccd) = slot.cccd_handle else {
                warn!("report {} has no CCCD, cannot subscribe", slot.value_handle);
                continue;
            };
            if slot.armed {
                continue;
            }
            slot.armed = true;
            match transport.write(conn, cccd, &CCCD_NOTIFY_ENABLE.to_le_bytes(), true) {
                Ok(()) => inputs += 1,
                Err(e) => {
                    warn!("CCCD write to {} rejected: {:?}", cccd, e);
                    emit(Outcome::SubscribeFailed {
                        value_handle: slot.value_handle,
                    });
                }
            }
        }
        info!("notifications enabled on {} input report(s)", inputs);
        self.phase = Phase::Active;
        emit(Outcome::Ready { inputs });
    }
}

impl Default for DiscoveryEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests
// ═══════════════════════════════════════════════════════════════════════════
