//! End-to-end tests for the hogp-host façade: a scripted transport drives
//! the host from scan to steady state and delivers keyboard notifications.

use hogp_host::config::{UUID_CCCD, UUID_HID_REPORT, UUID_HID_SERVICE, UUID_REPORT_REFERENCE};
use hogp_host::{
    GattTransport, HostError, HostEvent, HostHandler, Key, KeyboardHost, Keys, PeerAddress, Phase,
    TransportEvent,
};

const PEER: PeerAddress = PeerAddress {
    kind: 0,
    addr: [0x11, 0x22, 0x33, 0x44, 0x55, 0x66],
};
const CONN: u16 = 3;

/// HID service UUID + complete local name "Kbd".
const HID_ADV: &[u8] = &[0x03, 0x03, 0x12, 0x18, 0x04, 0x09, b'K', b'b', b'd'];

/// Transport that records issued commands and can reject CCCD writes.
#[derive(Default)]
struct ScriptedTransport {
    commands: Vec<String>,
    reject_writes: bool,
}

impl GattTransport for ScriptedTransport {
    type Error = &'static str;

    fn scan(&mut self, timeout_ms: u32, _interval: u32, _window: u32) -> Result<(), Self::Error> {
        self.commands.push(format!("scan {timeout_ms}"));
        Ok(())
    }

    fn stop_scan(&mut self) -> Result<(), Self::Error> {
        self.commands.push("stop_scan".into());
        Ok(())
    }

    fn connect(&mut self, peer: PeerAddress) -> Result<(), Self::Error> {
        self.commands.push(format!("connect {:02x}", peer.addr[0]));
        Ok(())
    }

    fn disconnect(&mut self, conn: u16) -> Result<(), Self::Error> {
        self.commands.push(format!("disconnect {conn}"));
        Ok(())
    }

    fn discover_services(&mut self, conn: u16, uuid16: u16) -> Result<(), Self::Error> {
        self.commands.push(format!("services {conn} {uuid16:04x}"));
        Ok(())
    }

    fn discover_characteristics(&mut self, conn: u16, start: u16, end: u16) -> Result<(), Self::Error> {
        self.commands.push(format!("chars {conn} {start}..{end}"));
        Ok(())
    }

    fn discover_descriptors(&mut self, conn: u16, start: u16, end: u16) -> Result<(), Self::Error> {
        self.commands.push(format!("descs {conn} {start}..{end}"));
        Ok(())
    }

    fn read(&mut self, conn: u16, handle: u16) -> Result<(), Self::Error> {
        self.commands.push(format!("read {conn} {handle}"));
        Ok(())
    }

    fn write(&mut self, conn: u16, handle: u16, data: &[u8], _request: bool) -> Result<(), Self::Error> {
        if self.reject_writes {
            return Err("write rejected");
        }
        self.commands.push(format!("write {conn} {handle} {data:02x?}"));
        Ok(())
    }
}

/// Collects decoded text and lifecycle events.
#[derive(Default)]
struct Collector {
    text: String,
    reports: usize,
    events: Vec<HostEvent>,
}

impl HostHandler for Collector {
    fn on_report(&mut self, keys: Keys) {
        self.reports += 1;
        for key in keys {
            match key {
                Key::Char(c) => self.text.push(c),
                Key::Unmapped(code) => {
                    self.text.push_str(&format!("[0x{code:02X}]"));
                }
            }
        }
    }

    fn on_event(&mut self, event: HostEvent) {
        self.events.push(event);
    }
}

/// Drive the host to `Active` with one input report characteristic
/// (value handle 12, CCCD 13, Report Reference 14 → id 1, type input).
fn bring_up(host: &mut KeyboardHost<ScriptedTransport>, handler: &mut Collector) {
    host.start_discovery(5_000).unwrap();
    let events = [
        TransportEvent::AdvReport { peer: PEER, adv_kind: 0x00, rssi: -60, payload: HID_ADV },
        TransportEvent::Connected { conn: CONN, peer: PEER },
        TransportEvent::ServiceRange { conn: CONN, start: 10, end: 30, uuid16: UUID_HID_SERVICE },
        TransportEvent::ServicesDone { conn: CONN },
        TransportEvent::Characteristic {
            conn: CONN,
            value_handle: 12,
            properties: 0x10,
            uuid16: UUID_HID_REPORT,
        },
        TransportEvent::CharacteristicsDone { conn: CONN },
        TransportEvent::Descriptor { conn: CONN, handle: 13, uuid16: UUID_CCCD },
        TransportEvent::Descriptor { conn: CONN, handle: 14, uuid16: UUID_REPORT_REFERENCE },
        TransportEvent::DescriptorsDone { conn: CONN },
        TransportEvent::ReadResult { conn: CONN, handle: 14, data: &[1, 1] },
    ];
    for event in events {
        host.handle_transport_event(event, handler);
    }
}

#[test]
fn scan_to_keystroke() {
    let mut host = KeyboardHost::new(ScriptedTransport::default());
    let mut handler = Collector::default();

    bring_up(&mut host, &mut handler);
    assert_eq!(host.phase(), Phase::Active);
    assert_eq!(
        handler.events,
        [
            HostEvent::DeviceFound(hogp_host::DeviceIdentity {
                peer: PEER,
                name: "Kbd".try_into().unwrap(),
            }),
            HostEvent::Connected,
            HostEvent::Ready { inputs: 1 },
        ]
    );

    // Shift + usage 0x04 decodes to 'A'.
    host.handle_transport_event(
        TransportEvent::Notify {
            conn: CONN,
            value_handle: 12,
            data: &[0x02, 0x00, 0x04, 0, 0, 0, 0, 0],
        },
        &mut handler,
    );
    assert_eq!(handler.text, "A");
    assert_eq!(handler.reports, 1);

    let commands = &host.transport_mut().commands;
    assert_eq!(
        commands.as_slice(),
        [
            "scan 5000",
            "stop_scan",
            "connect 11",
            "services 3 1812",
            "chars 3 10..30",
            "descs 3 13..17",
            "read 3 14",
            "write 3 13 [01, 00]",
        ]
    );
}

#[test]
fn typing_a_sentence_with_shift_and_specials() {
    let mut host = KeyboardHost::new(ScriptedTransport::default());
    let mut handler = Collector::default();
    bring_up(&mut host, &mut handler);

    // "Hi!" followed by F1 (unmapped), one report per keystroke with
    // release reports in between.
    let reports: &[[u8; 8]] = &[
        [0x02, 0, 0x0B, 0, 0, 0, 0, 0], // H
        [0x00, 0, 0x00, 0, 0, 0, 0, 0], // release
        [0x00, 0, 0x0C, 0, 0, 0, 0, 0], // i
        [0x00, 0, 0x00, 0, 0, 0, 0, 0],
        [0x20, 0, 0x1E, 0, 0, 0, 0, 0], // right shift + 1 = !
        [0x00, 0, 0x00, 0, 0, 0, 0, 0],
        [0x00, 0, 0x3A, 0, 0, 0, 0, 0], // F1
    ];
    for report in reports {
        host.handle_transport_event(
            TransportEvent::Notify { conn: CONN, value_handle: 12, data: report },
            &mut handler,
        );
    }
    assert_eq!(handler.text, "Hi![0x3A]");
    // Release reports are processed too, they just carry no keys.
    assert_eq!(handler.reports, 7);
}

#[test]
fn short_notification_is_silently_discarded() {
    let mut host = KeyboardHost::new(ScriptedTransport::default());
    let mut handler = Collector::default();
    bring_up(&mut host, &mut handler);

    host.handle_transport_event(
        TransportEvent::Notify { conn: CONN, value_handle: 12, data: &[0x02, 0x00, 0x04] },
        &mut handler,
    );
    assert_eq!(handler.reports, 0);
    assert!(handler.text.is_empty());
}

#[test]
fn rejected_subscribe_still_decodes_late_notify() {
    let mut transport = ScriptedTransport::default();
    transport.reject_writes = true;
    let mut host = KeyboardHost::new(transport);
    let mut handler = Collector::default();

    bring_up(&mut host, &mut handler);
    assert!(handler
        .events
        .contains(&HostEvent::SubscribeFailed { value_handle: 12 }));
    assert!(handler.events.contains(&HostEvent::Ready { inputs: 0 }));

    // The peripheral notifies anyway; the keystroke is not lost.
    host.handle_transport_event(
        TransportEvent::Notify {
            conn: CONN,
            value_handle: 12,
            data: &[0x00, 0x00, 0x04, 0, 0, 0, 0, 0],
        },
        &mut handler,
    );
    assert_eq!(handler.text, "a");
}

#[test]
fn second_discovery_while_busy_is_rejected() {
    let mut host = KeyboardHost::new(ScriptedTransport::default());
    let mut handler = Collector::default();

    host.start_discovery(5_000).unwrap();
    assert_eq!(host.start_discovery(5_000), Err(HostError::Busy));

    // After a timeout the host is free again.
    host.handle_transport_event(TransportEvent::ScanDone, &mut handler);
    assert_eq!(handler.events, [HostEvent::ScanTimeout]);
    assert!(host.start_discovery(5_000).is_ok());
}

#[test]
fn peripheral_without_hid_service_is_released() {
    let mut host = KeyboardHost::new(ScriptedTransport::default());
    let mut handler = Collector::default();

    host.start_discovery(5_000).unwrap();
    host.handle_transport_event(
        TransportEvent::AdvReport { peer: PEER, adv_kind: 0x00, rssi: -60, payload: HID_ADV },
        &mut handler,
    );
    host.handle_transport_event(TransportEvent::Connected { conn: CONN, peer: PEER }, &mut handler);
    host.handle_transport_event(TransportEvent::ServicesDone { conn: CONN }, &mut handler);

    assert_eq!(host.phase(), Phase::Idle);
    assert!(handler.events.contains(&HostEvent::ServiceNotFound));
    assert!(host
        .transport_mut()
        .commands
        .contains(&format!("disconnect {CONN}")));
}

#[test]
fn link_drop_resets_and_allows_rescan() {
    let mut host = KeyboardHost::new(ScriptedTransport::default());
    let mut handler = Collector::default();
    bring_up(&mut host, &mut handler);

    host.handle_transport_event(TransportEvent::Disconnected { conn: CONN }, &mut handler);
    assert_eq!(host.phase(), Phase::Idle);
    assert_eq!(handler.events.last(), Some(&HostEvent::Disconnected));

    // Notifications for the dead link are stale.
    host.handle_transport_event(
        TransportEvent::Notify {
            conn: CONN,
            value_handle: 12,
            data: &[0x00, 0x00, 0x04, 0, 0, 0, 0, 0],
        },
        &mut handler,
    );
    assert!(handler.text.is_empty());

    assert!(host.start_discovery(5_000).is_ok());
}

#[test]
fn user_disconnect_mid_discovery_is_obeyed() {
    let mut host = KeyboardHost::new(ScriptedTransport::default());
    let mut handler = Collector::default();

    host.start_discovery(5_000).unwrap();
    host.handle_transport_event(
        TransportEvent::AdvReport { peer: PEER, adv_kind: 0x00, rssi: -60, payload: HID_ADV },
        &mut handler,
    );
    host.handle_transport_event(TransportEvent::Connected { conn: CONN, peer: PEER }, &mut handler);
    assert_eq!(host.phase(), Phase::DiscoveringServices);

    host.disconnect().unwrap();
    assert_eq!(host.phase(), Phase::Idle);

    // Completions of the abandoned discovery are discarded.
    host.handle_transport_event(
        TransportEvent::ServiceRange { conn: CONN, start: 10, end: 30, uuid16: UUID_HID_SERVICE },
        &mut handler,
    );
    host.handle_transport_event(TransportEvent::ServicesDone { conn: CONN }, &mut handler);
    assert_eq!(host.phase(), Phase::Idle);
    assert!(!handler.events.contains(&HostEvent::ServiceNotFound));
}
