//! Single-process, no-wire-thread integration tests: byte framing, escape
//! encoding and datagram reassembly driven directly against `Bus`, mirroring
//! this protocol's own worked scenarios (single short diagnostics
//! round-trip, escape-in-payload, bad-checksum rejection, exact-multiple
//! terminator).

use prlsc::{Bus, Callbacks, Config, Datagram, ErrorCode, ServiceConfig};

struct Loopback {
    tick: u16,
    wire: Vec<u8>,
    delivered: Vec<(u8, u8, Vec<u8>)>,
}

impl Loopback {
    fn new() -> Self {
        Loopback {
            tick: 0,
            wire: Vec::new(),
            delivered: Vec::new(),
        }
    }
}

impl Callbacks for Loopback {
    fn now(&self) -> u16 {
        self.tick
    }

    fn checksum(&self, data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, &b| acc ^ b)
    }

    fn send_byte(&mut self, byte: u8) {
        self.wire.push(byte);
    }

    fn received_datagram(&mut self, datagram: &Datagram<'_>) {
        self.delivered.push((
            datagram.service_index,
            datagram.sub_service_index,
            datagram.data.to_vec(),
        ));
    }
}

fn two_service_config() -> Config {
    Config::new(
        4,
        16,
        &[ServiceConfig::stream(0, false), ServiceConfig::diagnostics(0)],
    )
    .expect("valid config")
}

fn drain_tx<const D: usize, const T: usize>(bus: &mut Bus<D, T>, cb: &mut Loopback) {
    loop {
        let result = bus.prepare_service_transmission(cb);
        if !result.ready {
            break;
        }
        while bus.tx_byte(cb) {}
    }
}

#[test]
fn single_short_diagnostics_round_trip() {
    let cfg = two_service_config();
    let mut tx_bus: Bus<32, 64> = Bus::new(cfg);
    let mut tx_cb = Loopback::new();

    let enqueued = tx_bus.transmit_datagram(&tx_cb, 1, 0, &[0x01, 0x02, 0x03]);
    assert_eq!(enqueued, 2, "3-byte payload needs a data frame plus a terminator");
    drain_tx(&mut tx_bus, &mut tx_cb);

    // The datagram checksum fits in the under-full first frame (3 data
    // bytes < frameLengthMax 4), so the fragmenter appends it there rather
    // than waiting for the terminator: first frame carries 4 data bytes
    // (payload + checksum), second frame is the empty terminator.
    let expected_wire = [
        0xC0, 0x20, 0x04, 0x01, 0x02, 0x03, 0x00, 0x24, // data frame + checksum
        0xC0, 0x20, 0x00, 0x20, // empty terminator frame
    ];
    assert_eq!(tx_cb.wire, expected_wire);

    let mut rx_bus: Bus<32, 64> = Bus::new(two_service_config());
    let mut rx_cb = Loopback::new();
    for byte in tx_cb.wire {
        rx_bus.receive_byte(&mut rx_cb, byte);
    }

    assert_eq!(rx_cb.delivered.len(), 1);
    assert_eq!(rx_cb.delivered[0], (1, 0, vec![0x01, 0x02, 0x03]));
    assert_eq!(rx_bus.error_code(), ErrorCode::None);
}

#[test]
fn escape_in_payload_round_trips() {
    let cfg = two_service_config();
    let mut tx_bus: Bus<32, 64> = Bus::new(cfg);
    let mut tx_cb = Loopback::new();

    let enqueued = tx_bus.transmit_datagram(&tx_cb, 0, 0, &[0xC0, 0xDB]);
    assert_eq!(enqueued, 1);
    drain_tx(&mut tx_bus, &mut tx_cb);

    assert_eq!(tx_cb.wire[0], 0xC0, "start byte is never escaped");
    assert_eq!(
        tx_cb.wire.iter().filter(|&&b| b == 0xC0).count(),
        1,
        "exactly one unescaped start byte on the whole wire"
    );
    assert!(tx_cb.wire.windows(2).any(|w| w == [0xDB, 0xDC]));
    assert!(tx_cb.wire.windows(2).any(|w| w == [0xDB, 0xDD]));

    let mut rx_bus: Bus<32, 64> = Bus::new(two_service_config());
    let mut rx_cb = Loopback::new();
    for byte in tx_cb.wire {
        rx_bus.receive_byte(&mut rx_cb, byte);
    }

    assert_eq!(rx_cb.delivered.len(), 1);
    assert_eq!(rx_cb.delivered[0].2, vec![0xC0, 0xDB]);
}

#[test]
fn bad_checksum_is_rejected_but_does_not_corrupt_later_frames() {
    let cfg = two_service_config();
    let mut tx_bus: Bus<32, 64> = Bus::new(cfg);
    let mut tx_cb = Loopback::new();

    tx_bus.transmit_datagram(&tx_cb, 1, 0, &[0x01, 0x02, 0x03]);
    drain_tx(&mut tx_bus, &mut tx_cb);
    let mut good_wire = tx_cb.wire.clone();

    // corrupt the checksum byte of the first (data) frame, which is 8
    // bytes: start, service code, length, 3 data bytes, the appended
    // datagram checksum, then the frame checksum.
    let mut bad_frame = good_wire[0..8].to_vec();
    let last = bad_frame.len() - 1;
    bad_frame[last] ^= 0xFF;

    let mut rx_bus: Bus<32, 64> = Bus::new(two_service_config());
    let mut rx_cb = Loopback::new();
    for byte in bad_frame {
        rx_bus.receive_byte(&mut rx_cb, byte);
    }
    assert_eq!(rx_bus.error_code(), ErrorCode::RxFrameBadChecksum);
    assert!(rx_cb.delivered.is_empty());

    // a subsequent, correctly-framed datagram still delivers fine
    tx_cb.wire.clear();
    tx_bus.transmit_datagram(&tx_cb, 1, 0, &[0xAA, 0xBB]);
    drain_tx(&mut tx_bus, &mut tx_cb);
    good_wire.clear();
    good_wire.extend(tx_cb.wire);
    for byte in good_wire {
        rx_bus.receive_byte(&mut rx_cb, byte);
    }
    assert_eq!(rx_cb.delivered.len(), 1);
    assert_eq!(rx_cb.delivered[0].2, vec![0xAA, 0xBB]);
}

#[test]
fn exact_multiple_of_frame_length_gets_empty_terminator() {
    // frameLengthMax = 4, payload length exactly 4: must produce a full
    // data frame plus a separate length-1 terminator frame.
    let cfg = Config::new(4, 16, &[ServiceConfig::diagnostics(0)]).unwrap();
    let mut tx_bus: Bus<32, 64> = Bus::new(cfg);
    let mut tx_cb = Loopback::new();

    let enqueued = tx_bus.transmit_datagram(&tx_cb, 0, 0, &[0x01, 0x02, 0x03, 0x04]);
    assert_eq!(enqueued, 2);
    drain_tx(&mut tx_bus, &mut tx_cb);

    // first frame: start, code, len=4, 4 data bytes, checksum => 8 bytes
    // second frame: start, code, len=1, checksum byte, checksum => 5 bytes
    assert_eq!(tx_cb.wire.len(), 8 + 5);
    assert_eq!(tx_cb.wire[2], 4);
    assert_eq!(tx_cb.wire[8 + 2], 1);

    let mut rx_bus: Bus<32, 64> = Bus::new(cfg);
    let mut rx_cb = Loopback::new();
    for byte in tx_cb.wire {
        rx_bus.receive_byte(&mut rx_cb, byte);
    }
    assert_eq!(rx_cb.delivered.len(), 1);
    assert_eq!(rx_cb.delivered[0].2, vec![0x01, 0x02, 0x03, 0x04]);
}

#[test]
fn mid_stream_start_byte_resynchronises() {
    let cfg = two_service_config();
    let mut tx_bus: Bus<32, 64> = Bus::new(cfg);
    let mut tx_cb = Loopback::new();
    tx_bus.transmit_datagram(&tx_cb, 0, 0, &[0x01, 0x02]);
    drain_tx(&mut tx_bus, &mut tx_cb);

    let mut rx_bus: Bus<32, 64> = Bus::new(two_service_config());
    let mut rx_cb = Loopback::new();
    // junk prefix, including a byte that looks like mid-frame garbage,
    // followed by the real frame: the start byte must resync regardless.
    rx_bus.receive_byte(&mut rx_cb, 0x41);
    rx_bus.receive_byte(&mut rx_cb, 0x42);
    for byte in tx_cb.wire {
        rx_bus.receive_byte(&mut rx_cb, byte);
    }

    assert_eq!(rx_cb.delivered.len(), 1);
    assert_eq!(rx_cb.delivered[0].2, vec![0x01, 0x02]);
}
