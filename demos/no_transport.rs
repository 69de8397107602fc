//! Single-process loopback demo: a diagnostics datagram sent and received
//! on the same bus, with a software "wire" (a `Vec<u8>`) standing in for
//! the UART.
//!
//! Grounded on the teacher's `no_transport.rs`: same shape (one context,
//! one synthetic loopback UART, one frame sent then fed straight back
//! in), reworked for PRLSC's `Bus`/`Callbacks` surface and its drain-tx /
//! feed-rx poll loop instead of a single `send_frame`/`poll` call pair.

use prlsc::{Bus, Callbacks, Config, Datagram, ServiceConfig};

struct LoopbackUart {
    tick: u16,
    wire: Vec<u8>,
}

impl Callbacks for LoopbackUart {
    fn now(&self) -> u16 {
        self.tick
    }

    fn checksum(&self, data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, &b| acc ^ b)
    }

    fn send_byte(&mut self, byte: u8) {
        print!("0x{:02x} ", byte);
        self.wire.push(byte);
    }

    fn received_datagram(&mut self, datagram: &Datagram<'_>) {
        print!("The data received: [ ");
        for byte in datagram.data {
            print!("0x{:02x} ", byte);
        }
        println!("]");
    }
}

fn main() {
    env_logger::init();

    let config = Config::new(64, 256, &[ServiceConfig::diagnostics(0)]).expect("valid config");
    let mut bus: Bus<257, 512> = Bus::new(config);
    let mut uart = LoopbackUart {
        tick: 0,
        wire: Vec::new(),
    };

    let payload: [u8; 8] = [0xaa, 0xaa, 0xaa, 0, 0, 0, 0, 1];
    print!("The data to be sent: [");
    for item in payload {
        print!(" 0x{:x}", item);
    }
    println!(" ]");

    let enqueued = bus.transmit_datagram(&uart, 0, 0, &payload);
    assert!(enqueued > 0, "datagram did not fit in the tx buffer");

    print!("PRLSC frame: ");
    loop {
        let result = bus.prepare_service_transmission(&uart);
        if !result.ready {
            break;
        }
        while bus.tx_byte(&mut uart) {}
    }
    println!();

    let wire = std::mem::take(&mut uart.wire);
    for byte in wire {
        bus.receive_byte(&mut uart, byte);
    }

    if bus.error_code() != prlsc::ErrorCode::None {
        println!("error: {}", bus.error_code());
    }
}
