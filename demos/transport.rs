//! Two independent buses on two threads, connected by `std::sync::mpsc`
//! channels standing in for a physical serial line.
//!
//! Grounded on the teacher's `transport.rs`: same two-thread,
//! channel-as-wire shape and `log` target-per-uart conventions, reworked
//! from MIN's single service + transport/ACK layer to PRLSC's
//! multi-service `Bus`, whose poll loop drains tx (fragment + arbitrate +
//! emit) before draining whatever arrived on the channel (§11 — the
//! "drain tx then drive rx" loop shape carried over from the original
//! even though the ACK semantics it existed for did not).

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use std::time::Duration;

use log::{debug, info, trace, LevelFilter};

use prlsc::{Bus, Callbacks, Config, Datagram, ServiceConfig};

struct ChannelUart {
    name: String,
    tick: u16,
    sender: Sender<u8>,
}

impl Callbacks for ChannelUart {
    fn now(&self) -> u16 {
        self.tick
    }

    fn checksum(&self, data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, &b| acc ^ b)
    }

    fn send_byte(&mut self, byte: u8) {
        trace!(target: self.name.as_str(), "tx 0x{:02x}", byte);
        if let Err(e) = self.sender.send(byte) {
            debug!(target: self.name.as_str(), "{}", e);
        }
    }

    fn received_datagram(&mut self, datagram: &Datagram<'_>) {
        let mut output = String::from("receive data: [ ");
        for byte in datagram.data {
            output.push_str(&format!("0x{:02x} ", byte));
        }
        output.push(']');
        info!(target: self.name.as_str(), "{}", output);
    }
}

fn run_endpoint(name: &'static str, sender: Sender<u8>, receiver: Receiver<u8>, payload: [u8; 8]) {
    let config = Config::new(64, 256, &[ServiceConfig::diagnostics(0)]).expect("valid config");
    let mut bus: Bus<257, 512> = Bus::new(config);
    let mut uart = ChannelUart {
        name: String::from(name),
        tick: 0,
        sender,
    };

    debug!(target: uart.name.as_str(), "{}: open uart", uart.name);

    bus.transmit_datagram(&uart, 0, 0, &payload);
    bus.transmit_datagram(&uart, 0, 0, &payload);

    loop {
        loop {
            let result = bus.prepare_service_transmission(&uart);
            if !result.ready {
                break;
            }
            while bus.tx_byte(&mut uart) {}
        }
        for byte in receiver.try_iter() {
            bus.receive_byte(&mut uart, byte);
        }
        uart.tick = uart.tick.wrapping_add(1);
        thread::sleep(Duration::from_millis(100));
    }
}

fn main() {
    let tx_data1: [u8; 8] = [0xaa, 0xaa, 0xaa, 0, 0, 0, 0, 1];
    let tx_data2: [u8; 8] = [0xbb, 0xbb, 0xbb, 0, 0, 0, 0, 1];
    let (tx1, rx2) = channel();
    let (tx2, rx1) = channel();

    log::set_max_level(LevelFilter::Debug);
    env_logger::init();
    info!("hello");

    let app1 = thread::Builder::new()
        .name("app1".into())
        .spawn(move || run_endpoint("uart1", tx1, rx1, tx_data1))
        .unwrap();
    let app2 = thread::Builder::new()
        .name("app2".into())
        .spawn(move || run_endpoint("uart2", tx2, rx2, tx_data2))
        .unwrap();

    thread::sleep(Duration::from_secs(2));
    drop(app1);
    drop(app2);
}
