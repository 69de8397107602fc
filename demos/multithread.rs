//! Two independent buses, each driven on its own thread, joined by one
//! channel standing in for the wire. Unlike `transport.rs`'s
//! long-running endpoints, both threads here send/receive once and exit.
//!
//! Grounded on the teacher's `multithread.rs`: same two-thread,
//! one-shot-transfer shape, reworked for `Bus`/`Callbacks`.

use std::sync::mpsc::{channel, Sender};
use std::thread;

use log::LevelFilter;

use prlsc::{Bus, Callbacks, Config, Datagram, ServiceConfig};

struct Uart {
    name: String,
    sender: Sender<u8>,
}

impl Callbacks for Uart {
    fn now(&self) -> u16 {
        0
    }

    fn checksum(&self, data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, &b| acc ^ b)
    }

    fn send_byte(&mut self, byte: u8) {
        print!("0x{:02x} ", byte);
        if let Err(e) = self.sender.send(byte) {
            println!("{}: {}", self.name, e);
        }
    }

    fn received_datagram(&mut self, _datagram: &Datagram<'_>) {
        // this side only transmits; see `uart2`'s handler below.
    }
}

fn main() {
    log::set_max_level(LevelFilter::Trace);
    env_logger::init();

    let tx_data: [u8; 8] = [0xaa, 0xaa, 0xaa, 0, 0, 0, 0, 1];
    let (tx1, rx1) = channel();

    let app1 = thread::Builder::new()
        .name("app1".into())
        .spawn(move || {
            println!("uart1: open uart.");
            let config = Config::new(64, 256, &[ServiceConfig::diagnostics(0)]).expect("valid config");
            let mut bus: Bus<257, 512> = Bus::new(config);
            let mut uart1 = Uart {
                name: String::from("uart1"),
                sender: tx1,
            };

            print!("The data to be sent: [");
            for item in tx_data {
                print!(" 0x{:x}", item);
            }
            println!(" ]");

            let enqueued = bus.transmit_datagram(&uart1, 0, 0, &tx_data);
            assert!(enqueued > 0);

            print!("uart1 send frame: [ ");
            loop {
                let result = bus.prepare_service_transmission(&uart1);
                if !result.ready {
                    break;
                }
                while bus.tx_byte(&mut uart1) {}
            }
            println!("]");

            println!("uart1: close uart.");
        })
        .unwrap();

    let app2 = thread::Builder::new()
        .name("app2".into())
        .spawn(move || {
            println!("uart2: open uart.");
            let config = Config::new(64, 256, &[ServiceConfig::diagnostics(0)]).expect("valid config");
            let mut bus: Bus<257, 512> = Bus::new(config);

            let mut received: Vec<Vec<u8>> = Vec::new();

            struct RecvUart<'a> {
                received: &'a mut Vec<Vec<u8>>,
            }
            impl<'a> Callbacks for RecvUart<'a> {
                fn now(&self) -> u16 {
                    0
                }
                fn checksum(&self, data: &[u8]) -> u8 {
                    data.iter().fold(0u8, |acc, &b| acc ^ b)
                }
                fn send_byte(&mut self, _byte: u8) {}
                fn received_datagram(&mut self, datagram: &Datagram<'_>) {
                    self.received.push(datagram.data.to_vec());
                }
            }
            let mut uart2 = RecvUart {
                received: &mut received,
            };

            for byte in rx1.iter() {
                bus.receive_byte(&mut uart2, byte);
            }

            if let Some(msg) = uart2.received.first() {
                print!("app2 receive data: [ ");
                for byte in msg {
                    print!("0x{:02x} ", byte);
                }
                println!("]");
            } else {
                println!("No msg!");
            }

            println!("uart2: close uart.");
        })
        .unwrap();

    app1.join().unwrap();
    app2.join().unwrap();
}
