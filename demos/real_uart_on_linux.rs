//! Real UART demo: one bus driven against an actual serial port via the
//! `serial` crate, polling for incoming bytes and draining the transmit
//! side in the same loop.
//!
//! Grounded on the teacher's `real_uart_on_linux.rs`: same port-open,
//! `RefCell<SystemPort>`, tx/rx poll-loop shape, reworked for
//! `Bus`/`Callbacks`; the monotonic tick comes from `Instant::elapsed`
//! truncated to `u16` milliseconds since PRLSC has no wall-clock callback
//! of its own (§6 — the embedder supplies time, any monotonic source is
//! legal).

use std::cell::RefCell;
use std::io::prelude::*;
use std::time::{Duration, Instant};

use log::{debug, trace, LevelFilter};
use serial::prelude::*;
use serial::SystemPort;

use prlsc::{Bus, Callbacks, Config, Datagram, ServiceConfig};

const SERIAL_PORT: &str = "/dev/ttyS5";
const BAUD_RATE: serial::BaudRate = serial::Baud115200;

struct Uart {
    port: RefCell<SystemPort>,
    name: String,
    started: Instant,
}

impl Uart {
    fn new(port: SystemPort, name: String) -> Self {
        Uart {
            port: RefCell::new(port),
            name,
            started: Instant::now(),
        }
    }

    fn open(&self) {
        const SETTINGS: serial::PortSettings = serial::PortSettings {
            baud_rate: BAUD_RATE,
            char_size: serial::Bits8,
            parity: serial::ParityNone,
            stop_bits: serial::Stop1,
            flow_control: serial::FlowNone,
        };
        let mut port = self.port.borrow_mut();
        port.configure(&SETTINGS).unwrap();
        port.set_timeout(Duration::from_millis(1000)).unwrap();
        debug!(target: self.name.as_str(), "{}: open uart", self.name);
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, ()> {
        let mut port = self.port.borrow_mut();
        match port.read(buf) {
            Ok(n) => Ok(n),
            _ => Err(()),
        }
    }
}

impl Callbacks for Uart {
    fn now(&self) -> u16 {
        self.started.elapsed().as_millis() as u16
    }

    fn checksum(&self, data: &[u8]) -> u8 {
        data.iter().fold(0u8, |acc, &b| acc ^ b)
    }

    fn send_byte(&mut self, byte: u8) {
        trace!(target: self.name.as_str(), "tx 0x{:02x}", byte);
        let mut port = self.port.borrow_mut();
        if let Err(e) = port.write(&[byte]) {
            debug!(target: self.name.as_str(), "{}", e);
        }
    }

    fn received_datagram(&mut self, datagram: &Datagram<'_>) {
        if let Ok(string) = String::from_utf8(datagram.data.to_vec()) {
            println!("get msg: {}", string);
        } else {
            print!("get data: [ ");
            for byte in datagram.data {
                print!("0x{:02x} ", byte);
            }
            println!("]");
        }
    }
}

fn main() {
    log::set_max_level(LevelFilter::Debug);
    env_logger::init();

    let port = serial::open(SERIAL_PORT).unwrap();
    let mut uart = Uart::new(port, String::from("uart"));
    uart.open();

    let config = Config::new(64, 256, &[ServiceConfig::diagnostics(0)]).expect("valid config");
    let mut bus: Bus<257, 512> = Bus::new(config);

    bus.transmit_datagram(&uart, 0, 0, b"123");

    let mut buf = vec![0u8; 255];
    loop {
        loop {
            let result = bus.prepare_service_transmission(&uart);
            if !result.ready {
                break;
            }
            while bus.tx_byte(&mut uart) {}
        }
        if let Ok(n) = uart.read(&mut buf) {
            for &byte in &buf[..n] {
                bus.receive_byte(&mut uart, byte);
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }
}
