//! # PRLSC
//!
//! PRLSC ("Prioritised Rate-Limited Serial Communications") is an embedded
//! link-layer protocol that multiplexes several logical services over a
//! single byte-oriented serial line. Each service is either a STREAM
//! (small fixed-size payloads, no payload checksum, optionally keeping
//! only the latest buffered message) or DIAGNOSTICS (arbitrarily long
//! payloads, fragmented into frames, with an application-level checksum).
//! Services are statically ranked by priority (lower index = higher
//! priority) and may be rate-limited in the time domain.
//!
//! This crate is the core state machine only: byte-level framing with
//! escape encoding, frame-to-datagram reassembly per service,
//! datagram-to-frame fragmentation, a per-service circular transmit
//! buffer, and the priority/rate-limit arbiter that decides which
//! service's next frame goes on the wire. It owns no threads, timers, or
//! buffers beyond what [`Bus`] is parameterized with; the embedding
//! environment supplies a [`Callbacks`] implementation for the UART, the
//! time source, the checksum algorithm, and the application datagram
//! handler, and drives [`Bus`]'s entry points from its own poll loop or
//! interrupt handlers.
//!
//! Retransmission, acknowledgements, connection establishment, encryption
//! and dynamic service registration are explicitly out of scope; wire
//! compatibility with the reference byte encoding is a goal.
//!
//! ## Example
//! ```
//! use prlsc::{Bus, Callbacks, Config, Datagram, ServiceConfig};
//!
//! struct Loopback {
//!     now: u16,
//!     wire: Vec<u8>,
//! }
//!
//! impl Callbacks for Loopback {
//!     fn now(&self) -> u16 {
//!         self.now
//!     }
//!     fn checksum(&self, data: &[u8]) -> u8 {
//!         data.iter().fold(0u8, |acc, &b| acc ^ b)
//!     }
//!     fn send_byte(&mut self, byte: u8) {
//!         self.wire.push(byte);
//!     }
//!     fn received_datagram(&mut self, datagram: &Datagram<'_>) {
//!         println!("received {} bytes on service {}", datagram.length, datagram.service_index);
//!     }
//! }
//!
//! let config = Config::new(64, 256, &[ServiceConfig::diagnostics(0)]).unwrap();
//! let mut bus: Bus<257, 512> = Bus::new(config);
//! let mut io = Loopback { now: 0, wire: Vec::new() };
//!
//! bus.transmit_datagram(&io, 0, 0, b"hello");
//! while bus.prepare_service_transmission(&io).ready {
//!     while bus.tx_byte(&mut io) {}
//! }
//! ```

pub mod bus;
pub mod callbacks;
pub mod checksum;
pub mod config;
pub mod error;
pub mod frame;
pub mod ring;
pub mod rx_byte;
pub mod rx_datagram;
pub mod state;
pub mod time;
pub mod tx_arbiter;
pub mod tx_fragment;

pub use bus::Bus;
pub use callbacks::Callbacks;
pub use config::{Config, ConfigError, ServiceConfig, MAX_SERVICES, MAX_SUB_SERVICE};
pub use error::ErrorCode;
pub use frame::{Datagram, Frame};
pub use state::BusState;
pub use tx_arbiter::PrepareResult;
