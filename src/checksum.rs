//! Checksum byte-range helpers (§4.C) plus a couple of example `checksum`
//! implementations embedders can wire into [`crate::Callbacks::checksum`].
//!
//! The protocol mandates only the byte ranges covered, not an algorithm:
//! the frame checksum covers `serviceCode || length || data` (excluding the
//! start byte and the checksum byte itself); the datagram checksum (
//! diagnostics only) covers the reassembled payload. Both are invoked
//! through the single [`crate::Callbacks::checksum`] callback.

use crate::callbacks::Callbacks;

/// Frame checksum: `callbacks.checksum(&frame_buffer[1..3 + data_len])`,
/// i.e. service code byte, length byte, then `data_len` data bytes.
pub fn frame_checksum<C: Callbacks>(callbacks: &C, frame_buffer: &[u8], data_len: usize) -> u8 {
    callbacks.checksum(&frame_buffer[1..3 + data_len])
}

/// Datagram checksum: `callbacks.checksum(&data[0..length])`.
pub fn datagram_checksum<C: Callbacks>(callbacks: &C, data: &[u8]) -> u8 {
    callbacks.checksum(data)
}

/// XOR of every covered byte. Used by this spec's own worked examples
/// (§8): trivial, but a legitimate choice when the link already has
/// stronger lower-layer error detection.
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, &b| acc ^ b)
}

const CRC8_POLY: u8 = 0x07; // CRC-8/SMBus-ish polynomial, normal (non-reflected) form

/// Bit-by-bit CRC-8 shift register, seeded at `0xFF`. Same structure as the
/// teacher's `Crc32Context::step_reversed` (`crc.rs`/`crc32.rs`) narrowed
/// from a 32-bit running CRC to the one-shot 8-bit contract §4.C specifies.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc: u8 = 0xff;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            if crc & 0x80 != 0 {
                crc = (crc << 1) ^ CRC8_POLY;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
