use crate::frame::Datagram;

/// The four external collaborators PRLSC's core delegates to (§1, §6):
/// a time source, a checksum algorithm, a byte sink, and an application
/// datagram handler.
///
/// Grounded on the teacher's `Interface` trait (`tx_space`/`tx_start`/
/// `tx_finished`/`tx_byte`), generalized to the full callback set this
/// protocol needs and widened to `&mut self` for the two callbacks that
/// naturally mutate embedder state (sending a byte, consuming a datagram).
pub trait Callbacks {
    /// Current monotonic tick count. Free to wrap; see [`crate::time::diff`].
    fn now(&self) -> u16;

    /// Checksum over an arbitrary byte range. No algorithm is mandated by
    /// the protocol (§4.C) — only that both ends of the link agree.
    fn checksum(&self, data: &[u8]) -> u8;

    /// Commit one byte to the wire. Must not block indefinitely.
    fn send_byte(&mut self, byte: u8);

    /// A complete, checksum-verified datagram has been reassembled.
    /// `datagram.data` aliases core-owned storage valid only for the
    /// duration of this call.
    fn received_datagram(&mut self, datagram: &Datagram<'_>);
}
