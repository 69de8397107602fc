use core::fmt;

/// Sticky, last-one-wins error code recorded on a [`crate::Bus`] (§7).
///
/// Every public entry point may overwrite this; it is never a queue. The
/// affected frame or datagram is always dropped when one of these is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// No error has occurred since the bus was created or last cleared.
    None,
    /// Invalid byte followed `esc` on receive.
    RxFrameBadEsc,
    /// Decoded service code is `>= serviceCount`.
    RxFrameServiceIndexBounds,
    /// Declared frame length exceeds `frameLengthMax`.
    RxFrameTooLong,
    /// Frame checksum did not match the received checksum byte.
    RxFrameBadChecksum,
    /// Diagnostics datagram checksum did not match.
    DatagramBadChecksum,
    /// Payload exceeds `datagramLengthMax`, or a stream payload needed more
    /// than one frame.
    DatagramTooLong,
    /// `transmitDatagram` was called with a service index `>= serviceCount`.
    DatagramServiceIndexBounds,
    /// Staging buffer held a byte requiring escape that wasn't `startFrame`
    /// or `esc` (should be unreachable; see §9).
    TxFrameBadEsc,
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::None
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ErrorCode::None => "no error",
            ErrorCode::RxFrameBadEsc => "invalid byte following escape byte on receive",
            ErrorCode::RxFrameServiceIndexBounds => "received service index out of bounds",
            ErrorCode::RxFrameTooLong => "received frame length exceeds frameLengthMax",
            ErrorCode::RxFrameBadChecksum => "received frame checksum mismatch",
            ErrorCode::DatagramBadChecksum => "received datagram checksum mismatch",
            ErrorCode::DatagramTooLong => "datagram payload exceeds datagramLengthMax",
            ErrorCode::DatagramServiceIndexBounds => "service index out of bounds on transmit",
            ErrorCode::TxFrameBadEsc => "staging buffer held an unescapable byte mid-escape",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ErrorCode {}
