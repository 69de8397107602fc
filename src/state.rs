//! `BusState`: every piece of mutable per-bus state, gathered into one
//! struct the embedder owns and the core borrows for the duration of a
//! call (§3, §5 "no process-wide singletons").
//!
//! Grounded on the teacher's `Context` (`context.rs`): one struct holding
//! every mutable field a port needs, generalized from a single service's
//! worth of fields to `[_; MAX_SERVICES]` arrays of per-service sub-state,
//! since teacher's `Context` is one port per instance and PRLSC multiplexes
//! up to [`MAX_SERVICES`] through a single bus.

use crate::config::MAX_SERVICES;
use crate::error::ErrorCode;
use crate::ring::TxRing;
use crate::rx_byte::RxFrameState;
use crate::rx_datagram::RxDatagramState;
use crate::tx_arbiter::TxByteState;

/// All mutable state for one bus. `DATAGRAM_BUF` is the per-service RX
/// reassembly buffer capacity (must be at least `datagram_length_max + 1`
/// for diagnostics services, the `+1` holding the trailing checksum byte);
/// `TX_BUF` is the per-service TX circular buffer capacity. Both are
/// applied uniformly across every configured service (see DESIGN.md —
/// Open Question decisions).
pub struct BusState<const DATAGRAM_BUF: usize, const TX_BUF: usize> {
    pub error_code: ErrorCode,
    pub rx_frame: RxFrameState,
    pub rx_datagram: [RxDatagramState<DATAGRAM_BUF>; MAX_SERVICES],
    pub tx_rings: [TxRing<TX_BUF>; MAX_SERVICES],
    pub tx_byte: TxByteState,
    pub last_transmitted: [u16; MAX_SERVICES],
    pub new_tx_data_flag: bool,
}

impl<const DATAGRAM_BUF: usize, const TX_BUF: usize> BusState<DATAGRAM_BUF, TX_BUF> {
    pub fn new() -> Self {
        BusState {
            error_code: ErrorCode::None,
            rx_frame: RxFrameState::new(),
            rx_datagram: core::array::from_fn(|_| RxDatagramState::new()),
            tx_rings: core::array::from_fn(|_| TxRing::new()),
            tx_byte: TxByteState::new(),
            last_transmitted: [0u16; MAX_SERVICES],
            new_tx_data_flag: false,
        }
    }
}

impl<const DATAGRAM_BUF: usize, const TX_BUF: usize> Default for BusState<DATAGRAM_BUF, TX_BUF> {
    fn default() -> Self {
        Self::new()
    }
}
