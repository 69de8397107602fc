//! RX datagram reassembler (§4.E): one instance per service, appending
//! frame payloads into a datagram buffer, detecting end-of-datagram, and
//! delivering completed (and, for diagnostics, checksum-verified)
//! datagrams to the application callback.
//!
//! Grounded on the teacher's `valid_frame_received`/`msg_enqueue`
//! (`context.rs`), stripped of the ACK/RESET/sequence-number transport
//! layer (an explicit Non-goal here, §1) and generalized from "one frame
//! is one message" to "N frames reassemble into one datagram, terminated
//! by a short frame" — MIN never needed that because it doesn't fragment.

use crate::callbacks::Callbacks;
use crate::checksum::datagram_checksum;
use crate::config::{Config, ServiceConfig};
use crate::error::ErrorCode;
use crate::frame::{Datagram, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatagramFsmState {
    Populating,
    Error,
}

/// Per-service reassembly state (§3). `N` must be at least
/// `datagram_length_max + 1` for diagnostics services (the `+1` holds the
/// trailing checksum byte) or `frame_length_max` for stream services.
pub struct RxDatagramState<const N: usize> {
    pub fsm_state: DatagramFsmState,
    pub cur_idx: usize,
    pub buffer: [u8; N],
}

impl<const N: usize> RxDatagramState<N> {
    pub const fn new() -> Self {
        RxDatagramState {
            fsm_state: DatagramFsmState::Populating,
            cur_idx: 0,
            buffer: [0u8; N],
        }
    }
}

impl<const N: usize> Default for RxDatagramState<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn is_terminator(cfg: &Config, svc_cfg: &ServiceConfig, frame: &Frame<'_>) -> bool {
    svc_cfg.is_stream || frame.length < cfg.frame_length_max
}

/// Feed one reassembled frame into a service's datagram reassembler
/// (§4.E). Invokes `callbacks.received_datagram` synchronously on success.
pub fn receive_frame<C: Callbacks, const N: usize>(
    cfg: &Config,
    svc_cfg: &ServiceConfig,
    state: &mut RxDatagramState<N>,
    frame: &Frame<'_>,
    callbacks: &mut C,
    error: &mut ErrorCode,
) {
    if state.fsm_state == DatagramFsmState::Error {
        if is_terminator(cfg, svc_cfg, frame) {
            state.fsm_state = DatagramFsmState::Populating;
        }
        return;
    }

    // Diagnostics datagrams carry a trailing checksum byte that is folded
    // into `cur_idx` during reassembly (it arrives as ordinary frame data,
    // §4.E), so the fill bound must leave room for it on top of
    // `datagram_length_max`; streams never append one.
    let max_fill = cfg.datagram_length_max as u32 + if svc_cfg.is_stream { 0 } else { 1 };
    let would_be = state.cur_idx as u32 + frame.length as u32;
    if would_be > max_fill {
        state.cur_idx = 0;
        *error = ErrorCode::DatagramTooLong;
        if frame.length == cfg.frame_length_max && !svc_cfg.is_stream {
            state.fsm_state = DatagramFsmState::Error;
        }
        return;
    }

    let start = state.cur_idx;
    state.buffer[start..start + frame.length as usize].copy_from_slice(frame.data);
    state.cur_idx += frame.length as usize;

    if !is_terminator(cfg, svc_cfg, frame) {
        return;
    }

    let (length, checksum) = if svc_cfg.is_stream || state.cur_idx == 0 {
        (state.cur_idx, 0u8)
    } else {
        (state.cur_idx - 1, state.buffer[state.cur_idx - 1])
    };

    if !svc_cfg.is_stream {
        let computed = datagram_checksum(callbacks, &state.buffer[..length]);
        if computed != checksum {
            *error = ErrorCode::DatagramBadChecksum;
            state.cur_idx = 0;
            return;
        }
    }

    let datagram = Datagram {
        service_index: frame.service_index,
        sub_service_index: frame.sub_service_index,
        length: length as u16,
        data: &state.buffer[..length],
        checksum,
    };
    callbacks.received_datagram(&datagram);
    state.cur_idx = 0;
}
