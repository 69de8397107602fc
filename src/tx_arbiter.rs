//! TX arbiter + byte state machine (§4.G): picks which service's buffered
//! frame goes on the wire next, then emits it one escaped byte per call.
//!
//! Grounded on the teacher's `transport_fifo_frame_send` selection loop
//! (`context.rs`) — "scan candidates in priority order, load the winner
//! into a send slot" is the same shape — rewritten from "oldest
//! unacknowledged frame, single FIFO" (teacher has one queue; retransmission
//! is out of scope here, §1) to "lowest service index that isn't
//! rate-limited, remembering the nearest rate-limit expiry for the rest".
//! The byte-emission half is grounded on teacher's `stuffed_tx_byte`,
//! generalized from MIN's "count 2 header bytes, insert a stuff byte" rule
//! to PRLSC's "escape exactly `startFrame`/`esc` with a 2-byte sequence".

use crate::callbacks::Callbacks;
use crate::config::{Config, MAX_SERVICES};
use crate::error::ErrorCode;
use crate::ring::TxRing;
use crate::rx_byte::MAX_FRAME_BUF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxFsmState {
    Idle,
    Start,
    Normal,
    Escaped,
}

/// Mutable state for the TX byte state machine (§3): one staging slot
/// shared by every service, loaded by [`prepare_service_transmission`] and
/// drained byte-by-byte by [`tx_byte`].
pub struct TxByteState {
    pub fsm_state: TxFsmState,
    pub staging_buffer: [u8; MAX_FRAME_BUF],
    pub staging_length: usize,
    pub staging_service_index: u8,
    pub cursor: usize,
}

impl TxByteState {
    pub const fn new() -> Self {
        TxByteState {
            fsm_state: TxFsmState::Idle,
            staging_buffer: [0u8; MAX_FRAME_BUF],
            staging_length: 0,
            staging_service_index: 0,
            cursor: 0,
        }
    }
}

impl Default for TxByteState {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a selection scan (§4.G). When `ready` is `false`,
/// `service_index` names the service whose rate limit lifts soonest
/// (`time_to_limit_lifted` ticks from now), so the caller knows the
/// minimum sleep that could unblock something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareResult {
    pub ready: bool,
    pub service_index: u8,
    pub time_to_limit_lifted: u16,
}

/// Scan services in ascending index order (highest priority first) for one
/// whose circular buffer is non-empty and not currently rate-limited; if
/// found, stage its next raw frame for [`tx_byte`] and consume it from the
/// ring. Never sets `error` — both "nothing buffered" and "everything
/// rate-limited" are ordinary, expected outcomes.
pub fn prepare_service_transmission<C: Callbacks, const TX_BUF: usize>(
    cfg: &Config,
    tx_rings: &mut [TxRing<TX_BUF>; MAX_SERVICES],
    tx_byte_state: &mut TxByteState,
    last_transmitted: &[u16; MAX_SERVICES],
    callbacks: &C,
) -> PrepareResult {
    let now = callbacks.now();
    let count = cfg.service_count as usize;
    let mut selected: Option<usize> = None;
    let mut time_to_limit_lifted: u16 = 0;
    let mut limited_service_index: u8 = 0;

    for i in 0..count {
        if tx_rings[i].is_empty() {
            continue;
        }
        let rate_limit = cfg.services[i].rate_limit;
        if rate_limit == 0 {
            selected = Some(i);
            break;
        }
        let elapsed = crate::time::diff(last_transmitted[i], now);
        if elapsed >= rate_limit {
            selected = Some(i);
            break;
        }
        let remaining = rate_limit - elapsed;
        if time_to_limit_lifted == 0 || remaining < time_to_limit_lifted {
            time_to_limit_lifted = remaining;
            limited_service_index = i as u8;
        }
    }

    let Some(i) = selected else {
        return PrepareResult {
            ready: false,
            service_index: limited_service_index,
            time_to_limit_lifted,
        };
    };

    let length = tx_rings[i].pop_frame_into(&mut tx_byte_state.staging_buffer);
    tx_byte_state.staging_length = length;
    tx_byte_state.staging_service_index = i as u8;
    tx_byte_state.cursor = 0;
    tx_byte_state.fsm_state = TxFsmState::Start;

    PrepareResult {
        ready: true,
        service_index: i as u8,
        time_to_limit_lifted: 0,
    }
}

/// Emit one escaped byte of the staged frame (§4.G). Returns `true` if
/// there's more of this frame to send (call again), `false` once the frame
/// is fully sent (or there was nothing staged).
pub fn tx_byte<C: Callbacks>(
    cfg: &Config,
    tx_byte_state: &mut TxByteState,
    last_transmitted: &mut [u16; MAX_SERVICES],
    callbacks: &mut C,
    error: &mut ErrorCode,
) -> bool {
    match tx_byte_state.fsm_state {
        TxFsmState::Idle => false,
        TxFsmState::Start => {
            callbacks.send_byte(tx_byte_state.staging_buffer[0]);
            last_transmitted[tx_byte_state.staging_service_index as usize] = callbacks.now();
            tx_byte_state.cursor += 1;
            tx_byte_state.fsm_state = TxFsmState::Normal;
            true
        }
        TxFsmState::Normal => {
            let byte = tx_byte_state.staging_buffer[tx_byte_state.cursor];
            if byte == cfg.start_frame || byte == cfg.esc {
                callbacks.send_byte(cfg.esc);
                tx_byte_state.fsm_state = TxFsmState::Escaped;
                true
            } else {
                callbacks.send_byte(byte);
                tx_byte_state.cursor += 1;
                if tx_byte_state.cursor == tx_byte_state.staging_length {
                    tx_byte_state.fsm_state = TxFsmState::Idle;
                    false
                } else {
                    true
                }
            }
        }
        TxFsmState::Escaped => {
            let byte = tx_byte_state.staging_buffer[tx_byte_state.cursor];
            if byte == cfg.start_frame {
                callbacks.send_byte(cfg.esc_start);
            } else if byte == cfg.esc {
                callbacks.send_byte(cfg.esc_esc);
            } else {
                *error = ErrorCode::TxFrameBadEsc;
                callbacks.send_byte(byte);
            }
            tx_byte_state.cursor += 1;
            if tx_byte_state.cursor == tx_byte_state.staging_length {
                tx_byte_state.fsm_state = TxFsmState::Idle;
                false
            } else {
                tx_byte_state.fsm_state = TxFsmState::Normal;
                true
            }
        }
    }
}
