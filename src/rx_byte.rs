//! RX byte state machine (§4.D): de-escapes one raw byte at a time,
//! detects frame boundaries, and delivers completed frames.
//!
//! Grounded closely on the teacher's `rx_byte` (`context.rs`): the
//! "regardless of state, the sync sequence resets everything" shape is the
//! same, re-targeted from MIN's triple-header-byte framing to PRLSC's
//! single start byte plus a 2-byte escape pair.

use crate::callbacks::Callbacks;
use crate::config::Config;
use crate::error::ErrorCode;
use crate::frame::{unpack_service_code, Frame};

/// Largest frame buffer PRLSC ever needs: `frameLengthMax` is bounded by
/// the protocol itself (one wire byte, §3), not a deployment choice, so
/// this is a plain constant rather than a const generic (see DESIGN.md).
pub const MAX_FRAME_BUF: usize = 255 + 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFsmState {
    WaitStart,
    Collecting,
    Esc,
}

/// Mutable state for the RX byte state machine (§3).
pub struct RxFrameState {
    pub fsm_state: FrameFsmState,
    pub cur_idx: usize,
    pub expected_byte_count: usize,
    pub buffer: [u8; MAX_FRAME_BUF],
    /// Rolling 8-bit count of frames successfully checksum-verified.
    pub frames_received: u8,
}

impl RxFrameState {
    pub const fn new() -> Self {
        RxFrameState {
            fsm_state: FrameFsmState::WaitStart,
            cur_idx: 0,
            expected_byte_count: 0,
            buffer: [0u8; MAX_FRAME_BUF],
            frames_received: 0,
        }
    }
}

impl Default for RxFrameState {
    fn default() -> Self {
        Self::new()
    }
}

/// Store `byte` as decoded frame content at `state.cur_idx`, applying the
/// curIdx==1/curIdx==2 bounds checks (§4.D), then advance. Returns `false`
/// if the frame was dropped (service index or length out of bounds).
fn store_byte(cfg: &Config, state: &mut RxFrameState, byte: u8) -> bool {
    state.buffer[state.cur_idx] = byte;
    if state.cur_idx == 1 {
        let (service_index, _) = unpack_service_code(byte);
        if !cfg.service_in_range(service_index) {
            return false;
        }
    } else if state.cur_idx == 2 {
        if byte <= cfg.frame_length_max {
            state.expected_byte_count = byte as usize + 4;
        } else {
            return false;
        }
    }
    state.cur_idx += 1;
    true
}

fn reset_for_start_byte(state: &mut RxFrameState, cfg: &Config, start_byte: u8) {
    state.cur_idx = 0;
    state.expected_byte_count = cfg.frame_length_max as usize + 4;
    state.fsm_state = FrameFsmState::Collecting;
    state.buffer[0] = start_byte;
    state.cur_idx = 1;
}

/// Feed one raw byte into the RX byte state machine (§4.D). Returns the
/// completed, checksum-verified frame if `byte` was the last byte of one,
/// borrowing from `state`'s internal buffer.
pub fn receive_byte<'a, C: Callbacks>(
    cfg: &Config,
    state: &'a mut RxFrameState,
    callbacks: &C,
    error: &mut ErrorCode,
    byte: u8,
) -> Option<Frame<'a>> {
    // Rule 1: a start byte always resynchronises, regardless of state.
    if byte == cfg.start_frame {
        reset_for_start_byte(state, cfg, byte);
        return None;
    }

    match state.fsm_state {
        FrameFsmState::WaitStart => {
            // Rule 4: silently discarded.
        }
        FrameFsmState::Collecting => {
            if byte == cfg.esc {
                state.fsm_state = FrameFsmState::Esc;
            } else if !store_byte(cfg, state, byte) {
                *error = if state.cur_idx == 1 {
                    ErrorCode::RxFrameServiceIndexBounds
                } else {
                    ErrorCode::RxFrameTooLong
                };
                state.fsm_state = FrameFsmState::WaitStart;
                return None;
            }
        }
        FrameFsmState::Esc => {
            let literal = if byte == cfg.esc_esc {
                Some(cfg.esc)
            } else if byte == cfg.esc_start {
                Some(cfg.start_frame)
            } else {
                None
            };
            match literal {
                Some(literal_byte) => {
                    state.fsm_state = FrameFsmState::Collecting;
                    if !store_byte(cfg, state, literal_byte) {
                        *error = if state.cur_idx == 1 {
                            ErrorCode::RxFrameServiceIndexBounds
                        } else {
                            ErrorCode::RxFrameTooLong
                        };
                        state.fsm_state = FrameFsmState::WaitStart;
                        return None;
                    }
                }
                None => {
                    *error = ErrorCode::RxFrameBadEsc;
                    state.fsm_state = FrameFsmState::WaitStart;
                    return None;
                }
            }
        }
    }

    if state.fsm_state == FrameFsmState::Collecting && state.cur_idx == state.expected_byte_count {
        let length = state.buffer[2] as usize;
        let computed = crate::checksum::frame_checksum(callbacks, &state.buffer, length);
        let received = state.buffer[3 + length];
        state.fsm_state = FrameFsmState::WaitStart;
        if computed != received {
            *error = ErrorCode::RxFrameBadChecksum;
            return None;
        }
        state.frames_received = state.frames_received.wrapping_add(1);
        let (service_index, sub_service_index) = unpack_service_code(state.buffer[1]);
        return Some(Frame {
            service_index,
            sub_service_index,
            length: length as u8,
            data: &state.buffer[3..3 + length],
            checksum: received,
        });
    }
    None
}
