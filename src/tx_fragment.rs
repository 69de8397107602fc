//! TX fragmenter (§4.F): converts a datagram into one or more raw,
//! unencoded frames and appends them to a service's circular transmit
//! buffer.
//!
//! Grounded on the frame-construction half of the teacher's
//! `on_wire_bytes`/`stuffed_tx_byte` (`context.rs`) — header write, checksum
//! compute, byte order — restructured from "emit directly to the wire" to
//! "build into a scratch slot, then copy into a per-service ring", since
//! teacher sends synchronously while PRLSC buffers until the arbiter (§4.G)
//! picks a frame.

use crate::callbacks::Callbacks;
use crate::checksum::frame_checksum;
use crate::config::{Config, ServiceConfig};
use crate::error::ErrorCode;
use crate::frame::pack_service_code;
use crate::ring::TxRing;
use crate::rx_byte::MAX_FRAME_BUF;

/// Number of raw frames a datagram will take plus the total buffered bytes
/// they'll need (§4.F "Sizing").
fn required_bytes(cfg: &Config, svc_cfg: &ServiceConfig, length: u16) -> Result<(usize, usize), ErrorCode> {
    if length > cfg.datagram_length_max {
        return Err(ErrorCode::DatagramTooLong);
    }
    let payload = length as usize + if svc_cfg.is_stream { 0 } else { 1 };
    if svc_cfg.is_stream {
        if payload > cfg.frame_length_max as usize {
            return Err(ErrorCode::DatagramTooLong);
        }
        Ok((1, payload + 4))
    } else {
        let frame_length_max = cfg.frame_length_max as usize;
        let frame_count = (payload + frame_length_max) / frame_length_max;
        Ok((frame_count, payload + 4 * frame_count))
    }
}

/// Fragment `data` for `(service_index, sub_service_index)` and enqueue the
/// resulting raw frames onto `tx_ring`. Returns the number of frames
/// enqueued; `0` means either a validation error (`error` is set) or the
/// buffer lacked space (not an error — the caller should retry later).
///
/// The service-index-out-of-range check (§4.F) is performed by
/// [`crate::bus::Bus::transmit_datagram`] before this is reached, since
/// only the facade holds the indexable per-service arrays; everything else
/// in §4.F happens here.
#[allow(clippy::too_many_arguments)]
pub fn transmit_datagram<C: Callbacks, const TX_BUF: usize>(
    cfg: &Config,
    svc_cfg: &ServiceConfig,
    tx_ring: &mut TxRing<TX_BUF>,
    new_tx_data_flag: &mut bool,
    callbacks: &C,
    error: &mut ErrorCode,
    service_index: u8,
    sub_service_index: u8,
    data: &[u8],
) -> u8 {
    let length = data.len() as u16;
    let (frame_count, required) = match required_bytes(cfg, svc_cfg, length) {
        Ok(v) => v,
        Err(e) => {
            *error = e;
            return 0;
        }
    };

    if tx_ring.free_bytes() < required {
        return 0;
    }

    let mut consumed: usize = 0;
    let mut checksum_appended = false;
    let mut enqueued: u8 = 0;

    for _ in 0..frame_count {
        let mut buf = [0u8; MAX_FRAME_BUF];
        let remaining = data.len() - consumed;
        let chunk_len = remaining.min(cfg.frame_length_max as usize);
        buf[3..3 + chunk_len].copy_from_slice(&data[consumed..consumed + chunk_len]);
        consumed += chunk_len;
        let mut frame_data_len = chunk_len;

        if !svc_cfg.is_stream
            && frame_data_len < cfg.frame_length_max as usize
            && consumed == data.len()
            && !checksum_appended
        {
            // Datagram-level checksum (§4.C), appended as the final data
            // byte of the terminator frame — distinct from the frame-level
            // checksum written below, which covers this frame's header and
            // data (including this very byte).
            buf[3 + frame_data_len] = crate::checksum::datagram_checksum(callbacks, data);
            frame_data_len += 1;
            checksum_appended = true;
        }

        buf[0] = cfg.start_frame;
        buf[1] = pack_service_code(service_index, sub_service_index);
        buf[2] = frame_data_len as u8;
        let checksum = frame_checksum(callbacks, &buf, frame_data_len);
        buf[3 + frame_data_len] = checksum;

        let raw = &buf[..4 + frame_data_len];
        if svc_cfg.is_stream && svc_cfg.only_tx_latest {
            tx_ring.push_frame_only_latest(raw);
        } else {
            tx_ring.push_frame(raw);
        }
        *new_tx_data_flag = true;
        enqueued += 1;
    }

    enqueued
}
