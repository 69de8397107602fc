//! `Bus`: the public facade tying configuration, embedder callbacks and
//! per-bus state together behind the five entry points an embedder drives
//! (§5, §6).
//!
//! Grounded on the teacher's `Context` public method set (`new`,
//! `send_frame`/`queue_frame`, `poll`, `get_msg`, the `get_*_cnt` getters),
//! reshaped around this spec's actual operations.

use crate::callbacks::Callbacks;
use crate::config::Config;
use crate::error::ErrorCode;
use crate::frame::Frame;
use crate::rx_byte;
use crate::rx_datagram;
use crate::state::BusState;
use crate::tx_arbiter::{self, PrepareResult};
use crate::tx_fragment;

/// A single PRLSC bus. `DATAGRAM_BUF`/`TX_BUF` size the per-service RX
/// reassembly and TX circular buffers respectively (applied uniformly
/// across every configured service — see DESIGN.md).
pub struct Bus<const DATAGRAM_BUF: usize, const TX_BUF: usize> {
    config: Config,
    state: BusState<DATAGRAM_BUF, TX_BUF>,
}

impl<const DATAGRAM_BUF: usize, const TX_BUF: usize> Bus<DATAGRAM_BUF, TX_BUF> {
    pub fn new(config: Config) -> Self {
        Bus {
            config,
            state: BusState::new(),
        }
    }

    /// Feed one raw (possibly escaped) byte off the wire (§4.D, §4.E).
    /// Drives the byte state machine and, on a completed frame, the
    /// datagram reassembler for that frame's service; `callbacks` may be
    /// invoked for `checksum` and, on a completed datagram, `received_datagram`.
    pub fn receive_byte<C: Callbacks>(&mut self, callbacks: &mut C, byte: u8) {
        let Bus { ref config, state } = self;
        let frame: Option<Frame<'_>> =
            rx_byte::receive_byte(config, &mut state.rx_frame, &*callbacks, &mut state.error_code, byte);
        if let Some(frame) = frame {
            let svc_idx = frame.service_index as usize;
            let svc_cfg = &config.services[svc_idx];
            rx_datagram::receive_frame(
                config,
                svc_cfg,
                &mut state.rx_datagram[svc_idx],
                &frame,
                callbacks,
                &mut state.error_code,
            );
        }
    }

    /// Fragment and buffer a datagram for transmission (§4.F). Returns the
    /// number of raw frames enqueued; `0` means either a validation error
    /// (check [`Bus::error_code`]) or the buffer currently lacks space,
    /// which is not an error — the caller may retry later.
    pub fn transmit_datagram<C: Callbacks>(
        &mut self,
        callbacks: &C,
        service_index: u8,
        sub_service_index: u8,
        data: &[u8],
    ) -> u8 {
        if !self.config.service_in_range(service_index) {
            self.state.error_code = ErrorCode::DatagramServiceIndexBounds;
            return 0;
        }
        let svc_cfg = self.config.services[service_index as usize];
        tx_fragment::transmit_datagram(
            &self.config,
            &svc_cfg,
            &mut self.state.tx_rings[service_index as usize],
            &mut self.state.new_tx_data_flag,
            callbacks,
            &mut self.state.error_code,
            service_index,
            sub_service_index,
            data,
        )
    }

    /// Select the next service to transmit from and stage its frame
    /// (§4.G). Call [`Bus::tx_byte`] repeatedly afterwards while it
    /// returns `true`.
    pub fn prepare_service_transmission<C: Callbacks>(&mut self, callbacks: &C) -> PrepareResult {
        self.state.new_tx_data_flag = false;
        tx_arbiter::prepare_service_transmission(
            &self.config,
            &mut self.state.tx_rings,
            &mut self.state.tx_byte,
            &self.state.last_transmitted,
            callbacks,
        )
    }

    /// Emit one escaped byte of the staged frame (§4.G). Returns `true` if
    /// there's more of the frame left (call again), `false` once it's
    /// fully sent or nothing was staged.
    pub fn tx_byte<C: Callbacks>(&mut self, callbacks: &mut C) -> bool {
        tx_arbiter::tx_byte(
            &self.config,
            &mut self.state.tx_byte,
            &mut self.state.last_transmitted,
            callbacks,
            &mut self.state.error_code,
        )
    }

    /// `true` if new data has been enqueued since the last call to
    /// [`Bus::prepare_service_transmission`] (a poll-loop hint: the
    /// embedder may skip calling prepare/tx_byte when this is `false` and
    /// nothing is already in flight).
    pub fn has_new_tx_data(&self) -> bool {
        self.state.new_tx_data_flag
    }

    /// The most recent error (§7); sticky until overwritten or cleared.
    pub fn error_code(&self) -> ErrorCode {
        self.state.error_code
    }

    /// Reset the sticky error back to [`ErrorCode::None`].
    pub fn clear_error(&mut self) {
        self.state.error_code = ErrorCode::None;
    }

    /// Rolling count of frames that have passed checksum verification on
    /// the receive side (diagnostic counter, not part of the wire
    /// protocol).
    pub fn frames_received(&self) -> u8 {
        self.state.rx_frame.frames_received
    }

    /// Discard whatever is buffered but not yet picked up by the arbiter
    /// for `service_index` (§5 "Cancellation").
    pub fn discard_unsent(&mut self, service_index: u8) {
        if let Some(ring) = self.state.tx_rings.get_mut(service_index as usize) {
            ring.discard_unsent();
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
