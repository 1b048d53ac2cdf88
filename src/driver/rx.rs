//! Frame reception.
//!
//! Frames are drained from the receive ring in order, filtered against the
//! multicast pool, handed to the upper layer and their descriptors returned
//! to the controller. The same drain loop serves the receive interrupt and
//! the polling entry point.

use super::enet::Enet;
use super::config::Mode;
use super::error::{BufferError, IoError, Result};
use super::notify::{EthIf, RxFrame};
use crate::internal::constants::{ETH_HEADER_SIZE, MAC_ADDR_LEN};
use crate::internal::dma::{FrameSpan, RxClass, RxRing};
use crate::internal::ptp::TimeStamp;
use crate::internal::register::RegisterAccess;

/// Outcome of a polled receive call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxStatus {
    /// One frame was delivered and the ring holds no further frame
    Received,
    /// One frame was delivered and another is waiting
    ReceivedMore,
    /// Nothing was delivered
    NotReceived,
}

/// Where the drain loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Nothing left to inspect
    Idle,
    /// Frame at the cursor was consumed
    Consumed {
        /// Frame was delivered to the upper layer
        delivered: bool,
    },
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Poll the receive ring.
    ///
    /// Delivers at most one frame. Errored and filtered frames in front of
    /// it are dropped along the way. Returns
    /// [`RxStatus::ReceivedMore`] if another deliverable frame is already
    /// waiting, so the caller can poll again straight away.
    pub fn receive<E: EthIf>(&mut self, upper: &mut E) -> Result<RxStatus> {
        self.ensure_initialized()?;
        if self.mode() == Mode::Down {
            return Ok(RxStatus::NotReceived);
        }
        Ok(self.drain(false, upper))
    }

    /// Drain the receive ring.
    ///
    /// In interrupt mode every deliverable frame is handed up. In poll mode
    /// the loop stops at the second deliverable frame and leaves the cursor
    /// on it.
    pub(super) fn drain<E: EthIf>(&mut self, interrupt_driven: bool, upper: &mut E) -> RxStatus {
        let mut delivered = false;

        for _ in 0..2 * RX_BUFS {
            let cursor = self.rx.cursor();
            if !interrupt_driven && delivered && self.next_frame_qualifies(cursor) {
                return RxStatus::ReceivedMore;
            }
            match self.consume_frame(cursor, upper) {
                Step::Idle => break,
                Step::Consumed { delivered: true } => delivered = true,
                Step::Consumed { delivered: false } => {}
            }
        }

        if delivered {
            RxStatus::Received
        } else {
            RxStatus::NotReceived
        }
    }

    /// Check whether the complete frame at `idx` would be delivered,
    /// without consuming it.
    fn next_frame_qualifies(&mut self, idx: usize) -> bool {
        let end = match self.rx.classify(idx) {
            RxClass::Single => idx,
            RxClass::MultiFinished { last } => last,
            RxClass::Empty | RxClass::MultiUnfinished | RxClass::Overflow => return false,
        };
        let span = self.rx.extract(
            idx,
            end,
            self.config.max_frame_len as usize,
            self.config.rx_wraparound,
        );
        span.errors == 0 && self.accepts(&span)
    }

    /// Consume the frame starting at `idx`.
    fn consume_frame<E: EthIf>(&mut self, idx: usize, upper: &mut E) -> Step {
        let end = match self.rx.classify(idx) {
            RxClass::Empty | RxClass::MultiUnfinished => return Step::Idle,
            RxClass::Overflow => {
                #[cfg(feature = "defmt")]
                defmt::warn!("ENET{} RX ring overflow", self.config.controller_index);
                self.rx.rearm_all();
                self.regs.ring_rx_doorbell();
                return Step::Idle;
            }
            RxClass::Single => idx,
            RxClass::MultiFinished { last } => last,
        };

        let span = self.rx.extract(
            idx,
            end,
            self.config.max_frame_len as usize,
            self.config.rx_wraparound,
        );

        let delivered = span.errors == 0 && self.accepts(&span);
        if delivered {
            self.deliver(&span, end, upper);
        } else {
            #[cfg(feature = "defmt")]
            defmt::debug!("ENET RX drop at {}: errors {=u32:#x}", idx, span.errors);
        }

        self.rx.rearm_range(idx, end);
        self.regs.ring_rx_doorbell();
        self.rx.set_cursor(RxRing::<RX_BUFS, BUF_SIZE>::next_index(end));
        Step::Consumed { delivered }
    }

    /// Multicast frames need promiscuous mode or a pool match.
    fn accepts(&self, span: &FrameSpan) -> bool {
        if !span.multicast || self.promiscuous {
            return true;
        }
        match self.rx.frame(span).first_chunk::<MAC_ADDR_LEN>() {
            Some(dest) => self.multicast.accepts(dest),
            None => false,
        }
    }

    fn deliver<E: EthIf>(&mut self, span: &FrameSpan, end: usize, upper: &mut E) {
        let timestamp = if self.config.timestamping {
            self.ingress_timestamp(end).ok()
        } else {
            None
        };

        let bytes = self.rx.frame(span);
        let Some(header) = bytes.first_chunk::<ETH_HEADER_SIZE>() else {
            return;
        };
        let mut destination = [0u8; MAC_ADDR_LEN];
        let mut source = [0u8; MAC_ADDR_LEN];
        destination.copy_from_slice(&header[..6]);
        source.copy_from_slice(&header[6..12]);

        let frame = RxFrame {
            ether_type: u16::from_be_bytes([header[12], header[13]]),
            is_broadcast: span.broadcast,
            destination,
            source,
            payload: &bytes[ETH_HEADER_SIZE..],
            timestamp,
        };
        upper.rx_indication(self.config.controller_index, &frame);
    }

    /// Ingress timestamp of the frame that ended at receive buffer `buf_idx`.
    ///
    /// Valid until the controller reuses the buffer.
    ///
    /// # Errors
    /// - `InvalidState` - timestamping disabled
    /// - `InvalidBuffer` - index out of range
    pub fn ingress_timestamp(&mut self, buf_idx: usize) -> Result<TimeStamp> {
        self.ensure_initialized()?;
        if !self.config.timestamping {
            return Err(IoError::InvalidState.into());
        }
        let captured = self
            .rx
            .timestamp(buf_idx)
            .ok_or(BufferError::InvalidBuffer)?;
        self.reconcile(captured)
    }
}
