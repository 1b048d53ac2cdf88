//! Frame transmission.
//!
//! Transmission is a two-step protocol: borrow a buffer, fill the payload,
//! then hand it back through [`Enet::transmit`]. Confirmations for frames
//! sent with `confirm` set are delivered by [`Enet::confirm_transmissions`]
//! (polling) or the transmit interrupt.

use super::enet::Enet;
use super::error::{BufferError, IoError, Result};
use super::notify::EthIf;
use crate::internal::constants::MAC_ADDR_LEN;
use crate::internal::ptp::TimeStamp;
use crate::internal::register::RegisterAccess;

/// A borrowed transmit buffer.
///
/// `payload` starts after the 14-byte Ethernet header, which the driver
/// writes at transmit time. Pass `index` back to [`Enet::transmit`].
#[derive(Debug)]
pub struct TxBuffer<'a> {
    /// Buffer index to pass to [`Enet::transmit`]
    pub index: usize,
    /// Writable payload area
    pub payload: &'a mut [u8],
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Borrow a buffer for a payload of `len` bytes.
    ///
    /// # Errors
    /// - `Busy` - no free buffer or contiguous group right now
    /// - `Overflow { max_len }` - `len` can never fit; `max_len` is the limit
    pub fn borrow_tx_buffer(&mut self, len: usize) -> Result<TxBuffer<'_>> {
        self.ensure_initialized()?;
        let index = self.tx.borrow(len, self.config.multi_buffer_tx)?;
        let payload = self
            .tx
            .payload_mut(index)
            .ok_or(BufferError::InvalidBuffer)?;
        Ok(TxBuffer { index, payload })
    }

    /// Send a borrowed buffer.
    ///
    /// `len` is the payload length. A length of zero gives the buffer back
    /// without sending anything. `src` overrides the station address in the
    /// source field. With `confirm` set, the upper layer receives
    /// [`EthIf::tx_confirmation`] once the frame has left.
    ///
    /// # Errors
    /// - `InvalidBuffer` / `NotLocked` - `buf_idx` was not borrowed
    /// - `Overflow { max_len }` - `len` exceeds the borrowed capacity
    /// - `Busy` - next descriptor still in use; retry after confirmations
    pub fn transmit(
        &mut self,
        buf_idx: usize,
        ether_type: u16,
        dest: &[u8; MAC_ADDR_LEN],
        len: usize,
        confirm: bool,
        src: Option<&[u8; MAC_ADDR_LEN]>,
    ) -> Result<()> {
        self.ensure_initialized()?;

        if len == 0 {
            self.tx.release(buf_idx)?;
            return Ok(());
        }

        let source = match src {
            Some(addr) => *addr,
            None => self.config.mac_address,
        };
        self.tx.write_header(buf_idx, dest, &source, ether_type)?;

        let was_active = self.regs.is_tx_active();
        self.tx
            .submit(buf_idx, len, confirm, self.config.timestamping)?;
        self.regs.ring_tx_doorbell();

        // A doorbell write while the controller is still active may be
        // lost if it goes idle at the same moment.
        if was_active {
            self.tx.set_doorbell_retry(true);
            #[cfg(feature = "defmt")]
            defmt::debug!("ENET{} TX doorbell while active", self.config.controller_index);
        }
        Ok(())
    }

    /// Deliver pending transmit confirmations.
    ///
    /// Use when transmit interrupts are disabled; the interrupt handler
    /// calls the same path otherwise.
    pub fn confirm_transmissions<E: EthIf>(&mut self, upper: &mut E) -> Result<()> {
        self.ensure_initialized()?;
        self.confirm_completed(upper);
        Ok(())
    }

    /// Confirm every completed group and repeat a possibly lost doorbell.
    pub(super) fn confirm_completed<E: EthIf>(&mut self, upper: &mut E) -> usize {
        self.replay_doorbell();

        let mut confirmed = 0;
        for idx in 0..TX_BUFS {
            if self.tx.unlink_completed(idx) {
                upper.tx_confirmation(self.config.controller_index, idx);
                self.tx.finish_confirmation(idx);
                confirmed += 1;
            }
        }
        confirmed
    }

    /// Ring the doorbell again if an earlier ring raced with the
    /// controller going idle.
    pub(super) fn replay_doorbell(&mut self) {
        if self.tx.doorbell_retry() && !self.regs.is_tx_active() {
            self.tx.set_doorbell_retry(false);
            let pending = self
                .tx
                .descriptor(self.tx.active_descriptor())
                .is_some_and(|d| d.is_ready());
            let previous = (self.tx.active_descriptor() + TX_BUFS - 1) % TX_BUFS;
            if pending || self.tx.descriptor(previous).is_some_and(|d| d.is_ready()) {
                self.regs.ring_tx_doorbell();
            }
        }
    }

    /// Egress timestamp of the last frame sent from `buf_idx`.
    ///
    /// Readable once the frame has left, until the buffer is borrowed
    /// again or its descriptor carries another frame.
    ///
    /// # Errors
    /// - `InvalidState` - timestamping disabled, nothing sent from
    ///   `buf_idx`, or the frame has not left yet
    /// - `InvalidBuffer` - `buf_idx` out of range
    pub fn egress_timestamp(&mut self, buf_idx: usize) -> Result<TimeStamp> {
        self.ensure_initialized()?;
        if !self.config.timestamping {
            return Err(IoError::InvalidState.into());
        }
        let captured = match self.tx.sent_descriptor(buf_idx)? {
            Some(desc) if !desc.is_ready() => desc.timestamp(),
            _ => return Err(IoError::InvalidState.into()),
        };
        self.reconcile(captured)
    }

    /// Transmit buffers currently borrowed or in flight
    pub fn tx_buffers_in_use(&self) -> usize {
        self.tx.locked_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::{EnetConfig, Mode};
    use crate::driver::error::ConfigError;
    use crate::internal::register::enet::TDAR_OFFSET;
    use crate::testing::{MockDelay, MockRegisters, RecordingEthIf};

    type TestEnet<'a> = Enet<&'a MockRegisters, 4, 4, 256>;

    const DEST: [u8; 6] = [0x02, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE];

    fn active(mock: &MockRegisters, config: EnetConfig) -> TestEnet<'_> {
        let mut enet = Enet::new(mock);
        enet.init(config, MockDelay::new()).unwrap();
        enet.set_mode(Mode::Active).unwrap();
        enet
    }

    fn send(enet: &mut TestEnet<'_>, len: usize, confirm: bool) -> usize {
        let TxBuffer { index, payload } = enet.borrow_tx_buffer(len).unwrap();
        payload[..len].fill(0x5A);
        enet.transmit(index, 0x0800, &DEST, len, confirm, None).unwrap();
        index
    }

    #[test]
    fn borrow_requires_init() {
        let mock = MockRegisters::new();
        let mut enet: TestEnet<'_> = Enet::new(&mock);
        assert_eq!(
            enet.borrow_tx_buffer(10).map(|b| b.index),
            Err(ConfigError::NotInitialized.into())
        );
    }

    #[test]
    fn borrow_reports_overflow_limit() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        assert_eq!(
            enet.borrow_tx_buffer(243).map(|b| b.index),
            Err(BufferError::Overflow { max_len: 242 }.into())
        );
        assert_eq!(enet.borrow_tx_buffer(242).map(|b| b.payload.len()), Ok(242));
    }

    #[test]
    fn borrow_reports_busy_when_exhausted() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        for _ in 0..3 {
            enet.borrow_tx_buffer(100).unwrap();
        }
        assert_eq!(
            enet.borrow_tx_buffer(100).map(|b| b.index),
            Err(BufferError::Busy.into())
        );
        assert_eq!(enet.tx_buffers_in_use(), 3);
    }

    #[test]
    fn transmit_writes_header_and_rings_doorbell() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        mock.clear_writes();
        let idx = send(&mut enet, 46, false);

        let buffer = enet.tx.buffer(idx);
        assert_eq!(&buffer[..6], &DEST);
        assert_eq!(&buffer[6..12], &enet.config.mac_address);
        assert_eq!(&buffer[12..14], &[0x08, 0x00]);
        assert_eq!(buffer[14], 0x5A);

        let desc = enet.tx.descriptor(0).unwrap();
        assert!(desc.is_ready());
        assert_eq!(mock.writes_to(TDAR_OFFSET).len(), 1);
        assert!(!enet.tx.doorbell_retry());
    }

    #[test]
    fn transmit_uses_source_override() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        let src = [0x02, 0x01, 0x02, 0x03, 0x04, 0x05];
        let idx = enet.borrow_tx_buffer(20).unwrap().index;
        enet.transmit(idx, 0x88F7, &DEST, 20, false, Some(&src)).unwrap();
        assert_eq!(&enet.tx.buffer(idx)[6..12], &src);
    }

    #[test]
    fn zero_length_transmit_releases_buffer() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        mock.clear_writes();
        let idx = enet.borrow_tx_buffer(100).unwrap().index;
        enet.transmit(idx, 0x0800, &DEST, 0, true, None).unwrap();

        assert_eq!(enet.tx_buffers_in_use(), 0);
        assert!(mock.writes_to(TDAR_OFFSET).is_empty());
        assert!(enet.transmit(idx, 0x0800, &DEST, 10, false, None).is_err());
    }

    #[test]
    fn transmit_rejects_unborrowed_and_oversized() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        assert_eq!(
            enet.transmit(1, 0x0800, &DEST, 10, false, None),
            Err(BufferError::NotLocked.into())
        );
        assert_eq!(
            enet.transmit(9, 0x0800, &DEST, 10, false, None),
            Err(BufferError::InvalidBuffer.into())
        );
        let idx = enet.borrow_tx_buffer(10).unwrap().index;
        assert_eq!(
            enet.transmit(idx, 0x0800, &DEST, 243, false, None),
            Err(BufferError::Overflow { max_len: 242 }.into())
        );
    }

    #[test]
    fn doorbell_while_active_is_replayed() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        send(&mut enet, 46, false);
        // Controller still busy with the first frame.
        send(&mut enet, 46, false);
        assert!(enet.tx.doorbell_retry());

        mock.clear_tx_active();
        mock.clear_writes();
        let mut upper = RecordingEthIf::new();
        enet.confirm_transmissions(&mut upper).unwrap();
        assert!(!enet.tx.doorbell_retry());
        assert_eq!(mock.writes_to(TDAR_OFFSET).len(), 1);
    }

    #[test]
    fn confirmation_is_delivered_once() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        let mut upper = RecordingEthIf::new();
        let idx = send(&mut enet, 46, true);

        enet.confirm_transmissions(&mut upper).unwrap();
        assert!(upper.confirmed.is_empty());

        enet.tx.descriptor(0).unwrap().complete(0);
        enet.confirm_transmissions(&mut upper).unwrap();
        enet.confirm_transmissions(&mut upper).unwrap();
        assert_eq!(upper.confirmed, [(0, idx)]);
        assert_eq!(enet.tx_buffers_in_use(), 0);
        assert_eq!(enet.tx.pending_confirmations(), 0);
    }

    #[test]
    fn unconfirmed_frames_are_never_reported() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        let mut upper = RecordingEthIf::new();
        send(&mut enet, 46, false);
        enet.tx.descriptor(0).unwrap().complete(0);
        enet.confirm_transmissions(&mut upper).unwrap();
        assert!(upper.confirmed.is_empty());
        // Reclaimed on the next borrow.
        enet.borrow_tx_buffer(10).unwrap();
        assert_eq!(enet.tx_buffers_in_use(), 1);
    }

    #[test]
    fn egress_timestamp_requires_timestamping() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        let idx = send(&mut enet, 46, true);
        assert_eq!(
            enet.egress_timestamp(idx),
            Err(IoError::InvalidState.into())
        );
    }

    #[test]
    fn egress_timestamp_after_completion() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new().with_timestamping(40));
        critical_section::with(|cs| enet.time.borrow(cs).set(TimeStamp::new(7, 0)));
        let idx = send(&mut enet, 46, true);
        assert_eq!(
            enet.egress_timestamp(idx),
            Err(IoError::InvalidState.into())
        );

        mock.queue_timer_values(&[900]);
        enet.tx.descriptor(0).unwrap().complete(800);
        let mut upper = RecordingEthIf::new();
        enet.confirm_transmissions(&mut upper).unwrap();
        assert_eq!(enet.egress_timestamp(idx), Ok(TimeStamp::new(7, 800)));
    }

    #[test]
    fn egress_timestamp_of_unsent_buffer_is_refused() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new().with_timestamping(40));
        let mut upper = RecordingEthIf::new();
        let idx = send(&mut enet, 46, true);
        assert_eq!(idx, 0);
        mock.queue_timer_values(&[900]);
        enet.tx.descriptor(0).unwrap().complete(800);
        enet.confirm_transmissions(&mut upper).unwrap();
        assert!(enet.egress_timestamp(idx).is_ok());

        assert_eq!(enet.egress_timestamp(2), Err(IoError::InvalidState.into()));
        assert_eq!(enet.egress_timestamp(4), Err(BufferError::InvalidBuffer.into()));

        // Given back with a zero length instead of being sent.
        let released = enet.borrow_tx_buffer(10).unwrap().index;
        enet.transmit(released, 0x0800, &DEST, 0, false, None).unwrap();
        assert_eq!(
            enet.egress_timestamp(released),
            Err(IoError::InvalidState.into())
        );
    }

    #[test]
    fn set_mode_down_drops_outstanding_buffers() {
        let mock = MockRegisters::new();
        let mut enet = active(&mock, EnetConfig::new());
        let mut upper = RecordingEthIf::new();
        send(&mut enet, 46, true);
        enet.borrow_tx_buffer(10).unwrap();

        enet.set_mode(Mode::Down).unwrap();
        assert_eq!(enet.tx_buffers_in_use(), 0);
        enet.confirm_transmissions(&mut upper).unwrap();
        assert!(upper.confirmed.is_empty());
    }
}
