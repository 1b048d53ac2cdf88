//! TX enhanced buffer descriptor for frame transmission.

use super::VolatileCell;
use super::bits::{tx_control, tx_status};

/// TX enhanced buffer descriptor (32 bytes).
#[repr(C, align(32))]
pub struct TxDescriptor {
    /// Bytes to transmit from the buffer
    data_length: VolatileCell<u16>,
    /// Control and status bits
    status: VolatileCell<u16>,
    /// Transmit buffer address
    buffer_addr: VolatileCell<u32>,
    /// Transmit error flags
    errors: VolatileCell<u16>,
    /// Interrupt and timestamp control
    control: VolatileCell<u16>,
    /// Launch time (AVB, unused)
    _launch_time: u32,
    _reserved0: u16,
    /// Last buffer descriptor update done
    bdu: VolatileCell<u16>,
    /// Captured 1588 nanosecond timestamp
    timestamp: VolatileCell<u32>,
    _reserved1: [u16; 4],
}

impl TxDescriptor {
    /// Size of the descriptor in bytes
    #[cfg(test)]
    pub const SIZE: usize = 32;

    /// Create a new zeroed TX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data_length: VolatileCell::new(0),
            status: VolatileCell::new(0),
            buffer_addr: VolatileCell::new(0),
            errors: VolatileCell::new(0),
            control: VolatileCell::new(0),
            _launch_time: 0,
            _reserved0: 0,
            bdu: VolatileCell::new(0),
            timestamp: VolatileCell::new(0),
            _reserved1: [0; 4],
        }
    }

    /// Reset to software ownership, keeping only the wrap bit.
    pub fn reset(&self, last: bool) {
        self.data_length.set(0);
        self.buffer_addr.set(0);
        self.errors.set(0);
        self.control.set(0);
        self.bdu.set(0);
        self.status.set(if last { tx_status::WRAP } else { 0 });
    }

    /// Fill in the descriptor and hand it to the controller.
    ///
    /// The status word is written last so the controller never sees a
    /// ready descriptor with a stale pointer or length.
    pub fn submit(&self, buffer: *const u8, len: usize, last: bool, timestamp: bool) {
        self.buffer_addr.set(buffer as u32);
        self.data_length.set(len as u16);
        self.errors.set(0);
        self.bdu.set(0);
        let mut control = tx_control::INT;
        if timestamp {
            control |= tx_control::TIMESTAMP;
        }
        self.control.set(control);

        let mut status = tx_status::READY | tx_status::LAST | tx_status::TX_CRC | tx_status::LINKED;
        if last {
            status |= tx_status::WRAP;
        }
        self.status.set(status);
    }

    /// Check if the descriptor is owned by the controller.
    #[inline(always)]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        (self.status.get() & tx_status::READY) != 0
    }

    /// Check if the driver still has a buffer linked to this descriptor.
    #[inline(always)]
    #[must_use]
    pub fn is_linked(&self) -> bool {
        (self.status.get() & tx_status::LINKED) != 0
    }

    /// Drop the driver link marker.
    #[inline(always)]
    pub fn clear_link(&self) {
        self.status.update(|v| v & !tx_status::LINKED);
    }

    /// Check if the wrap bit is set.
    #[cfg(test)]
    pub fn is_wrap(&self) -> bool {
        (self.status.get() & tx_status::WRAP) != 0
    }

    /// Captured egress timestamp (nanoseconds field of the 1588 timer).
    #[inline(always)]
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        self.timestamp.get()
    }

    /// Bytes handed to the controller.
    #[cfg(test)]
    pub fn data_length(&self) -> usize {
        self.data_length.get() as usize
    }

    /// Raw status word.
    #[cfg(test)]
    pub fn raw_status(&self) -> u16 {
        self.status.get()
    }

    /// Raw control word.
    #[cfg(test)]
    pub fn raw_control(&self) -> u16 {
        self.control.get()
    }

    /// Simulate the controller finishing the frame.
    #[cfg(test)]
    pub fn complete(&self, timestamp: u32) {
        self.timestamp.set(timestamp);
        self.status.update(|v| v & !tx_status::READY);
    }
}

impl Default for TxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: TxDescriptor uses volatile cells for all controller-accessed fields
unsafe impl Sync for TxDescriptor {}
unsafe impl Send for TxDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tx_descriptor_size() {
        assert_eq!(core::mem::size_of::<TxDescriptor>(), TxDescriptor::SIZE);
        assert_eq!(core::mem::align_of::<TxDescriptor>(), 32);
    }

    #[test]
    fn new_descriptor_is_idle() {
        let desc = TxDescriptor::new();
        assert!(!desc.is_ready());
        assert!(!desc.is_linked());
    }

    #[test]
    fn submit_sets_ready_last_crc_and_link() {
        let desc = TxDescriptor::new();
        let buf = [0u8; 64];
        desc.submit(buf.as_ptr(), 60, false, false);

        let raw = desc.raw_status();
        assert!(desc.is_ready());
        assert!(desc.is_linked());
        assert_ne!(raw & tx_status::LAST, 0);
        assert_ne!(raw & tx_status::TX_CRC, 0);
        assert_eq!(raw & tx_status::WRAP, 0);
        assert_eq!(desc.data_length(), 60);
        assert_eq!(desc.raw_control() & tx_control::TIMESTAMP, 0);
    }

    #[test]
    fn submit_on_last_slot_sets_wrap_and_timestamp_request() {
        let desc = TxDescriptor::new();
        let buf = [0u8; 64];
        desc.submit(buf.as_ptr(), 64, true, true);
        assert!(desc.is_wrap());
        assert_ne!(desc.raw_control() & tx_control::TIMESTAMP, 0);
    }

    #[test]
    fn completion_keeps_link_until_cleared() {
        let desc = TxDescriptor::new();
        let buf = [0u8; 64];
        desc.submit(buf.as_ptr(), 64, false, false);
        desc.complete(1234);

        assert!(!desc.is_ready());
        assert!(desc.is_linked());
        assert_eq!(desc.timestamp(), 1234);

        desc.clear_link();
        assert!(!desc.is_linked());
    }

    #[test]
    fn reset_keeps_wrap_on_last() {
        let desc = TxDescriptor::new();
        desc.reset(true);
        assert!(desc.is_wrap());
        assert!(!desc.is_ready());
        desc.reset(false);
        assert!(!desc.is_wrap());
    }
}
