//! RX enhanced buffer descriptor.

use super::VolatileCell;
use super::bits::{rx_errors, rx_ext, rx_status};

/// RX enhanced buffer descriptor (32 bytes).
#[repr(C, align(32))]
pub struct RxDescriptor {
    /// Bytes written into the buffer (whole frame length on the last buffer)
    data_length: VolatileCell<u16>,
    /// Control and status bits
    status: VolatileCell<u16>,
    /// Receive buffer address
    buffer_addr: VolatileCell<u32>,
    /// Protocol information (VLAN, IPv6, fragment)
    _proto: u16,
    /// Extended status and interrupt control
    ext_status: VolatileCell<u16>,
    /// Payload checksum
    _checksum: u16,
    /// Header length and protocol type
    _header: u16,
    _reserved0: u16,
    /// Last buffer descriptor update done
    bdu: VolatileCell<u16>,
    /// Captured 1588 nanosecond timestamp
    timestamp: VolatileCell<u32>,
    _reserved1: [u16; 4],
}

impl RxDescriptor {
    /// Size of the descriptor in bytes
    #[cfg(test)]
    pub const SIZE: usize = 32;

    /// Create a new zeroed RX descriptor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data_length: VolatileCell::new(0),
            status: VolatileCell::new(0),
            buffer_addr: VolatileCell::new(0),
            _proto: 0,
            ext_status: VolatileCell::new(0),
            _checksum: 0,
            _header: 0,
            _reserved0: 0,
            bdu: VolatileCell::new(0),
            timestamp: VolatileCell::new(0),
            _reserved1: [0; 4],
        }
    }

    /// Point the descriptor at its buffer and hand it to the controller.
    pub fn setup(&self, buffer: *const u8, last: bool, interrupt: bool) {
        self.buffer_addr.set(buffer as u32);
        self.arm(last, interrupt);
    }

    /// Return the descriptor to the controller: empty, wrap if last.
    ///
    /// Everything except the empty/wrap bits is cleared first so stale
    /// status from the previous frame is never observed again.
    pub fn arm(&self, last: bool, interrupt: bool) {
        self.data_length.set(0);
        self.ext_status
            .set(if interrupt { rx_ext::INT } else { 0 });
        self.bdu.set(0);
        let mut status = rx_status::EMPTY;
        if last {
            status |= rx_status::WRAP;
        }
        self.status.set(status);
    }

    /// Check if the descriptor is still owned by the controller.
    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (self.status.get() & rx_status::EMPTY) != 0
    }

    /// Check if this is the last buffer of a frame.
    #[inline(always)]
    #[must_use]
    pub fn is_last(&self) -> bool {
        (self.status.get() & rx_status::LAST) != 0
    }

    /// Check if the wrap bit is set.
    #[cfg(test)]
    pub fn is_wrap(&self) -> bool {
        (self.status.get() & rx_status::WRAP) != 0
    }

    /// Check if the frame was cut short at this buffer (truncated or too long).
    #[inline(always)]
    #[must_use]
    pub fn is_terminated_early(&self) -> bool {
        (self.status.get() & rx_status::TERMINATING) != 0
    }

    /// Destination was a multicast address.
    #[inline(always)]
    #[must_use]
    pub fn is_multicast(&self) -> bool {
        (self.status.get() & rx_status::MULTICAST) != 0
    }

    /// Destination was the broadcast address.
    #[inline(always)]
    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        (self.status.get() & rx_status::BROADCAST) != 0
    }

    /// Merged error bits of the status and extended status words.
    #[inline(always)]
    #[must_use]
    pub fn error_mask(&self) -> u32 {
        rx_errors::merge(self.status.get(), self.ext_status.get())
    }

    /// Bytes reported by the controller.
    #[inline(always)]
    #[must_use]
    pub fn data_length(&self) -> usize {
        self.data_length.get() as usize
    }

    /// Captured ingress timestamp (nanoseconds field of the 1588 timer).
    #[inline(always)]
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        self.timestamp.get()
    }

    /// Simulate the controller completing a buffer.
    #[cfg(test)]
    pub fn complete(&self, len: u16, status: u16, ext: u16, timestamp: u32) {
        self.data_length.set(len);
        self.ext_status.set(ext);
        self.timestamp.set(timestamp);
        let wrap = self.status.get() & rx_status::WRAP;
        self.status.set((status & !rx_status::EMPTY) | wrap);
    }
}

impl Default for RxDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

// Safety: RxDescriptor uses volatile cells for all controller-accessed fields
unsafe impl Sync for RxDescriptor {}
unsafe impl Send for RxDescriptor {}
