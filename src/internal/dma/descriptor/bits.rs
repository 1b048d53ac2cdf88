//! Enhanced buffer descriptor bit field constants.
//!
//! The ENET controller runs with 1588 enhancements enabled, so every
//! descriptor is the 32-byte enhanced layout. Field words are 16 bits wide
//! and little-endian (ECR.DBSWP set).

#![allow(dead_code)]

// =============================================================================
// RX Descriptor Status (offset 0x02)
// =============================================================================

/// RX descriptor control/status word bit field constants
pub mod rx_status {
    /// Empty - buffer owned by the controller and waiting for data
    pub const EMPTY: u16 = 1 << 15;
    /// Receive software ownership 1 (reserved for software)
    pub const RO1: u16 = 1 << 14;
    /// Wrap - last descriptor in the ring
    pub const WRAP: u16 = 1 << 13;
    /// Receive software ownership 2 (reserved for software)
    pub const RO2: u16 = 1 << 12;
    /// Last buffer of a frame
    pub const LAST: u16 = 1 << 11;
    /// Miss - accepted only because of promiscuous mode
    pub const MISS: u16 = 1 << 8;
    /// Destination was the broadcast address
    pub const BROADCAST: u16 = 1 << 7;
    /// Destination was a multicast address
    pub const MULTICAST: u16 = 1 << 6;
    /// Frame length violation (exceeds RCR MAX_FL)
    pub const LENGTH_VIOLATION: u16 = 1 << 5;
    /// Non-octet aligned frame
    pub const NON_OCTET: u16 = 1 << 4;
    /// CRC error
    pub const CRC_ERR: u16 = 1 << 2;
    /// Receive FIFO overrun
    pub const OVERRUN: u16 = 1 << 1;
    /// Frame truncated (exceeds the configured buffer space)
    pub const TRUNCATED: u16 = 1 << 0;

    /// Error bits reported in the status word
    pub const ALL_ERRORS: u16 = LENGTH_VIOLATION | NON_OCTET | CRC_ERR | OVERRUN | TRUNCATED;

    /// Errors that terminate a frame at the current buffer
    pub const TERMINATING: u16 = LENGTH_VIOLATION | TRUNCATED;
}

// =============================================================================
// RX Descriptor Extended Status (offset 0x0A)
// =============================================================================

/// RX descriptor extended status word bit field constants
pub mod rx_ext {
    /// MAC error (FIFO overflow or other MAC fault)
    pub const MAC_ERR: u16 = 1 << 15;
    /// PHY error (RX_ER asserted)
    pub const PHY_ERR: u16 = 1 << 10;
    /// Collision detected during reception
    pub const COLLISION: u16 = 1 << 9;
    /// Unicast frame
    pub const UNICAST: u16 = 1 << 8;
    /// Generate RXB/RXF interrupt for this buffer
    pub const INT: u16 = 1 << 7;

    /// Error bits reported in the extended status word
    pub const ALL_ERRORS: u16 = MAC_ERR | PHY_ERR | COLLISION;
}

/// Merged RX error mask as seen by the ring manager
///
/// The status word errors occupy the low half, the extended status errors
/// the high half. Bit 30 is driver-defined.
pub mod rx_errors {
    /// Frame spans the ring end and could not be spliced
    pub const UNSPLICED: u32 = 1 << 30;

    /// Merge both descriptor status words into one error mask
    #[inline(always)]
    pub const fn merge(status: u16, ext: u16) -> u32 {
        ((status & super::rx_status::ALL_ERRORS) as u32)
            | (((ext & super::rx_ext::ALL_ERRORS) as u32) << 16)
    }
}

// =============================================================================
// TX Descriptor Status (offset 0x02)
// =============================================================================

/// TX descriptor control/status word bit field constants
pub mod tx_status {
    /// Ready - descriptor owned by the controller
    pub const READY: u16 = 1 << 15;
    /// Transmit software ownership 1, used as the driver link marker
    pub const LINKED: u16 = 1 << 14;
    /// Wrap - last descriptor in the ring
    pub const WRAP: u16 = 1 << 13;
    /// Transmit software ownership 2
    pub const TO2: u16 = 1 << 12;
    /// Last buffer of a frame
    pub const LAST: u16 = 1 << 11;
    /// Append CRC after the last data byte
    pub const TX_CRC: u16 = 1 << 10;
}

// =============================================================================
// TX Descriptor Extended Words (offsets 0x08 / 0x0A)
// =============================================================================

/// TX descriptor error word bit field constants
pub mod tx_errors {
    /// Transmit error summary
    pub const TXE: u16 = 1 << 15;
    /// Underflow error
    pub const UNDERFLOW: u16 = 1 << 13;
    /// Excess collision error
    pub const EXCESS_COLLISION: u16 = 1 << 12;
    /// Frame error
    pub const FRAME: u16 = 1 << 11;
    /// Late collision error
    pub const LATE_COLLISION: u16 = 1 << 10;
    /// Overflow error
    pub const OVERFLOW: u16 = 1 << 9;
    /// Timestamp error
    pub const TIMESTAMP: u16 = 1 << 8;
}

/// TX descriptor control word bit field constants
pub mod tx_control {
    /// Generate TXB/TXF interrupt for this frame
    pub const INT: u16 = 1 << 14;
    /// Capture a transmit timestamp
    pub const TIMESTAMP: u16 = 1 << 13;
    /// Insert protocol checksum
    pub const PINS: u16 = 1 << 12;
    /// Insert IP header checksum
    pub const IINS: u16 = 1 << 11;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_errors_keep_words_apart() {
        let merged = rx_errors::merge(rx_status::CRC_ERR, rx_ext::PHY_ERR);
        assert_eq!(merged, (rx_status::CRC_ERR as u32) | ((rx_ext::PHY_ERR as u32) << 16));
    }

    #[test]
    fn merged_errors_ignore_informational_bits() {
        let status = rx_status::LAST | rx_status::MULTICAST | rx_status::WRAP;
        let ext = rx_ext::UNICAST | rx_ext::INT;
        assert_eq!(rx_errors::merge(status, ext), 0);
    }

    #[test]
    fn software_error_bit_is_outside_hardware_bits() {
        assert_eq!(rx_errors::UNSPLICED & rx_errors::merge(0xFFFF, 0xFFFF), 0);
    }
}
