//! Centralized Constants
//!
//! Magic numbers used throughout the ENET driver, grouped by category:
//! - **Frame/Buffer sizes**: Ethernet frame dimensions and ring geometry
//! - **Timing**: spin limits and reset polling
//! - **Clocks**: MDC and 1588 timer defaults
//! - **Filtering**: multicast pool capacity
//!
//! Hardware register bit definitions live in `register/enet.rs` and the
//! descriptor bit modules.

// =============================================================================
// Frame and Buffer Sizes
// =============================================================================

/// Ethernet header size (dst MAC + src MAC + EtherType)
pub const ETH_HEADER_SIZE: usize = 14;

/// Size of one MAC address
pub const MAC_ADDR_LEN: usize = 6;

/// Maximum Ethernet frame size including VLAN tag (1500 + 14 header + 4 CRC + 4 VLAN)
pub const MAX_FRAME_SIZE: usize = 1522;

/// Largest frame length the RCR MAX_FL field can express
pub const MAX_FL_LIMIT: usize = 0x3FFF;

/// Receive buffers must be a multiple of this size (MRBR granularity)
pub const RX_BUFFER_GRANULE: usize = 16;

/// Copy granularity used when splicing a frame across the ring end
pub const SPLICE_WORD: usize = 4;

/// Broadcast destination address
pub const BROADCAST_ADDR: [u8; MAC_ADDR_LEN] = [0xFF; MAC_ADDR_LEN];

/// Default MAC address (locally administered)
pub const DEFAULT_MAC_ADDR: [u8; MAC_ADDR_LEN] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];

// =============================================================================
// Timing Constants
// =============================================================================

/// Default MAC reset timeout in microseconds
pub const RESET_TIMEOUT_US: u32 = 10_000;

/// Reset poll interval in microseconds
pub const RESET_POLL_INTERVAL_US: u32 = 10;

/// Maximum iterations waiting for a management frame to complete
pub const MII_SPIN_LIMIT: u32 = 10_000;

/// Maximum iterations waiting for a timer capture to complete
pub const TIME_CAPTURE_SPIN_LIMIT: u32 = 1_000;

// =============================================================================
// Clock Frequencies
// =============================================================================

/// Maximum MDC frequency per IEEE 802.3 clause 22
pub const MDC_MAX_FREQ_HZ: u32 = 2_500_000;

/// Default module (IPG) clock feeding the MDC divider
pub const DEFAULT_MODULE_CLOCK_HZ: u32 = 150_000_000;

/// MDIO hold time in module clock cycles (MSCR HOLDTIME field)
pub const MDIO_HOLD_TIME: u32 = 2;

/// Nanoseconds per second (1588 timer period)
pub const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Default timer increment for a 25 MHz timestamp clock
pub const DEFAULT_TIMER_INCREMENT: u8 = 40;

/// Largest value representable in the ATINC increment fields
pub const MAX_TIMER_INCREMENT: u8 = 0x7F;

// =============================================================================
// Filtering
// =============================================================================

/// Number of multicast addresses tracked exactly per controller
pub const MULTICAST_POOL_SIZE: usize = 8;
