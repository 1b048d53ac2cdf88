//! ENET MAC register block
//!
//! Offsets are relative to the controller base address. Bit definitions are
//! grouped per register; only the fields the driver touches are listed.

#![allow(dead_code)]

use super::{RegisterAccess, reg_bit_check, reg_bit_ops, reg_ro, reg_rw};

// =============================================================================
// Register Offsets
// =============================================================================

/// Interrupt Event Register (write 1 to clear)
pub const EIR_OFFSET: usize = 0x004;
/// Interrupt Mask Register
pub const EIMR_OFFSET: usize = 0x008;
/// Receive Descriptor Active Register
pub const RDAR_OFFSET: usize = 0x010;
/// Transmit Descriptor Active Register
pub const TDAR_OFFSET: usize = 0x014;
/// Ethernet Control Register
pub const ECR_OFFSET: usize = 0x024;
/// MII Management Frame Register
pub const MMFR_OFFSET: usize = 0x040;
/// MII Speed Control Register
pub const MSCR_OFFSET: usize = 0x044;
/// MIB Control Register
pub const MIBC_OFFSET: usize = 0x064;
/// Receive Control Register
pub const RCR_OFFSET: usize = 0x084;
/// Transmit Control Register
pub const TCR_OFFSET: usize = 0x0C4;
/// Physical Address Lower Register
pub const PALR_OFFSET: usize = 0x0E4;
/// Physical Address Upper Register
pub const PAUR_OFFSET: usize = 0x0E8;
/// Descriptor Group Upper Address Register
pub const GAUR_OFFSET: usize = 0x120;
/// Descriptor Group Lower Address Register
pub const GALR_OFFSET: usize = 0x124;
/// Transmit FIFO Watermark Register
pub const TFWR_OFFSET: usize = 0x144;
/// Receive Descriptor Ring Start Register
pub const RDSR_OFFSET: usize = 0x180;
/// Transmit Descriptor Ring Start Register
pub const TDSR_OFFSET: usize = 0x184;
/// Maximum Receive Buffer Size Register
pub const MRBR_OFFSET: usize = 0x188;

/// Adjustable Timer Control Register
pub const ATCR_OFFSET: usize = 0x400;
/// Timer Value Register
pub const ATVR_OFFSET: usize = 0x404;
/// Timer Offset Register
pub const ATOFF_OFFSET: usize = 0x408;
/// Timer Period Register
pub const ATPER_OFFSET: usize = 0x40C;
/// Timer Correction Register
pub const ATCOR_OFFSET: usize = 0x410;
/// Time-Stamping Clock Period Register
pub const ATINC_OFFSET: usize = 0x414;

// =============================================================================
// Statistics Counter Offsets
// =============================================================================

/// RMON/IEEE statistics counters (read-only, cleared through MIBC)
pub mod stat {
    /// Tx packet count
    pub const RMON_T_PACKETS: usize = 0x204;
    /// Tx broadcast packets
    pub const RMON_T_BC_PKT: usize = 0x208;
    /// Tx multicast packets
    pub const RMON_T_MC_PKT: usize = 0x20C;
    /// Tx packets with CRC/align error
    pub const RMON_T_CRC_ALIGN: usize = 0x210;
    /// Tx packets less than 64 bytes, good CRC
    pub const RMON_T_UNDERSIZE: usize = 0x214;
    /// Tx packets greater than MAX_FL bytes, good CRC
    pub const RMON_T_OVERSIZE: usize = 0x218;
    /// Tx packets less than 64 bytes, bad CRC
    pub const RMON_T_FRAG: usize = 0x21C;
    /// Tx packets greater than MAX_FL bytes, bad CRC
    pub const RMON_T_JAB: usize = 0x220;
    /// Tx collision count
    pub const RMON_T_COL: usize = 0x224;
    /// Tx 64-byte packets
    pub const RMON_T_P64: usize = 0x228;
    /// Tx 65- to 127-byte packets
    pub const RMON_T_P65TO127: usize = 0x22C;
    /// Tx 128- to 255-byte packets
    pub const RMON_T_P128TO255: usize = 0x230;
    /// Tx 256- to 511-byte packets
    pub const RMON_T_P256TO511: usize = 0x234;
    /// Tx 512- to 1023-byte packets
    pub const RMON_T_P512TO1023: usize = 0x238;
    /// Tx 1024- to 2047-byte packets
    pub const RMON_T_P1024TO2047: usize = 0x23C;
    /// Tx packets greater than 2048 bytes
    pub const RMON_T_P_GTE2048: usize = 0x240;
    /// Tx octets
    pub const RMON_T_OCTETS: usize = 0x244;
    /// Frames transmitted with one collision
    pub const IEEE_T_1COL: usize = 0x250;
    /// Frames transmitted with multiple collisions
    pub const IEEE_T_MCOL: usize = 0x254;
    /// Frames transmitted after deferral delay
    pub const IEEE_T_DEF: usize = 0x258;
    /// Frames transmitted with late collision
    pub const IEEE_T_LCOL: usize = 0x25C;
    /// Frames transmitted with excessive collisions
    pub const IEEE_T_EXCOL: usize = 0x260;
    /// Frames transmitted with Tx FIFO underrun
    pub const IEEE_T_MACERR: usize = 0x264;
    /// Frames transmitted with carrier sense error
    pub const IEEE_T_CSERR: usize = 0x268;
    /// Frames transmitted with SQE error
    pub const IEEE_T_SQE: usize = 0x26C;
    /// Flow control pause frames transmitted
    pub const IEEE_T_FDXFC: usize = 0x270;
    /// Octet count for frames transmitted without error
    pub const IEEE_T_OCTETS_OK: usize = 0x274;
    /// Frames transmitted without error
    pub const IEEE_T_FRAME_OK: usize = 0x24C;
    /// Frames not counted correctly on transmit
    pub const IEEE_T_DROP: usize = 0x248;

    /// Rx packet count
    pub const RMON_R_PACKETS: usize = 0x284;
    /// Rx broadcast packets
    pub const RMON_R_BC_PKT: usize = 0x288;
    /// Rx multicast packets
    pub const RMON_R_MC_PKT: usize = 0x28C;
    /// Rx packets with CRC/align error
    pub const RMON_R_CRC_ALIGN: usize = 0x290;
    /// Rx packets with less than 64 bytes and good CRC
    pub const RMON_R_UNDERSIZE: usize = 0x294;
    /// Rx packets greater than MAX_FL and good CRC
    pub const RMON_R_OVERSIZE: usize = 0x298;
    /// Rx packets less than 64 bytes and bad CRC
    pub const RMON_R_FRAG: usize = 0x29C;
    /// Rx packets greater than MAX_FL bytes and bad CRC
    pub const RMON_R_JAB: usize = 0x2A0;
    /// Rx 64-byte packets
    pub const RMON_R_P64: usize = 0x2A8;
    /// Rx 65- to 127-byte packets
    pub const RMON_R_P65TO127: usize = 0x2AC;
    /// Rx 128- to 255-byte packets
    pub const RMON_R_P128TO255: usize = 0x2B0;
    /// Rx 256- to 511-byte packets
    pub const RMON_R_P256TO511: usize = 0x2B4;
    /// Rx 512- to 1023-byte packets
    pub const RMON_R_P512TO1023: usize = 0x2B8;
    /// Rx 1024- to 2047-byte packets
    pub const RMON_R_P1024TO2047: usize = 0x2BC;
    /// Rx packets greater than 2048 bytes
    pub const RMON_R_P_GTE2048: usize = 0x2C0;
    /// Rx octets
    pub const RMON_R_OCTETS: usize = 0x2C4;
    /// Frames not counted correctly on receive
    pub const IEEE_R_DROP: usize = 0x2C8;
    /// Frames received OK
    pub const IEEE_R_FRAME_OK: usize = 0x2CC;
    /// Frames received with CRC error
    pub const IEEE_R_CRC: usize = 0x2D0;
    /// Frames received with alignment error
    pub const IEEE_R_ALIGN: usize = 0x2D4;
    /// Receive FIFO overflow count
    pub const IEEE_R_MACERR: usize = 0x2D8;
    /// Flow control pause frames received
    pub const IEEE_R_FDXFC: usize = 0x2DC;
    /// Octet count for frames received without error
    pub const IEEE_R_OCTETS_OK: usize = 0x2E0;
}

// =============================================================================
// Bit Definitions
// =============================================================================

/// EIR / EIMR event bits
pub mod eir {
    /// Babbling receive error
    pub const BABR: u32 = 1 << 30;
    /// Babbling transmit error
    pub const BABT: u32 = 1 << 29;
    /// Graceful stop complete
    pub const GRA: u32 = 1 << 28;
    /// Transmit frame interrupt
    pub const TXF: u32 = 1 << 27;
    /// Transmit buffer interrupt
    pub const TXB: u32 = 1 << 26;
    /// Receive frame interrupt
    pub const RXF: u32 = 1 << 25;
    /// Receive buffer interrupt
    pub const RXB: u32 = 1 << 24;
    /// MII interrupt (management frame complete)
    pub const MII: u32 = 1 << 23;
    /// Ethernet bus error
    pub const EBERR: u32 = 1 << 22;
    /// Late collision
    pub const LC: u32 = 1 << 21;
    /// Collision retry limit
    pub const RL: u32 = 1 << 20;
    /// Transmit FIFO underrun
    pub const UN: u32 = 1 << 19;
    /// Payload receive error
    pub const PLR: u32 = 1 << 18;
    /// Node wakeup request
    pub const WAKEUP: u32 = 1 << 17;
    /// Transmit timestamp available
    pub const TS_AVAIL: u32 = 1 << 16;
    /// Timestamp timer wrapped
    pub const TS_TIMER: u32 = 1 << 15;

    /// Every event bit
    pub const ALL: u32 = 0x7FFF_8000;
}

/// ECR bits
pub mod ecr {
    /// Ethernet MAC reset (self clearing)
    pub const RESET: u32 = 1 << 0;
    /// Ethernet enable
    pub const ETHEREN: u32 = 1 << 1;
    /// Enhanced frame time-stamping and descriptor format
    pub const EN1588: u32 = 1 << 4;
    /// Descriptor byte swapping (little-endian descriptors)
    pub const DBSWP: u32 = 1 << 8;
}

/// RCR bits
pub mod rcr {
    /// Internal loopback
    pub const LOOP: u32 = 1 << 0;
    /// Disable receive on transmit (half duplex)
    pub const DRT: u32 = 1 << 1;
    /// Media independent interface mode (must be set)
    pub const MII_MODE: u32 = 1 << 2;
    /// Promiscuous mode
    pub const PROM: u32 = 1 << 3;
    /// Broadcast frame reject
    pub const BCREJ: u32 = 1 << 4;
    /// Flow control enable
    pub const FCE: u32 = 1 << 5;
    /// RMII mode enable
    pub const RMII_MODE: u32 = 1 << 8;
    /// 10 Mbit/s mode in RMII
    pub const RMII_10T: u32 = 1 << 9;
    /// Remove padding from received frames
    pub const PADEN: u32 = 1 << 12;
    /// Strip the received CRC
    pub const CRCFWD: u32 = 1 << 14;
    /// Maximum frame length shift
    pub const MAX_FL_SHIFT: u32 = 16;
    /// Maximum frame length mask
    pub const MAX_FL_MASK: u32 = 0x3FFF << 16;
    /// Payload length check disable
    pub const NLC: u32 = 1 << 30;
}

/// TCR bits
pub mod tcr {
    /// Graceful transmit stop
    pub const GTS: u32 = 1 << 0;
    /// Full-duplex enable
    pub const FDEN: u32 = 1 << 2;
    /// Set MAC address on transmit
    pub const ADDINS: u32 = 1 << 8;
    /// Forward frame from application with CRC
    pub const CRCFWD: u32 = 1 << 9;
}

/// MMFR fields
pub mod mmfr {
    /// Management frame data mask
    pub const DATA_MASK: u32 = 0xFFFF;
    /// Turnaround (must be 0b10)
    pub const TA: u32 = 0b10 << 16;
    /// Register address shift
    pub const RA_SHIFT: u32 = 18;
    /// PHY address shift
    pub const PA_SHIFT: u32 = 23;
    /// Write operation
    pub const OP_WRITE: u32 = 0b01 << 28;
    /// Read operation
    pub const OP_READ: u32 = 0b10 << 28;
    /// Operation field mask
    pub const OP_MASK: u32 = 0b11 << 28;
    /// Start of frame delimiter (clause 22)
    pub const ST: u32 = 0b01 << 30;
}

/// MSCR fields
pub mod mscr {
    /// MII speed shift
    pub const MII_SPEED_SHIFT: u32 = 1;
    /// MII speed mask
    pub const MII_SPEED_MASK: u32 = 0x3F << 1;
    /// Disable preamble
    pub const DIS_PRE: u32 = 1 << 7;
    /// Hold time shift
    pub const HOLDTIME_SHIFT: u32 = 8;
}

/// MIBC bits
pub mod mibc {
    /// Disable MIB logic
    pub const MIB_DIS: u32 = 1 << 31;
    /// MIB idle
    pub const MIB_IDLE: u32 = 1 << 30;
    /// MIB clear
    pub const MIB_CLEAR: u32 = 1 << 29;
}

/// TFWR bits
pub mod tfwr {
    /// Store and forward enable
    pub const STRFWD: u32 = 1 << 8;
}

/// RDAR/TDAR doorbell bit
pub const DESCRIPTOR_ACTIVE: u32 = 1 << 24;

/// ATCR bits
pub mod atcr {
    /// Enable timer
    pub const EN: u32 = 1 << 0;
    /// Enable one-shot offset event
    pub const OFFEN: u32 = 1 << 2;
    /// Reset timer on offset event
    pub const OFFRST: u32 = 1 << 3;
    /// Enable periodical event
    pub const PEREN: u32 = 1 << 4;
    /// Enable periodical event pin output
    pub const PINPER: u32 = 1 << 7;
    /// Reset timer (self clearing)
    pub const RESTART: u32 = 1 << 9;
    /// Capture timer value into ATVR (self clearing)
    pub const CAPTURE: u32 = 1 << 11;
    /// Enable timer slave mode
    pub const SLAVE: u32 = 1 << 13;
}

/// ATINC fields
pub mod atinc {
    /// Clock period increment mask
    pub const INC_MASK: u32 = 0x7F;
    /// Correction increment shift
    pub const INC_CORR_SHIFT: u32 = 8;
    /// Correction increment mask
    pub const INC_CORR_MASK: u32 = 0x7F << 8;
}

/// ATCOR correction counter mask
pub const ATCOR_MASK: u32 = 0x7FFF_FFFF;

/// PAUR type field (pause frame EtherType)
pub const PAUR_TYPE: u32 = 0x8808;

// =============================================================================
// Register Accessor
// =============================================================================

/// Typed access to one ENET register block.
pub struct EnetRegs<B: RegisterAccess> {
    bus: B,
}

impl<B: RegisterAccess> EnetRegs<B> {
    /// Wrap a raw register bus
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    /// The underlying register bus
    #[inline(always)]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    // Interrupts
    reg_rw!(eir, set_eir, EIR_OFFSET, "Interrupt Event register");
    reg_rw!(eimr, set_eimr, EIMR_OFFSET, "Interrupt Mask register");

    // Control
    reg_rw!(ecr, set_ecr, ECR_OFFSET, "Ethernet Control register");
    reg_rw!(rcr, set_rcr, RCR_OFFSET, "Receive Control register");
    reg_rw!(tcr, set_tcr, TCR_OFFSET, "Transmit Control register");
    reg_rw!(tfwr, set_tfwr, TFWR_OFFSET, "Transmit FIFO Watermark register");
    reg_rw!(mibc, set_mibc, MIBC_OFFSET, "MIB Control register");

    // Management bus
    reg_rw!(mmfr, set_mmfr, MMFR_OFFSET, "MII Management Frame register");
    reg_rw!(mscr, set_mscr, MSCR_OFFSET, "MII Speed Control register");

    // Addressing
    reg_rw!(palr, set_palr, PALR_OFFSET, "Physical Address Lower register");
    reg_rw!(paur, set_paur, PAUR_OFFSET, "Physical Address Upper register");
    reg_rw!(gaur, set_gaur, GAUR_OFFSET, "Group Address Upper register");
    reg_rw!(galr, set_galr, GALR_OFFSET, "Group Address Lower register");

    // Descriptor rings
    reg_rw!(rdsr, set_rdsr, RDSR_OFFSET, "Receive Descriptor Ring Start register");
    reg_rw!(tdsr, set_tdsr, TDSR_OFFSET, "Transmit Descriptor Ring Start register");
    reg_rw!(mrbr, set_mrbr, MRBR_OFFSET, "Maximum Receive Buffer Size register");
    reg_ro!(rdar, RDAR_OFFSET, "Receive Descriptor Active register");
    reg_ro!(tdar, TDAR_OFFSET, "Transmit Descriptor Active register");

    // 1588 timer
    reg_rw!(atcr, set_atcr, ATCR_OFFSET, "Adjustable Timer Control register");
    reg_rw!(atvr, set_atvr, ATVR_OFFSET, "Timer Value register");
    reg_rw!(atoff, set_atoff, ATOFF_OFFSET, "Timer Offset register");
    reg_rw!(atper, set_atper, ATPER_OFFSET, "Timer Period register");
    reg_rw!(atcor, set_atcor, ATCOR_OFFSET, "Timer Correction register");
    reg_rw!(atinc, set_atinc, ATINC_OFFSET, "Time-Stamping Clock Period register");

    reg_bit_ops!(
        enable_mac,
        disable_mac,
        ECR_OFFSET,
        ecr::ETHEREN,
        "MAC",
        "Enable",
        "Disable"
    );
    reg_bit_ops!(
        enable_promiscuous,
        disable_promiscuous,
        RCR_OFFSET,
        rcr::PROM,
        "promiscuous reception",
        "Enable",
        "Disable"
    );
    reg_bit_check!(is_mac_enabled, ECR_OFFSET, ecr::ETHEREN, "Check if the MAC is enabled");
    reg_bit_check!(
        is_reset_pending,
        ECR_OFFSET,
        ecr::RESET,
        "Check if a MAC reset is still in progress"
    );
    reg_bit_check!(
        is_tx_active,
        TDAR_OFFSET,
        DESCRIPTOR_ACTIVE,
        "Check if the transmit doorbell is still active"
    );
    reg_bit_check!(
        is_capture_pending,
        ATCR_OFFSET,
        atcr::CAPTURE,
        "Check if a timer capture is still in progress"
    );

    /// Notify the controller that receive descriptors are available
    #[inline(always)]
    pub fn ring_rx_doorbell(&self) {
        self.bus.write(RDAR_OFFSET, DESCRIPTOR_ACTIVE);
    }

    /// Notify the controller that transmit descriptors are ready
    #[inline(always)]
    pub fn ring_tx_doorbell(&self) {
        self.bus.write(TDAR_OFFSET, DESCRIPTOR_ACTIVE);
    }

    /// Read and clear the given event bits, returning which were pending.
    #[inline(always)]
    pub fn take_events(&self, mask: u32) -> u32 {
        let pending = self.bus.read(EIR_OFFSET) & mask;
        if pending != 0 {
            self.bus.write(EIR_OFFSET, pending);
        }
        pending
    }

    /// Check if the interrupt for the given event is unmasked
    #[inline(always)]
    pub fn is_event_enabled(&self, mask: u32) -> bool {
        (self.bus.read(EIMR_OFFSET) & mask) != 0
    }

    /// Read a statistics counter
    #[inline(always)]
    pub fn counter(&self, offset: usize) -> u32 {
        self.bus.read(offset)
    }

    /// Program the station address
    pub fn set_mac_address(&self, addr: &[u8; 6]) {
        let lower = u32::from_be_bytes([addr[0], addr[1], addr[2], addr[3]]);
        let upper = ((addr[4] as u32) << 24) | ((addr[5] as u32) << 16) | PAUR_TYPE;
        self.bus.write(PALR_OFFSET, lower);
        self.bus.write(PAUR_OFFSET, upper);
    }

    /// Read back the station address
    pub fn mac_address(&self) -> [u8; 6] {
        let lower = self.bus.read(PALR_OFFSET).to_be_bytes();
        let upper = self.bus.read(PAUR_OFFSET).to_be_bytes();
        [lower[0], lower[1], lower[2], lower[3], upper[0], upper[1]]
    }

    /// Program both group hash registers
    #[inline(always)]
    pub fn set_group_hash(&self, upper: u32, lower: u32) {
        self.bus.write(GAUR_OFFSET, upper);
        self.bus.write(GALR_OFFSET, lower);
    }

    /// Set the maximum receive frame length in RCR
    pub fn set_max_frame_len(&self, len: u16) {
        self.bus.modify(RCR_OFFSET, |v| {
            (v & !rcr::MAX_FL_MASK) | (((len as u32) << rcr::MAX_FL_SHIFT) & rcr::MAX_FL_MASK)
        });
    }

    /// Program the nominal and corrected timer increments
    pub fn set_timer_increment(&self, inc: u32, corrected: u32) {
        self.bus.write(
            ATINC_OFFSET,
            (inc & atinc::INC_MASK) | ((corrected << atinc::INC_CORR_SHIFT) & atinc::INC_CORR_MASK),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegisters;

    #[test]
    fn mac_address_round_trips_through_palr_paur() {
        let mock = MockRegisters::new();
        let regs = EnetRegs::new(&mock);
        regs.set_mac_address(&[0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);

        assert_eq!(mock.read(PALR_OFFSET), 0x0211_2233);
        assert_eq!(mock.read(PAUR_OFFSET), 0x4455_8808);
        assert_eq!(regs.mac_address(), [0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn take_events_clears_only_requested_bits() {
        let mock = MockRegisters::new();
        mock.raise_events(eir::RXF | eir::TXF);
        let regs = EnetRegs::new(&mock);

        assert_eq!(regs.take_events(eir::RXF), eir::RXF);
        assert_eq!(regs.eir(), eir::TXF);
        assert_eq!(regs.take_events(eir::RXF), 0);
    }

    #[test]
    fn max_frame_len_preserves_other_rcr_bits() {
        let mock = MockRegisters::new();
        let regs = EnetRegs::new(&mock);
        regs.set_rcr(rcr::MII_MODE | rcr::RMII_MODE);
        regs.set_max_frame_len(1522);

        assert_eq!(regs.rcr(), rcr::MII_MODE | rcr::RMII_MODE | (1522 << 16));
    }

    #[test]
    fn timer_increment_fields() {
        let mock = MockRegisters::new();
        let regs = EnetRegs::new(&mock);
        regs.set_timer_increment(40, 41);
        assert_eq!(regs.atinc(), 40 | (41 << 8));
    }

    #[test]
    fn mac_enable_bit_ops() {
        let mock = MockRegisters::new();
        let regs = EnetRegs::new(&mock);
        assert!(!regs.is_mac_enabled());
        regs.enable_mac();
        assert!(regs.is_mac_enabled());
        regs.disable_mac();
        assert!(!regs.is_mac_enabled());
    }
}
