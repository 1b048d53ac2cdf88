//! MDIO (Management Data Input/Output) HAL
//!
//! The ENET controller drives the PHY management bus through MMFR; the MDC
//! frequency comes from the module clock divided per MSCR. This module
//! provides the [`MdioBus`] abstraction and the divider calculation.

use crate::driver::enet::Enet;
use crate::driver::error::Result;
use crate::internal::constants::{MDC_MAX_FREQ_HZ, MDIO_HOLD_TIME};
use crate::internal::register::RegisterAccess;
use crate::internal::register::enet::mscr;

/// Largest MII_SPEED field value
const MAX_MII_SPEED: u32 = 0x3F;

/// MSCR value for the given module clock.
///
/// MDC runs at `clock / ((MII_SPEED + 1) * 2)`; the smallest divider that
/// keeps MDC at or below 2.5 MHz is chosen.
pub const fn mscr_value(module_clock_hz: u32) -> u32 {
    let speed = module_clock_hz.div_ceil(2 * MDC_MAX_FREQ_HZ);
    let speed = if speed == 0 { 0 } else { speed - 1 };
    let speed = if speed > MAX_MII_SPEED { MAX_MII_SPEED } else { speed };
    ((speed << mscr::MII_SPEED_SHIFT) & mscr::MII_SPEED_MASK) | (MDIO_HOLD_TIME << mscr::HOLDTIME_SHIFT)
}

/// Resulting MDC frequency for an MSCR value and module clock
pub const fn mdc_frequency_hz(mscr_value: u32, module_clock_hz: u32) -> u32 {
    let speed = (mscr_value & mscr::MII_SPEED_MASK) >> mscr::MII_SPEED_SHIFT;
    module_clock_hz / ((speed + 1) * 2)
}

// =============================================================================
// MDIO Bus Trait
// =============================================================================

/// Trait for MDIO bus operations
///
/// Code that talks to a PHY is written against this trait so it works with
/// any management bus backend, including test doubles.
pub trait MdioBus {
    /// Read a PHY register
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16>;

    /// Write a PHY register
    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()>;
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize> MdioBus
    for Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    fn read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.mii_read(phy_addr, reg_addr)
    }

    fn write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.mii_write(phy_addr, reg_addr, value)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::config::EnetConfig;
    use crate::driver::error::{ConfigError, IoError};
    use crate::internal::register::enet::{MMFR_OFFSET, mmfr};
    use crate::testing::{MockDelay, MockRegisters};

    #[test]
    fn mscr_keeps_mdc_within_limit() {
        for clock in [25_000_000, 66_000_000, 132_000_000, 150_000_000, 240_000_000] {
            let value = mscr_value(clock);
            assert!(mdc_frequency_hz(value, clock) <= MDC_MAX_FREQ_HZ, "clock {clock}");
        }
    }

    #[test]
    fn mscr_for_150_mhz() {
        let value = mscr_value(150_000_000);
        assert_eq!((value & mscr::MII_SPEED_MASK) >> mscr::MII_SPEED_SHIFT, 29);
        assert_eq!(value >> mscr::HOLDTIME_SHIFT, MDIO_HOLD_TIME);
        assert_eq!(mdc_frequency_hz(value, 150_000_000), 2_500_000);
    }

    #[test]
    fn mscr_clamps_divider() {
        let value = mscr_value(u32::MAX);
        assert_eq!((value & mscr::MII_SPEED_MASK) >> mscr::MII_SPEED_SHIFT, MAX_MII_SPEED);
    }

    /// Reads a 32-bit identifier from two registers through any bus
    fn read_id<M: MdioBus>(bus: &mut M, phy_addr: u8) -> Result<u32> {
        let high = bus.read(phy_addr, 2)? as u32;
        let low = bus.read(phy_addr, 3)? as u32;
        Ok((high << 16) | low)
    }

    #[test]
    fn enet_is_an_mdio_bus() {
        let mock = MockRegisters::new();
        let mut enet: Enet<&MockRegisters, 4, 4, 256> = Enet::new(&mock);
        enet.init(EnetConfig::new(), MockDelay::new()).unwrap();
        mock.set_mii_response(0x0007);

        assert_eq!(read_id(&mut enet, 0), Ok(0x0007_0007));
        MdioBus::write(&mut enet, 0, 0, 0x8000).unwrap();
        let last = *mock.writes_to(MMFR_OFFSET).last().unwrap();
        assert_eq!(last & mmfr::OP_MASK, mmfr::OP_WRITE);
        assert_eq!(last & mmfr::DATA_MASK, 0x8000);
    }

    #[test]
    fn bus_errors_propagate() {
        let mock = MockRegisters::new();
        let mut enet: Enet<&MockRegisters, 4, 4, 256> = Enet::new(&mock);
        enet.init(EnetConfig::new(), MockDelay::new()).unwrap();
        mock.set_mii_stuck(true);

        assert_eq!(read_id(&mut enet, 1), Err(IoError::Timeout.into()));
        assert_eq!(
            MdioBus::read(&mut enet, 32, 0),
            Err(ConfigError::InvalidConfig.into())
        );
    }
}
