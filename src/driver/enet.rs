//! Core ENET driver implementation.
//!
//! This module contains the main [`Enet`] structure and its lifecycle:
//!
//! - Initialization and deinitialization
//! - Run mode control
//! - MAC address and promiscuous mode
//! - MII management frames
//!
//! Frame reception lives in [`rx`](super::rx), transmission in
//! [`tx`](super::tx), multicast filtering in [`filtering`](super::filtering),
//! the 1588 clock in [`time`](super::time), interrupt and periodic entry
//! points in [`interrupt`](super::interrupt) and counters in
//! [`stats`](super::stats).

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

use super::config::{Duplex, EnetConfig, Mode, PhyInterface, Speed, State};
use super::error::{ConfigError, IoError, Result};
use crate::hal::mdio::mscr_value;
use crate::internal::constants::{
    ETH_HEADER_SIZE, MAX_FL_LIMIT, MII_SPIN_LIMIT, MULTICAST_POOL_SIZE, RESET_POLL_INTERVAL_US,
    RX_BUFFER_GRANULE,
};
use crate::internal::dma::{RxRing, TxRing};
use crate::internal::multicast::MulticastFilter;
use crate::internal::ptp::TimeStamp;
use crate::internal::register::RegisterAccess;
use crate::internal::register::enet::{EnetRegs, ecr, eir, mibc, mmfr, rcr, tcr, tfwr};

/// Largest PHY or register address on the management bus
const MAX_MII_ADDR: u8 = 31;

// =============================================================================
// ENET Driver
// =============================================================================

/// ENET MAC controller driver.
///
/// One instance per controller. All ring memory lives inside the value, so
/// it must not move after [`Enet::init`]: place it in a `static` or
/// otherwise pin it before initializing.
///
/// # Type Parameters
/// * `B` - Register bus ([`Mmio`](crate::Mmio) on hardware)
/// * `RX_BUFS` - Number of receive buffers
/// * `TX_BUFS` - Number of transmit buffers
/// * `BUF_SIZE` - Size of each buffer in bytes (multiple of 16)
///
/// # Example
/// ```ignore
/// static mut ENET: Enet<Mmio, 8, 8, 1536> = Enet::new(unsafe { Mmio::new(0x402D_8000) });
///
/// let enet = unsafe { &mut *core::ptr::addr_of_mut!(ENET) };
/// enet.init(EnetConfig::new().with_mac_address(mac), delay)?;
/// enet.set_mode(Mode::Active)?;
/// ```
pub struct Enet<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
{
    /// Register block
    pub(super) regs: EnetRegs<B>,
    /// Receive ring and arena
    pub(super) rx: RxRing<RX_BUFS, BUF_SIZE>,
    /// Transmit ring and buffer bookkeeping
    pub(super) tx: TxRing<TX_BUFS, BUF_SIZE>,
    /// Exact multicast pool and group hash
    pub(super) multicast: MulticastFilter<MULTICAST_POOL_SIZE>,
    /// Software-extended 1588 time, shared with the timer interrupt
    pub(super) time: Mutex<Cell<TimeStamp>>,
    /// Active configuration
    pub(super) config: EnetConfig,
    /// Receive all frames, bypassing the multicast pool
    pub(super) promiscuous: bool,
    /// Mode last reported to the upper layer
    pub(super) last_mode: Mode,
    /// Last reset or management frame did not complete
    pub(super) access_failed: bool,
    state: State,
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Create a new driver instance over a register bus.
    ///
    /// This is a const function suitable for static initialization.
    /// The controller starts in the `Uninitialized` state.
    pub const fn new(bus: B) -> Self {
        Self {
            regs: EnetRegs::new(bus),
            rx: RxRing::new(),
            tx: TxRing::new(),
            multicast: MulticastFilter::new(),
            time: Mutex::new(Cell::new(TimeStamp::ZERO)),
            config: EnetConfig::new(),
            promiscuous: false,
            last_mode: Mode::Down,
            access_failed: false,
            state: State::Uninitialized,
        }
    }

    /// True if the buffer geometry is usable by the controller
    pub const fn geometry_valid() -> bool {
        RX_BUFS >= 2
            && TX_BUFS >= 2
            && BUF_SIZE > ETH_HEADER_SIZE
            && BUF_SIZE % RX_BUFFER_GRANULE == 0
            && BUF_SIZE <= MAX_FL_LIMIT
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Get the lifecycle state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// True once [`Enet::init`] succeeded
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.state == State::Initialized
    }

    /// Get the active configuration
    #[inline(always)]
    pub fn config(&self) -> &EnetConfig {
        &self.config
    }

    /// Index reported in callbacks
    #[inline(always)]
    pub fn controller_index(&self) -> u8 {
        self.config.controller_index
    }

    pub(super) fn ensure_initialized(&self) -> Result<()> {
        if self.state == State::Initialized {
            Ok(())
        } else {
            Err(ConfigError::NotInitialized.into())
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize the controller with the given configuration
    ///
    /// Resets the MAC, programs receive/transmit control, the station
    /// address and the MDC divider, sets up both descriptor rings and,
    /// if enabled, the 1588 timer. The controller is left in
    /// [`Mode::Down`]; call [`Enet::set_mode`] to start it.
    ///
    /// # Errors
    /// - `AlreadyInitialized` - call [`Enet::deinit`] first
    /// - `InvalidConfig` - configuration or buffer geometry rejected
    /// - `ResetFailed` - MAC reset did not complete
    pub fn init<D: DelayNs>(&mut self, config: EnetConfig, mut delay: D) -> Result<()> {
        if self.state != State::Uninitialized {
            return Err(ConfigError::AlreadyInitialized.into());
        }
        config.validate()?;
        if !Self::geometry_valid() {
            return Err(ConfigError::InvalidConfig.into());
        }

        self.reset_mac(&mut delay, config.reset_timeout_us)?;

        self.regs.set_eimr(0);
        self.regs.set_eir(eir::ALL);
        self.regs.set_mscr(mscr_value(config.module_clock_hz));
        self.regs.set_rcr(Self::rcr_value(&config));
        self.regs.set_tcr(match config.duplex {
            Duplex::Full => tcr::FDEN,
            Duplex::Half => 0,
        });
        self.regs.set_mac_address(&config.mac_address);
        self.multicast = MulticastFilter::new();
        self.regs.set_group_hash(0, 0);
        self.regs.set_tfwr(tfwr::STRFWD);
        self.regs.set_mrbr(BUF_SIZE as u32);

        self.rx.init(config.rx_interrupt);
        self.tx.init();
        self.regs.set_rdsr(self.rx.base_addr_u32());
        self.regs.set_tdsr(self.tx.base_addr_u32());

        if config.timestamping {
            self.start_timer(config.timer_increment);
        }

        self.regs.set_mibc(mibc::MIB_DIS | mibc::MIB_CLEAR);
        self.regs.set_mibc(0);

        self.regs.set_ecr(ecr::DBSWP | ecr::EN1588);
        self.regs.set_eimr(Self::interrupt_mask(&config));

        self.promiscuous = config.promiscuous;
        self.config = config;
        self.last_mode = Mode::Down;
        self.state = State::Initialized;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "ENET{} initialized: {} RX x {} TX buffers of {} bytes",
            self.config.controller_index,
            RX_BUFS,
            TX_BUFS,
            BUF_SIZE
        );

        Ok(())
    }

    fn rcr_value(config: &EnetConfig) -> u32 {
        let mut value = ((config.max_frame_len as u32) << rcr::MAX_FL_SHIFT) & rcr::MAX_FL_MASK;
        value |= rcr::MII_MODE | rcr::PADEN | rcr::CRCFWD;
        if config.phy_interface == PhyInterface::Rmii {
            value |= rcr::RMII_MODE;
            if config.speed == Speed::Mbps10 {
                value |= rcr::RMII_10T;
            }
        }
        if config.promiscuous {
            value |= rcr::PROM;
        }
        if config.duplex == Duplex::Half {
            value |= rcr::DRT;
        }
        value
    }

    fn interrupt_mask(config: &EnetConfig) -> u32 {
        let mut mask = 0;
        if config.rx_interrupt {
            mask |= eir::RXF;
        }
        if config.tx_interrupt {
            mask |= eir::TXF;
        }
        if config.timestamping {
            mask |= eir::TS_TIMER;
        }
        mask
    }

    /// Reset the MAC and wait for the reset bit to clear
    fn reset_mac<D: DelayNs>(&mut self, delay: &mut D, timeout_us: u32) -> Result<()> {
        self.regs.set_ecr(ecr::RESET);

        let max_iterations = (timeout_us / RESET_POLL_INTERVAL_US).max(1);
        for _ in 0..max_iterations {
            if !self.regs.is_reset_pending() {
                self.access_failed = false;
                return Ok(());
            }
            delay.delay_us(RESET_POLL_INTERVAL_US);
        }

        self.access_failed = true;
        #[cfg(feature = "defmt")]
        defmt::warn!("ENET reset did not complete within {} us", timeout_us);
        Err(ConfigError::ResetFailed.into())
    }

    /// Stop the controller and return it to the `Uninitialized` state.
    ///
    /// Outstanding transmit buffers are dropped without confirmation.
    pub fn deinit(&mut self) -> Result<()> {
        self.ensure_initialized()?;

        self.regs.disable_mac();
        self.regs.set_eimr(0);
        self.regs.set_eir(eir::ALL);
        self.regs.set_atcr(0);
        self.tx.init();
        self.multicast = MulticastFilter::new();
        critical_section::with(|cs| self.time.borrow(cs).set(TimeStamp::ZERO));

        self.last_mode = Mode::Down;
        self.state = State::Uninitialized;
        Ok(())
    }

    // =========================================================================
    // Run Mode
    // =========================================================================

    /// Start or stop the controller.
    ///
    /// Going down disables the MAC and resets both rings; borrowed and
    /// in-flight transmit buffers are released without confirmation. The
    /// upper layer learns about the change from
    /// [`Enet::main_function`](super::interrupt).
    pub fn set_mode(&mut self, mode: Mode) -> Result<()> {
        self.ensure_initialized()?;

        match mode {
            Mode::Active => {
                if self.regs.is_mac_enabled() {
                    return Ok(());
                }
                self.regs.enable_mac();
                self.regs.ring_rx_doorbell();
            }
            Mode::Down => {
                self.regs.disable_mac();
                self.rx.init(self.config.rx_interrupt);
                self.tx.init();
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!("ENET{} mode {}", self.config.controller_index, mode);

        Ok(())
    }

    /// Current run mode as reported by the hardware enable bit
    pub fn mode(&self) -> Mode {
        if self.regs.is_mac_enabled() {
            Mode::Active
        } else {
            Mode::Down
        }
    }

    // =========================================================================
    // Addressing
    // =========================================================================

    /// Program a new station address
    ///
    /// # Errors
    /// - `NotInitialized` - called before [`Enet::init`]
    /// - `InvalidConfig` - `addr` is a group address
    pub fn set_mac_address(&mut self, addr: &[u8; 6]) -> Result<()> {
        self.ensure_initialized()?;
        if addr[0] & 0x01 != 0 {
            return Err(ConfigError::InvalidConfig.into());
        }
        self.regs.set_mac_address(addr);
        self.config.mac_address = *addr;
        Ok(())
    }

    /// Station address as programmed in the controller
    pub fn mac_address(&self) -> [u8; 6] {
        self.regs.mac_address()
    }

    /// Receive every frame regardless of destination
    pub fn set_promiscuous(&mut self, enable: bool) {
        if enable {
            self.regs.enable_promiscuous();
        } else {
            self.regs.disable_promiscuous();
        }
        self.promiscuous = enable;
    }

    /// True if promiscuous reception is enabled
    #[inline(always)]
    pub fn is_promiscuous(&self) -> bool {
        self.promiscuous
    }

    // =========================================================================
    // MII Management
    // =========================================================================

    /// Read a PHY register over the management bus
    ///
    /// # Errors
    /// - `InvalidConfig` - PHY or register address above 31
    /// - `Timeout` - management frame did not complete
    pub fn mii_read(&mut self, phy_addr: u8, reg_addr: u8) -> Result<u16> {
        self.ensure_initialized()?;
        let frame = Self::mii_frame(phy_addr, reg_addr)? | mmfr::OP_READ;

        self.regs.take_events(eir::MII);
        self.regs.set_mmfr(frame);
        self.wait_mii()?;

        Ok((self.regs.mmfr() & mmfr::DATA_MASK) as u16)
    }

    /// Write a PHY register over the management bus
    ///
    /// # Errors
    /// - `InvalidConfig` - PHY or register address above 31
    /// - `Timeout` - management frame did not complete
    pub fn mii_write(&mut self, phy_addr: u8, reg_addr: u8, value: u16) -> Result<()> {
        self.ensure_initialized()?;
        let frame = Self::mii_frame(phy_addr, reg_addr)? | mmfr::OP_WRITE | value as u32;

        self.regs.take_events(eir::MII);
        self.regs.set_mmfr(frame);
        self.wait_mii()
    }

    fn mii_frame(phy_addr: u8, reg_addr: u8) -> Result<u32> {
        if phy_addr > MAX_MII_ADDR || reg_addr > MAX_MII_ADDR {
            return Err(ConfigError::InvalidConfig.into());
        }
        Ok(mmfr::ST
            | mmfr::TA
            | ((phy_addr as u32) << mmfr::PA_SHIFT)
            | ((reg_addr as u32) << mmfr::RA_SHIFT))
    }

    /// Spin until the management frame completes
    fn wait_mii(&mut self) -> Result<()> {
        for _ in 0..MII_SPIN_LIMIT {
            if self.regs.take_events(eir::MII) != 0 {
                self.access_failed = false;
                return Ok(());
            }
            core::hint::spin_loop();
        }

        self.access_failed = true;
        #[cfg(feature = "defmt")]
        defmt::warn!("ENET{} MII timeout", self.config.controller_index);
        Err(IoError::Timeout.into())
    }

    /// Get total memory used by this driver instance
    pub const fn memory_usage() -> usize {
        core::mem::size_of::<Self>()
    }
}

// Safety: descriptor and buffer memory is only touched through volatile
// cells or `&mut self`; state shared with interrupt handlers sits behind
// critical-section mutexes.
unsafe impl<B: RegisterAccess + Send, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Send for Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
}
