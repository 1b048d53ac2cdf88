//! Configuration types for the ENET driver

use super::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    DEFAULT_MAC_ADDR, DEFAULT_MODULE_CLOCK_HZ, DEFAULT_TIMER_INCREMENT, ETH_HEADER_SIZE,
    MAX_FL_LIMIT, MAX_FRAME_SIZE, MAX_TIMER_INCREMENT, NANOS_PER_SECOND, RESET_TIMEOUT_US,
};

/// Ethernet link speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps
    Mbps10,
    /// 100 Mbps
    #[default]
    Mbps100,
}

/// Ethernet duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    #[default]
    Full,
}

/// PHY interface type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyInterface {
    /// Media Independent Interface
    Mii,
    /// Reduced Media Independent Interface
    #[default]
    Rmii,
}

/// Complete ENET configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnetConfig {
    /// Index reported in upper-layer and diagnostic callbacks
    pub controller_index: u8,
    /// MAC address (6 bytes)
    pub mac_address: [u8; 6],
    /// PHY interface type (MII or RMII)
    pub phy_interface: PhyInterface,
    /// Link speed programmed into RCR (RMII 10 Mbps mode)
    pub speed: Speed,
    /// Duplex mode programmed into TCR
    pub duplex: Duplex,
    /// Deliver received frames from the RX interrupt instead of polling
    pub rx_interrupt: bool,
    /// Deliver transmit confirmations from the TX interrupt
    pub tx_interrupt: bool,
    /// Enable promiscuous mode (receive all frames)
    pub promiscuous: bool,
    /// Allow frames to span several transmit buffers
    pub multi_buffer_tx: bool,
    /// Reassemble receive frames that wrap past the ring end
    pub rx_wraparound: bool,
    /// Largest accepted receive frame, header and CRC included
    pub max_frame_len: u16,
    /// Module clock feeding the MDC divider, in Hz
    pub module_clock_hz: u32,
    /// Run the 1588 timer and attach timestamps to frames
    pub timestamping: bool,
    /// Nanoseconds added to the 1588 timer per tick
    pub timer_increment: u8,
    /// MAC reset timeout in microseconds
    pub reset_timeout_us: u32,
}

impl Default for EnetConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl EnetConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            controller_index: 0,
            mac_address: DEFAULT_MAC_ADDR,
            phy_interface: PhyInterface::Rmii,
            speed: Speed::Mbps100,
            duplex: Duplex::Full,
            rx_interrupt: true,
            tx_interrupt: true,
            promiscuous: false,
            multi_buffer_tx: false,
            rx_wraparound: true,
            max_frame_len: MAX_FRAME_SIZE as u16,
            module_clock_hz: DEFAULT_MODULE_CLOCK_HZ,
            timestamping: false,
            timer_increment: DEFAULT_TIMER_INCREMENT,
            reset_timeout_us: RESET_TIMEOUT_US,
        }
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    /// Set the controller index
    #[must_use]
    pub const fn with_controller_index(mut self, index: u8) -> Self {
        self.controller_index = index;
        self
    }

    /// Set the MAC address
    ///
    /// If not set, a default locally-administered address
    /// (02:00:00:00:00:01) is used.
    #[must_use]
    pub const fn with_mac_address(mut self, addr: [u8; 6]) -> Self {
        self.mac_address = addr;
        self
    }

    /// Set the PHY interface type
    #[must_use]
    pub const fn with_phy_interface(mut self, interface: PhyInterface) -> Self {
        self.phy_interface = interface;
        self
    }

    /// Set the link speed
    #[must_use]
    pub const fn with_speed(mut self, speed: Speed) -> Self {
        self.speed = speed;
        self
    }

    /// Set the duplex mode
    #[must_use]
    pub const fn with_duplex(mut self, duplex: Duplex) -> Self {
        self.duplex = duplex;
        self
    }

    /// Enable or disable interrupt-driven reception
    #[must_use]
    pub const fn with_rx_interrupt(mut self, enabled: bool) -> Self {
        self.rx_interrupt = enabled;
        self
    }

    /// Enable or disable interrupt-driven transmit confirmation
    #[must_use]
    pub const fn with_tx_interrupt(mut self, enabled: bool) -> Self {
        self.tx_interrupt = enabled;
        self
    }

    /// Enable or disable promiscuous mode
    #[must_use]
    pub const fn with_promiscuous(mut self, enabled: bool) -> Self {
        self.promiscuous = enabled;
        self
    }

    /// Allow transmit frames to span several buffers
    #[must_use]
    pub const fn with_multi_buffer_tx(mut self, enabled: bool) -> Self {
        self.multi_buffer_tx = enabled;
        self
    }

    /// Enable or disable reassembly of frames wrapping the RX ring end
    #[must_use]
    pub const fn with_rx_wraparound(mut self, enabled: bool) -> Self {
        self.rx_wraparound = enabled;
        self
    }

    /// Set the largest accepted receive frame length
    #[must_use]
    pub const fn with_max_frame_len(mut self, len: u16) -> Self {
        self.max_frame_len = len;
        self
    }

    /// Set the module clock frequency used to derive MDC
    #[must_use]
    pub const fn with_module_clock_hz(mut self, hz: u32) -> Self {
        self.module_clock_hz = hz;
        self
    }

    /// Enable the 1588 timer with the given per-tick increment
    #[must_use]
    pub const fn with_timestamping(mut self, increment: u8) -> Self {
        self.timestamping = true;
        self.timer_increment = increment;
        self
    }

    /// Set the MAC reset timeout
    #[must_use]
    pub const fn with_reset_timeout_us(mut self, timeout_us: u32) -> Self {
        self.reset_timeout_us = timeout_us;
        self
    }

    /// 1588 timer ticks per second.
    #[must_use]
    pub const fn timer_tick_hz(&self) -> u32 {
        if self.timer_increment == 0 {
            0
        } else {
            NANOS_PER_SECOND / self.timer_increment as u32
        }
    }

    /// Check the configuration for values the controller cannot use.
    pub fn validate(&self) -> ConfigResult<()> {
        // Group bit set: not a station address.
        if self.mac_address[0] & 0x01 != 0 {
            return Err(ConfigError::InvalidConfig);
        }
        let max = self.max_frame_len as usize;
        if max <= ETH_HEADER_SIZE || max > MAX_FL_LIMIT {
            return Err(ConfigError::InvalidConfig);
        }
        if self.module_clock_hz == 0 || self.reset_timeout_us == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        if self.timestamping
            && (self.timer_increment == 0 || self.timer_increment > MAX_TIMER_INCREMENT)
        {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialized
    #[default]
    Uninitialized,
    /// Initialized; see [`Mode`] for whether frames flow
    Initialized,
}

/// Controller run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// MAC disabled
    #[default]
    Down,
    /// MAC enabled, rings active
    Active,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = EnetConfig::new();

        assert_eq!(config.mac_address, DEFAULT_MAC_ADDR);
        assert_eq!(config.phy_interface, PhyInterface::Rmii);
        assert_eq!(config.max_frame_len, 1522);
        assert!(config.rx_interrupt);
        assert!(config.rx_wraparound);
        assert!(!config.multi_buffer_tx);
        assert!(!config.timestamping);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_chaining() {
        let mac = [0x02, 0x00, 0x00, 0xAA, 0xBB, 0xCC];
        let config = EnetConfig::new()
            .with_controller_index(1)
            .with_mac_address(mac)
            .with_phy_interface(PhyInterface::Mii)
            .with_speed(Speed::Mbps10)
            .with_duplex(Duplex::Half)
            .with_rx_interrupt(false)
            .with_promiscuous(true)
            .with_multi_buffer_tx(true)
            .with_timestamping(20);

        assert_eq!(config.controller_index, 1);
        assert_eq!(config.mac_address, mac);
        assert_eq!(config.phy_interface, PhyInterface::Mii);
        assert_eq!(config.speed, Speed::Mbps10);
        assert_eq!(config.duplex, Duplex::Half);
        assert!(!config.rx_interrupt);
        assert!(config.promiscuous);
        assert!(config.multi_buffer_tx);
        assert!(config.timestamping);
        assert_eq!(config.timer_tick_hz(), 50_000_000);
    }

    #[test]
    fn validate_rejects_group_mac() {
        let config = EnetConfig::new().with_mac_address([0x01, 0, 0x5E, 0, 0, 1]);
        assert_eq!(config.validate(), Err(ConfigError::InvalidConfig));
    }

    #[test]
    fn validate_rejects_frame_length_out_of_range() {
        assert!(EnetConfig::new().with_max_frame_len(14).validate().is_err());
        assert!(EnetConfig::new().with_max_frame_len(0x4000).validate().is_err());
        assert!(EnetConfig::new().with_max_frame_len(0x3FFF).validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_timer_increment() {
        assert!(EnetConfig::new().with_timestamping(0).validate().is_err());
        assert!(EnetConfig::new().with_timestamping(128).validate().is_err());
        assert!(EnetConfig::new().with_timestamping(127).validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_clock() {
        assert!(EnetConfig::new().with_module_clock_hz(0).validate().is_err());
        assert!(EnetConfig::new().with_reset_timeout_us(0).validate().is_err());
    }

    #[test]
    fn state_and_mode_defaults() {
        assert_eq!(State::default(), State::Uninitialized);
        assert_eq!(Mode::default(), Mode::Down);
    }
}
