//! Multicast filtering for the ENET controller.
//!
//! This module extends [`Enet`] with the receive multicast filter:
//!
//! - **Group hash** - 64-bit hash in GAUR/GALR, programmed from the CRC-32
//!   of every subscribed address. Collisions are possible, so the hash only
//!   narrows what the controller accepts.
//! - **Exact pool** - A fixed pool of subscribed addresses checked in
//!   software for every received multicast frame.
//!
//! The broadcast address opens the filter completely and the all-zeros
//! address closes it. When the pool is full, the filter fails open: every
//! multicast frame is accepted until the filter is closed.

use super::enet::Enet;
use super::error::{IoError, Result};
use crate::internal::constants::MAC_ADDR_LEN;
use crate::internal::multicast::FilterUpdate;
use crate::internal::register::RegisterAccess;

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Subscribe to a multicast address.
    ///
    /// Adding an address twice has no effect.
    ///
    /// # Example
    /// ```ignore
    /// // Accept frames addressed to the all-hosts group
    /// enet.add_multicast(&[0x01, 0x00, 0x5E, 0x00, 0x00, 0x01])?;
    /// ```
    pub fn add_multicast(&mut self, addr: &[u8; MAC_ADDR_LEN]) -> Result<()> {
        self.ensure_initialized()?;
        let update = self.multicast.add(addr);

        if update == FilterUpdate::Overflowed {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "ENET{} multicast pool full, accepting all groups",
                self.config.controller_index
            );
        }
        if update != FilterUpdate::Unchanged {
            self.write_group_hash();
        }
        Ok(())
    }

    /// Unsubscribe from a multicast address.
    ///
    /// # Errors
    /// - `NotFound` - address was not subscribed
    pub fn remove_multicast(&mut self, addr: &[u8; MAC_ADDR_LEN]) -> Result<()> {
        self.ensure_initialized()?;
        if !self.multicast.remove(addr) {
            return Err(IoError::NotFound.into());
        }
        self.write_group_hash();
        Ok(())
    }

    /// Number of subscribed multicast addresses
    #[inline]
    pub fn multicast_count(&self) -> usize {
        self.multicast.active_count()
    }

    /// True if a multicast frame to `addr` would be delivered
    #[inline]
    pub fn multicast_accepts(&self, addr: &[u8; MAC_ADDR_LEN]) -> bool {
        self.promiscuous || self.multicast.accepts(addr)
    }

    /// Current GAUR/GALR contents as one 64-bit value (upper word high)
    pub fn group_hash(&self) -> u64 {
        ((self.regs.gaur() as u64) << 32) | self.regs.galr() as u64
    }

    fn write_group_hash(&self) {
        if self.multicast.is_overflowed() {
            self.regs.set_group_hash(u32::MAX, u32::MAX);
        } else {
            self.regs
                .set_group_hash(self.multicast.hash_upper(), self.multicast.hash_lower());
        }
    }
}
