//! Multicast address pool and group hash computation.
//!
//! The controller filters multicast frames through two 32-bit group hash
//! registers (GAUR/GALR). Hash collisions make that filter imprecise, so the
//! driver also keeps the exact set of subscribed addresses and checks
//! received multicast frames against it.

use crate::internal::constants::{BROADCAST_ADDR, MAC_ADDR_LEN};

const CRC32_POLY: u32 = 0xEDB8_8320;

/// Reflected CRC-32 of a MAC address as the controller computes it for
/// group hashing. No final inversion is applied.
#[must_use]
pub const fn crc32(addr: &[u8; MAC_ADDR_LEN]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    let mut i = 0;
    while i < MAC_ADDR_LEN {
        crc ^= addr[i] as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ CRC32_POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        i += 1;
    }
    crc
}

/// Map a hash to its group register bit.
///
/// Returns `(upper, bit)`: bit 31 of the hash selects GAUR over GALR and
/// bits 30..26 select the bit within the register.
#[inline(always)]
#[must_use]
pub const fn hash_bit(hash: u32) -> (bool, u32) {
    ((hash >> 31) != 0, (hash >> 26) & 0x1F)
}

const ALL_ZEROS: [u8; MAC_ADDR_LEN] = [0; MAC_ADDR_LEN];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PoolEntry {
    active: bool,
    addr: [u8; MAC_ADDR_LEN],
}

impl PoolEntry {
    const EMPTY: Self = Self {
        active: false,
        addr: ALL_ZEROS,
    };
}

/// Result of adding an address to the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterUpdate {
    /// Address was already present
    Unchanged,
    /// Address added to the pool and the hash
    Inserted,
    /// All multicast traffic accepted
    Opened,
    /// Pool emptied and all multicast traffic rejected
    Closed,
    /// Pool full; filtering disabled until the next close
    Overflowed,
}

/// Exact multicast pool with the matching group hash register values.
#[derive(Debug, Clone)]
pub struct MulticastFilter<const N: usize> {
    entries: [PoolEntry; N],
    active: usize,
    fully_open: bool,
    overflow: bool,
    hash_upper: u32,
    hash_lower: u32,
}

impl<const N: usize> MulticastFilter<N> {
    /// Create an empty, closed filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [PoolEntry::EMPTY; N],
            active: 0,
            fully_open: false,
            overflow: false,
            hash_upper: 0,
            hash_lower: 0,
        }
    }

    /// Number of addresses in the pool.
    #[inline(always)]
    pub const fn active_count(&self) -> usize {
        self.active
    }

    /// All multicast traffic accepted on request.
    #[cfg(test)]
    pub const fn is_fully_open(&self) -> bool {
        self.fully_open
    }

    /// Pool ran out of room.
    #[inline(always)]
    pub const fn is_overflowed(&self) -> bool {
        self.overflow
    }

    /// Value for GAUR.
    #[inline(always)]
    pub const fn hash_upper(&self) -> u32 {
        self.hash_upper
    }

    /// Value for GALR.
    #[inline(always)]
    pub const fn hash_lower(&self) -> u32 {
        self.hash_lower
    }

    /// True if a frame sent to `addr` should be delivered.
    pub fn accepts(&self, addr: &[u8; MAC_ADDR_LEN]) -> bool {
        if self.overflow || self.fully_open {
            return true;
        }
        let mut seen = 0;
        for entry in &self.entries {
            if seen == self.active {
                break;
            }
            if entry.active {
                if entry.addr == *addr {
                    return true;
                }
                seen += 1;
            }
        }
        false
    }

    /// Add an address.
    ///
    /// The broadcast address opens the filter; the all-zeros address closes
    /// it and empties the pool.
    pub fn add(&mut self, addr: &[u8; MAC_ADDR_LEN]) -> FilterUpdate {
        if *addr == BROADCAST_ADDR {
            self.open();
            return FilterUpdate::Opened;
        }
        if *addr == ALL_ZEROS {
            self.close();
            return FilterUpdate::Closed;
        }
        if self.position(addr).is_some() {
            return FilterUpdate::Unchanged;
        }

        match self.entries.iter_mut().find(|e| !e.active) {
            Some(entry) => {
                entry.active = true;
                entry.addr = *addr;
                self.active += 1;
                if !self.fully_open {
                    self.set_hash_bit(addr);
                }
                FilterUpdate::Inserted
            }
            None => {
                self.overflow = true;
                FilterUpdate::Overflowed
            }
        }
    }

    /// Remove an address.
    ///
    /// Returns false if the address was not in the pool. Removing the
    /// broadcast address leaves fully-open mode and restores the hash of the
    /// remaining pool; the all-zeros address closes the filter.
    pub fn remove(&mut self, addr: &[u8; MAC_ADDR_LEN]) -> bool {
        if *addr == BROADCAST_ADDR {
            self.fully_open = false;
            self.recompute();
            return true;
        }
        if *addr == ALL_ZEROS {
            self.close();
            return true;
        }
        let Some(idx) = self.position(addr) else {
            return false;
        };
        self.entries[idx] = PoolEntry::EMPTY;
        self.active -= 1;
        self.recompute();
        true
    }

    fn position(&self, addr: &[u8; MAC_ADDR_LEN]) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.active && e.addr == *addr)
    }

    fn open(&mut self) {
        self.fully_open = true;
        self.hash_upper = u32::MAX;
        self.hash_lower = u32::MAX;
    }

    fn close(&mut self) {
        self.entries = [PoolEntry::EMPTY; N];
        self.active = 0;
        self.fully_open = false;
        self.overflow = false;
        self.hash_upper = 0;
        self.hash_lower = 0;
    }

    fn set_hash_bit(&mut self, addr: &[u8; MAC_ADDR_LEN]) {
        let (upper, bit) = hash_bit(crc32(addr));
        if upper {
            self.hash_upper |= 1 << bit;
        } else {
            self.hash_lower |= 1 << bit;
        }
    }

    /// Rebuild both registers from the active entries. Skipped while the
    /// filter is open or overflowed, where the registers stay all-ones.
    fn recompute(&mut self) {
        if self.overflow || self.fully_open {
            return;
        }
        self.hash_upper = 0;
        self.hash_lower = 0;
        for idx in 0..N {
            if self.entries[idx].active {
                let addr = self.entries[idx].addr;
                self.set_hash_bit(&addr);
            }
        }
    }
}

impl<const N: usize> Default for MulticastFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MDNS: [u8; 6] = [0x01, 0x00, 0x5E, 0x00, 0x00, 0xFB];
    const ALL_HOSTS: [u8; 6] = [0x01, 0x00, 0x5E, 0x00, 0x00, 0x01];
    const IPV6_ALL_NODES: [u8; 6] = [0x33, 0x33, 0x00, 0x00, 0x00, 0x01];
    const PTP_PEER: [u8; 6] = [0x01, 0x80, 0xC2, 0x00, 0x00, 0x0E];

    #[test]
    fn crc32_matches_reference_values() {
        assert_eq!(crc32(&ALL_HOSTS), 0xD9B4_C5FE);
        assert_eq!(crc32(&MDNS), 0x84DC_DEFC);
        assert_eq!(crc32(&IPV6_ALL_NODES), 0x5D55_D99F);
        assert_eq!(crc32(&PTP_PEER), 0x0F7B_36E1);
    }

    #[test]
    fn hash_bit_selects_register_and_bit() {
        assert_eq!(hash_bit(0xD9B4_C5FE), (true, 22));
        assert_eq!(hash_bit(0x5D55_D99F), (false, 23));
        assert_eq!(hash_bit(0x0F7B_36E1), (false, 3));
        assert_eq!(hash_bit(0xFFFF_FFFF), (true, 31));
        assert_eq!(hash_bit(0), (false, 0));
    }

    #[test]
    fn add_sets_hash_bits() {
        let mut filter: MulticastFilter<4> = MulticastFilter::new();
        assert_eq!(filter.add(&ALL_HOSTS), FilterUpdate::Inserted);
        assert_eq!(filter.add(&IPV6_ALL_NODES), FilterUpdate::Inserted);
        assert_eq!(filter.hash_upper(), 1 << 22);
        assert_eq!(filter.hash_lower(), 1 << 23);
        assert!(filter.accepts(&ALL_HOSTS));
        assert!(!filter.accepts(&MDNS));
    }

    #[test]
    fn adding_twice_keeps_count() {
        let mut filter: MulticastFilter<4> = MulticastFilter::new();
        filter.add(&MDNS);
        assert_eq!(filter.add(&MDNS), FilterUpdate::Unchanged);
        assert_eq!(filter.active_count(), 1);
    }

    #[test]
    fn full_pool_fails_open_until_closed() {
        let mut filter: MulticastFilter<2> = MulticastFilter::new();
        filter.add(&ALL_HOSTS);
        filter.add(&MDNS);
        assert_eq!(filter.add(&PTP_PEER), FilterUpdate::Overflowed);
        assert!(filter.is_overflowed());
        assert!(filter.accepts(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]));

        // Removal keeps the overflow state.
        assert!(filter.remove(&MDNS));
        assert!(filter.accepts(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]));

        assert_eq!(filter.add(&[0; 6]), FilterUpdate::Closed);
        assert!(!filter.accepts(&ALL_HOSTS));
        assert_eq!(filter.active_count(), 0);
        assert_eq!((filter.hash_upper(), filter.hash_lower()), (0, 0));
    }

    #[test]
    fn remove_recomputes_from_remaining_entries() {
        let mut filter: MulticastFilter<4> = MulticastFilter::new();
        filter.add(&ALL_HOSTS);
        filter.add(&IPV6_ALL_NODES);
        assert!(filter.remove(&ALL_HOSTS));
        assert_eq!(filter.hash_upper(), 0);
        assert_eq!(filter.hash_lower(), 1 << 23);
        assert_eq!(filter.active_count(), 1);
        assert!(!filter.remove(&ALL_HOSTS));
    }

    #[test]
    fn broadcast_opens_and_its_removal_restores_pool() {
        let mut filter: MulticastFilter<4> = MulticastFilter::new();
        filter.add(&ALL_HOSTS);
        assert_eq!(filter.add(&BROADCAST_ADDR), FilterUpdate::Opened);
        assert_eq!(filter.hash_upper(), u32::MAX);
        assert_eq!(filter.hash_lower(), u32::MAX);
        assert!(filter.accepts(&MDNS));

        // Entries added while open are tracked but the registers stay open.
        filter.add(&IPV6_ALL_NODES);
        assert_eq!(filter.hash_lower(), u32::MAX);

        assert!(filter.remove(&BROADCAST_ADDR));
        assert!(!filter.is_fully_open());
        assert_eq!(filter.hash_upper(), 1 << 22);
        assert_eq!(filter.hash_lower(), 1 << 23);
        assert!(!filter.accepts(&MDNS));
    }

    #[test]
    fn accept_scan_skips_holes() {
        let mut filter: MulticastFilter<4> = MulticastFilter::new();
        filter.add(&ALL_HOSTS);
        filter.add(&MDNS);
        filter.add(&PTP_PEER);
        filter.remove(&ALL_HOSTS);
        assert!(filter.accepts(&PTP_PEER));
        assert!(filter.accepts(&MDNS));
    }
}
