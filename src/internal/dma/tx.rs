//! Transmit descriptor ring, buffers, and per-buffer bookkeeping.
//!
//! Buffer slots and descriptors are tracked separately: a borrowed group of
//! contiguous buffers is sent through one descriptor taken from the active
//! descriptor cursor, and the slot remembers which descriptor it is linked
//! to until the controller is done with it.

use core::cell::Cell;

use critical_section::Mutex;

use super::descriptor::TxDescriptor;
use super::ring::DescriptorRing;
use crate::driver::error::{BufferError, BufferResult};
use crate::internal::constants::{ETH_HEADER_SIZE, MAC_ADDR_LEN};

/// Software flags of one transmit buffer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotFlags(u8);

impl SlotFlags {
    /// Borrowed by the upper layer or in flight
    pub const LOCKED: Self = Self(1 << 0);
    /// Transmit confirmation requested and not yet delivered
    pub const CONFIRM: Self = Self(1 << 1);
    /// Attached to a transmit descriptor
    pub const LINKED: Self = Self(1 << 2);
    /// First slot of a buffer group
    pub const FIRST: Self = Self(1 << 3);
    /// Sent and neither borrowed again nor its descriptor reused since
    pub const SENT: Self = Self(1 << 4);

    /// No flags set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// True if every flag in `other` is set
    #[inline(always)]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Set the flags in `other`
    #[inline(always)]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Clear the flags in `other`
    #[inline(always)]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// True if no flag is set
    #[cfg(test)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for SlotFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Bookkeeping for one transmit buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TxSlot {
    /// Ownership and progress flags
    pub flags: SlotFlags,
    /// Buffers in the group this slot belongs to
    pub group_len: u16,
    /// Descriptor the group was last sent through
    pub desc_idx: u16,
}

impl TxSlot {
    const fn new() -> Self {
        Self {
            flags: SlotFlags::empty(),
            group_len: 0,
            desc_idx: 0,
        }
    }

    /// Slot available for borrowing
    #[inline(always)]
    pub const fn is_free(&self) -> bool {
        !self.flags.contains(SlotFlags::LOCKED)
    }
}

#[repr(C, align(64))]
struct TxBuffers<const N: usize, const B: usize>([[u8; B]; N]);

/// Transmit ring state.
pub struct TxRing<const N: usize, const B: usize> {
    /// Descriptors; the ring cursor is the next descriptor to submit
    ring: DescriptorRing<TxDescriptor, N>,
    buffers: TxBuffers<N, B>,
    slots: [TxSlot; N],
    /// Where the next free-run search starts
    search: usize,
    /// Confirmations requested and not yet delivered
    pending: Mutex<Cell<usize>>,
    /// Doorbell write may have been dropped and must be repeated
    doorbell_retry: bool,
}

impl<const N: usize, const B: usize> TxRing<N, B> {
    /// Create an unconfigured ring. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: DescriptorRing::from_array([const { TxDescriptor::new() }; N]),
            buffers: TxBuffers([[0u8; B]; N]),
            slots: [const { TxSlot::new() }; N],
            search: 0,
            pending: Mutex::new(Cell::new(0)),
            doorbell_retry: false,
        }
    }

    /// Payload capacity of a single buffer
    #[must_use]
    pub const fn single_buffer_payload() -> usize {
        B - ETH_HEADER_SIZE
    }

    /// Forget every outstanding buffer and return all descriptors to
    /// software. No confirmation is delivered for dropped buffers.
    pub fn init(&mut self) {
        for (idx, desc) in self.ring.descriptors.iter().enumerate() {
            desc.reset(DescriptorRing::<TxDescriptor, N>::is_last(idx));
        }
        self.slots = [const { TxSlot::new() }; N];
        self.ring.reset();
        self.search = 0;
        self.doorbell_retry = false;
        critical_section::with(|cs| self.pending.borrow(cs).set(0));
    }

    /// Descriptor ring base address for TDSR.
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.ring.base_addr_u32()
    }

    /// Slot bookkeeping at `idx`.
    #[cfg(test)]
    pub fn slot(&self, idx: usize) -> Option<&TxSlot> {
        self.slots.get(idx)
    }

    /// Descriptor at `idx`.
    #[inline(always)]
    pub fn descriptor(&self, idx: usize) -> Option<&TxDescriptor> {
        self.ring.get(idx)
    }

    /// Next descriptor to submit.
    #[inline(always)]
    pub fn active_descriptor(&self) -> usize {
        self.ring.current_index()
    }

    /// Number of locked buffers.
    pub fn locked_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_free()).count()
    }

    /// Confirmations requested and not yet delivered.
    #[cfg(test)]
    pub fn pending_confirmations(&self) -> usize {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }

    /// Doorbell retry flag.
    #[inline(always)]
    pub fn doorbell_retry(&self) -> bool {
        self.doorbell_retry
    }

    /// Set or clear the doorbell retry flag.
    #[inline(always)]
    pub fn set_doorbell_retry(&mut self, retry: bool) {
        self.doorbell_retry = retry;
    }

    /// Reserve a contiguous group of free buffers for a payload of `len`
    /// bytes, returning the index of the first buffer.
    ///
    /// One buffer always stays in reserve, so at most `N - 1` buffers are
    /// locked at any time. Groups never wrap past the physical ring end.
    pub fn borrow(&mut self, len: usize, multi_buffer: bool) -> BufferResult<usize> {
        let needed = if multi_buffer {
            let overflow = BufferError::Overflow {
                max_len: (N.saturating_sub(1) * B).saturating_sub(ETH_HEADER_SIZE),
            };
            let needed = len
                .checked_add(ETH_HEADER_SIZE)
                .ok_or(overflow)?
                .div_ceil(B);
            if needed > N.saturating_sub(1) {
                return Err(overflow);
            }
            needed
        } else {
            let overflow = BufferError::Overflow {
                max_len: Self::single_buffer_payload(),
            };
            if len.checked_add(ETH_HEADER_SIZE).ok_or(overflow)? > B {
                return Err(overflow);
            }
            1
        };

        for idx in 0..N {
            self.reclaim(idx);
        }
        if self.locked_count() + needed > N - 1 {
            return Err(BufferError::Busy);
        }

        let mut run_start = self.search;
        let mut run = 0usize;
        for step in 0..N {
            let idx = (self.search + step) % N;
            if idx == 0 {
                run = 0;
            }
            if !self.slots[idx].is_free() {
                run = 0;
                continue;
            }
            if run == 0 {
                run_start = idx;
            }
            run += 1;
            if run == needed {
                self.lock_group(run_start, needed);
                self.search = (run_start + needed) % N;
                return Ok(run_start);
            }
        }
        Err(BufferError::Busy)
    }

    fn lock_group(&mut self, first: usize, count: usize) {
        for (offset, slot) in self.slots[first..first + count].iter_mut().enumerate() {
            slot.flags = if offset == 0 {
                SlotFlags::LOCKED | SlotFlags::FIRST
            } else {
                SlotFlags::LOCKED
            };
            slot.group_len = count as u16;
        }
    }

    /// Unlock a group. A sent group keeps its descriptor link for
    /// [`TxRing::sent_descriptor`].
    fn free_group(&mut self, first: usize) {
        let count = (self.slots[first].group_len as usize).max(1);
        let end = (first + count).min(N);
        for slot in &mut self.slots[first..end] {
            slot.flags = if slot.flags.contains(SlotFlags::SENT) {
                SlotFlags::SENT
            } else {
                SlotFlags::empty()
            };
            slot.group_len = 0;
        }
    }

    /// Free a group the controller has finished with, unless the upper
    /// layer is still owed a confirmation for it.
    fn reclaim(&mut self, idx: usize) {
        let slot = self.slots[idx];
        let done = SlotFlags::LOCKED | SlotFlags::LINKED | SlotFlags::FIRST;
        if !slot.flags.contains(done) || slot.flags.contains(SlotFlags::CONFIRM) {
            return;
        }
        let desc = &self.ring.descriptors[slot.desc_idx as usize];
        if desc.is_ready() {
            return;
        }
        critical_section::with(|_| {
            self.slots[idx].flags.remove(SlotFlags::LINKED);
            desc.clear_link();
        });
        self.free_group(idx);
    }

    /// Payload area of a borrowed group (after the Ethernet header).
    pub fn payload_mut(&mut self, idx: usize) -> Option<&mut [u8]> {
        let slot = self.slots.get(idx)?;
        if !slot.flags.contains(SlotFlags::LOCKED | SlotFlags::FIRST) {
            return None;
        }
        let count = slot.group_len as usize;
        let bytes = self.buffers.0.as_flattened_mut();
        bytes.get_mut(idx * B + ETH_HEADER_SIZE..(idx + count) * B)
    }

    /// Give a borrowed group back without transmitting it.
    pub fn release(&mut self, idx: usize) -> BufferResult<()> {
        self.borrowed(idx)?;
        self.free_group(idx);
        Ok(())
    }

    fn borrowed(&self, idx: usize) -> BufferResult<TxSlot> {
        let slot = *self.slots.get(idx).ok_or(BufferError::InvalidBuffer)?;
        if !slot.flags.contains(SlotFlags::LOCKED | SlotFlags::FIRST) {
            return Err(BufferError::NotLocked);
        }
        if slot.flags.contains(SlotFlags::LINKED) {
            return Err(BufferError::Busy);
        }
        Ok(slot)
    }

    /// Write the 14-byte Ethernet header in front of the payload.
    pub fn write_header(
        &mut self,
        idx: usize,
        dest: &[u8; MAC_ADDR_LEN],
        src: &[u8; MAC_ADDR_LEN],
        ether_type: u16,
    ) -> BufferResult<()> {
        self.borrowed(idx)?;
        let header = &mut self.buffers.0[idx][..ETH_HEADER_SIZE];
        header[..6].copy_from_slice(dest);
        header[6..12].copy_from_slice(src);
        header[12..14].copy_from_slice(&ether_type.to_be_bytes());
        Ok(())
    }

    /// Hand a borrowed group carrying `payload_len` bytes to the controller.
    ///
    /// Returns the descriptor index used. Fails with `Busy` if the next
    /// descriptor is still owned by the controller or still linked to an
    /// unconfirmed buffer.
    pub fn submit(
        &mut self,
        idx: usize,
        payload_len: usize,
        confirm: bool,
        timestamp: bool,
    ) -> BufferResult<usize> {
        let slot = self.borrowed(idx)?;
        let capacity = slot.group_len as usize * B - ETH_HEADER_SIZE;
        if payload_len > capacity {
            return Err(BufferError::Overflow { max_len: capacity });
        }

        let desc_idx = self.ring.current_index();
        let desc = self.ring.current();
        if desc.is_ready() || desc.is_linked() {
            return Err(BufferError::Busy);
        }

        desc.submit(
            self.buffers.0[idx].as_ptr(),
            payload_len + ETH_HEADER_SIZE,
            DescriptorRing::<TxDescriptor, N>::is_last(desc_idx),
            timestamp,
        );
        self.ring.advance();

        for other in &mut self.slots {
            if other.desc_idx as usize == desc_idx {
                other.flags.remove(SlotFlags::SENT);
            }
        }
        let slot = &mut self.slots[idx];
        slot.desc_idx = desc_idx as u16;
        slot.flags.insert(SlotFlags::LINKED | SlotFlags::SENT);
        if confirm {
            slot.flags.insert(SlotFlags::CONFIRM);
            critical_section::with(|cs| {
                let pending = self.pending.borrow(cs);
                pending.set(pending.get() + 1);
            });
        }
        Ok(desc_idx)
    }

    /// Unlink a confirmation-pending group whose descriptor has completed.
    ///
    /// Returns true exactly once per completed group; the caller then
    /// delivers the confirmation and calls [`TxRing::finish_confirmation`].
    pub fn unlink_completed(&mut self, idx: usize) -> bool {
        let Some(slot) = self.slots.get(idx).copied() else {
            return false;
        };
        if !slot.flags.contains(SlotFlags::CONFIRM | SlotFlags::FIRST) {
            return false;
        }
        if slot.flags.contains(SlotFlags::LINKED) {
            let desc = &self.ring.descriptors[slot.desc_idx as usize];
            if desc.is_ready() {
                return false;
            }
            critical_section::with(|_| {
                self.slots[idx].flags.remove(SlotFlags::LINKED);
                desc.clear_link();
            });
        }
        true
    }

    /// Free a confirmed group and drop it from the pending count.
    pub fn finish_confirmation(&mut self, idx: usize) {
        self.free_group(idx);
        critical_section::with(|cs| {
            let pending = self.pending.borrow(cs);
            pending.set(pending.get().saturating_sub(1));
        });
    }

    /// Descriptor the group at `idx` was last sent through.
    ///
    /// `None` if the buffer was never sent, has been borrowed or released
    /// since, or its descriptor now carries another frame.
    pub fn sent_descriptor(&self, idx: usize) -> BufferResult<Option<&TxDescriptor>> {
        let slot = self.slots.get(idx).ok_or(BufferError::InvalidBuffer)?;
        if !slot.flags.contains(SlotFlags::SENT) {
            return Ok(None);
        }
        Ok(self.ring.get(slot.desc_idx as usize))
    }

    /// Raw buffer contents, header included.
    #[cfg(test)]
    pub fn buffer(&self, idx: usize) -> &[u8] {
        &self.buffers.0[idx]
    }
}

impl<const N: usize, const B: usize> Default for TxRing<N, B> {
    fn default() -> Self {
        Self::new()
    }
}
