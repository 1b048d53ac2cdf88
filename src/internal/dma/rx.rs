//! Receive descriptor ring and buffer arena.
//!
//! The arena holds the ring buffers between two spill regions of the same
//! size. When a frame wraps past the last descriptor, the shorter of its two
//! pieces is copied into the spill region adjoining the longer piece, which
//! makes the frame contiguous without touching the buffers the controller
//! may be writing to next.

use super::descriptor::RxDescriptor;
use super::descriptor::bits::rx_errors;
use super::ring::DescriptorRing;
use crate::internal::constants::{ETH_HEADER_SIZE, SPLICE_WORD};

/// State of the frame starting at a given descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxClass {
    /// Descriptor still owned by the controller
    Empty,
    /// Complete frame in a single buffer
    Single,
    /// Frame spans several buffers and is still being received
    MultiUnfinished,
    /// Frame spans several buffers and ends at `last`
    MultiFinished {
        /// Index of the final descriptor of the frame
        last: usize,
    },
    /// Every descriptor is full and none terminates a frame
    Overflow,
}

/// Location and status of one extracted frame inside the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSpan {
    /// Byte offset of the frame inside the arena
    pub offset: usize,
    /// Frame length including the Ethernet header
    pub len: usize,
    /// Merged descriptor error bits; zero for a good frame
    pub errors: u32,
    /// Destination was a multicast address
    pub multicast: bool,
    /// Destination was the broadcast address
    pub broadcast: bool,
}

/// Buffer memory: head spill, ring buffers, tail spill.
#[repr(C, align(64))]
struct RxArena<const N: usize, const B: usize> {
    spans: [[[u8; B]; N]; 3],
}

impl<const N: usize, const B: usize> RxArena<N, B> {
    const RING_OFFSET: usize = N * B;

    const fn new() -> Self {
        Self {
            spans: [[[0u8; B]; N]; 3],
        }
    }

    fn bytes(&self) -> &[u8] {
        self.spans.as_flattened().as_flattened()
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self.spans.as_flattened_mut().as_flattened_mut()
    }

    fn buffer_ptr(&self, idx: usize) -> *const u8 {
        self.spans[1][idx].as_ptr()
    }
}

/// Receive ring: descriptors, buffers, and the next-buffer cursor.
pub struct RxRing<const N: usize, const B: usize> {
    ring: DescriptorRing<RxDescriptor, N>,
    arena: RxArena<N, B>,
    interrupt: bool,
}

impl<const N: usize, const B: usize> RxRing<N, B> {
    /// Create an unconfigured ring. Const-compatible.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: DescriptorRing {
                descriptors: [const { RxDescriptor::new() }; N],
                current: 0,
            },
            arena: RxArena::new(),
            interrupt: false,
        }
    }

    /// Point every descriptor at its buffer and hand the whole ring to the
    /// controller.
    pub fn init(&mut self, interrupt: bool) {
        self.interrupt = interrupt;
        for idx in 0..N {
            let buffer = self.arena.buffer_ptr(idx);
            self.ring.descriptors[idx].setup(buffer, DescriptorRing::<RxDescriptor, N>::is_last(idx), interrupt);
        }
        self.ring.reset();
    }

    /// Descriptor ring base address for RDSR.
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.ring.base_addr_u32()
    }

    /// Next descriptor to inspect.
    #[inline(always)]
    pub fn cursor(&self) -> usize {
        self.ring.current_index()
    }

    /// Move the next-descriptor cursor.
    #[inline(always)]
    pub fn set_cursor(&mut self, idx: usize) {
        self.ring.set_current(idx);
    }

    /// Index following `idx` with wraparound.
    #[inline(always)]
    pub const fn next_index(idx: usize) -> usize {
        DescriptorRing::<RxDescriptor, N>::next_index(idx)
    }

    /// Classify the frame starting at `idx`.
    ///
    /// A truncated or over-length buffer ends the frame where it is, so a
    /// damaged frame is always drained rather than left dangling.
    pub fn classify(&self, idx: usize) -> RxClass {
        let Some(desc) = self.ring.get(idx) else {
            return RxClass::Empty;
        };

        if desc.is_empty() {
            return RxClass::Empty;
        }
        if desc.is_terminated_early() {
            return RxClass::MultiFinished { last: idx };
        }
        if desc.is_last() {
            return RxClass::Single;
        }

        let mut probe = idx;
        for _ in 1..N {
            probe = Self::next_index(probe);
            let desc = &self.ring.descriptors[probe];
            if desc.is_empty() {
                return RxClass::MultiUnfinished;
            }
            if desc.is_last() || desc.is_terminated_early() {
                return RxClass::MultiFinished { last: probe };
            }
        }
        RxClass::Overflow
    }

    /// Extract the frame occupying descriptors `start..=end`.
    ///
    /// The length comes from the final descriptor and is clamped to
    /// `[ETH_HEADER_SIZE, max_len]`. A frame that wraps past the ring end is
    /// spliced when `splice` is set, otherwise it is flagged as errored.
    pub fn extract(&mut self, start: usize, end: usize, max_len: usize, splice: bool) -> FrameSpan {
        let (start, end) = (start % N, end % N);
        let last = &self.ring.descriptors[end];

        let buffers = if end >= start {
            end - start + 1
        } else {
            N - start + end + 1
        };
        let upper = max_len.min(buffers * B).max(ETH_HEADER_SIZE);
        let len = last.data_length().clamp(ETH_HEADER_SIZE, upper);

        let mut span = FrameSpan {
            offset: RxArena::<N, B>::RING_OFFSET + start * B,
            len,
            errors: last.error_mask(),
            multicast: last.is_multicast(),
            broadcast: last.is_broadcast(),
        };

        let head_bytes = (N - start) * B;
        if end >= start || len <= head_bytes {
            return span;
        }
        if !splice {
            span.errors |= rx_errors::UNSPLICED;
            return span;
        }

        let ring = RxArena::<N, B>::RING_OFFSET;
        let head_buffers = N - start;
        let tail_buffers = end + 1;
        let bytes = self.arena.bytes_mut();

        if tail_buffers <= head_buffers {
            let tail_used = len - head_bytes;
            let copy = tail_used.next_multiple_of(SPLICE_WORD).min(tail_buffers * B);
            bytes.copy_within(ring..ring + copy, ring + N * B);
        } else {
            bytes.copy_within(ring + start * B..ring + N * B, ring - head_bytes);
            span.offset = ring - head_bytes;
        }
        span
    }

    /// Frame bytes for a span returned by [`RxRing::extract`].
    pub fn frame(&self, span: &FrameSpan) -> &[u8] {
        self.arena
            .bytes()
            .get(span.offset..span.offset + span.len)
            .unwrap_or(&[])
    }

    /// Captured timestamp of the descriptor at `idx`.
    pub fn timestamp(&self, idx: usize) -> Option<u32> {
        self.ring.get(idx).map(RxDescriptor::timestamp)
    }

    /// Return one descriptor to the controller.
    pub fn rearm(&self, idx: usize) {
        if let Some(desc) = self.ring.get(idx) {
            desc.arm(DescriptorRing::<RxDescriptor, N>::is_last(idx), self.interrupt);
        }
    }

    /// Return descriptors `start..=end` (wrapping) to the controller.
    pub fn rearm_range(&self, start: usize, end: usize) {
        let mut idx = start % N;
        for _ in 0..N {
            self.rearm(idx);
            if idx == end {
                break;
            }
            idx = Self::next_index(idx);
        }
    }

    /// Return the whole ring to the controller.
    pub fn rearm_all(&self) {
        for idx in 0..N {
            self.rearm(idx);
        }
    }

    /// Descriptor at `idx`.
    #[cfg(test)]
    pub fn descriptor(&self, idx: usize) -> Option<&RxDescriptor> {
        self.ring.get(idx)
    }

    /// Simulate the controller writing `data` into consecutive buffers from
    /// `idx` and completing their descriptors. Returns the last index used.
    #[cfg(test)]
    pub fn inject(&mut self, idx: usize, data: &[u8], status: u16, ext: u16, timestamp: u32) -> usize {
        use super::descriptor::bits::rx_status;

        let chunks = data.len().div_ceil(B).max(1);
        let mut slot = idx % N;
        for chunk in 0..chunks {
            let from = chunk * B;
            let to = (from + B).min(data.len());
            let base = RxArena::<N, B>::RING_OFFSET + slot * B;
            self.arena.bytes_mut()[base..base + (to - from)].copy_from_slice(&data[from..to]);

            let final_chunk = chunk + 1 == chunks;
            let desc = &self.ring.descriptors[slot];
            if final_chunk {
                desc.complete(data.len() as u16, status | rx_status::LAST, ext, timestamp);
                return slot;
            }
            desc.complete(B as u16, 0, 0, 0);
            slot = Self::next_index(slot);
        }
        slot
    }
}

impl<const N: usize, const B: usize> Default for RxRing<N, B> {
    fn default() -> Self {
        Self::new()
    }
}
