//! Fixed-size circular descriptor ring.

/// Circular descriptor ring with a wrapping cursor.
///
/// The descriptor array is laid out contiguously so its base address can be
/// handed to the controller (RDSR/TDSR). Indexed access is bounds-checked:
/// an out-of-range index is a driver bug and yields `None`.
pub struct DescriptorRing<D, const N: usize> {
    /// Array of descriptors
    pub(super) descriptors: [D; N],
    /// Cursor: next descriptor the driver will look at
    pub(super) current: usize,
}

impl<D, const N: usize> DescriptorRing<D, N> {
    /// Create a new descriptor ring from an existing array
    #[must_use]
    pub const fn from_array(descriptors: [D; N]) -> Self {
        Self {
            descriptors,
            current: 0,
        }
    }

    /// Index following `index`, wrapping at the ring end
    #[inline(always)]
    #[must_use]
    pub const fn next_index(index: usize) -> usize {
        if index + 1 >= N { 0 } else { index + 1 }
    }

    /// True if `index` is the physical last slot (carries the wrap bit)
    #[inline(always)]
    #[must_use]
    pub const fn is_last(index: usize) -> bool {
        index + 1 == N
    }

    /// Get the cursor position
    #[inline(always)]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Move the cursor to `index`
    #[inline(always)]
    pub fn set_current(&mut self, index: usize) {
        if index < N {
            self.current = index;
        }
    }

    /// Advance the cursor by one, wrapping around
    #[inline(always)]
    pub fn advance(&mut self) {
        self.current = Self::next_index(self.current);
    }

    /// Reset the cursor to 0
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Descriptor under the cursor
    #[inline(always)]
    pub fn current(&self) -> &D {
        &self.descriptors[self.current]
    }

    /// Descriptor at `index`
    #[inline(always)]
    pub fn get(&self, index: usize) -> Option<&D> {
        self.descriptors.get(index)
    }

    /// Base address of the descriptor array for the ring start register
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.descriptors.as_ptr() as u32
    }
}

// =============================================================================
// Tests
// =============================================================================
