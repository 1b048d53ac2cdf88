//! Memory-mapped register access for the ENET controller
//!
//! All hardware access funnels through the [`RegisterAccess`] trait. On target
//! the [`Mmio`] implementation performs volatile 32-bit loads and stores at
//! `base + offset`; on the host the test mocks stand in for the peripheral.
//!
//! Typed accessors live on [`enet::EnetRegs`] and are generated by the
//! `reg_*` macros below.

pub mod enet;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

/// Raw 32-bit register file of one controller instance.
///
/// Offsets are byte offsets from the start of the register block. Every
/// access is a full 32-bit access; there is no logic at this layer.
pub trait RegisterAccess {
    /// Read the register at `offset`
    fn read(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`
    fn write(&self, offset: usize, value: u32);

    /// Read-modify-write the register at `offset`
    #[inline(always)]
    fn modify<F>(&self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set bits in a register (read-modify-write)
    #[inline(always)]
    fn set_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v | bits);
    }

    /// Clear bits in a register (read-modify-write)
    #[inline(always)]
    fn clear_bits(&self, offset: usize, bits: u32) {
        self.modify(offset, |v| v & !bits);
    }
}

impl<T: RegisterAccess + ?Sized> RegisterAccess for &T {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value);
    }
}

/// Volatile memory-mapped register block at a fixed base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create an accessor for the register block at `base`.
    ///
    /// # Safety
    /// `base` must be the address of an ENET register block that stays mapped
    /// for the lifetime of the accessor, and no other driver may own it.
    #[must_use]
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the register block
    #[inline(always)]
    #[must_use]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterAccess for Mmio {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `Mmio::new` guarantees the block is mapped and aligned.
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: `Mmio::new` guarantees the block is mapped and aligned.
        unsafe { write_reg(self.base + offset, value) }
    }
}

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a register.
///
/// # Example
/// ```ignore
/// impl<B: RegisterAccess> EnetRegs<B> {
///     reg_rw!(eimr, set_eimr, EIMR_OFFSET, "Interrupt Mask register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.bus.read($offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&self, value: u32) {
            self.bus.write($offset, value)
        }
    };
}

/// Generate a read-only accessor method for a register.
macro_rules! reg_ro {
    ($read_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&self) -> u32 {
            self.bus.read($offset)
        }
    };
}

/// Generate set/clear bit operation methods for a register.
///
/// # Example
/// ```ignore
/// impl<B: RegisterAccess> EnetRegs<B> {
///     reg_bit_ops!(enable_mac, disable_mac, ECR_OFFSET, ECR_ETHEREN,
///                  "MAC", "Enable", "Disable");
/// }
/// ```
macro_rules! reg_bit_ops {
    ($set_fn:ident, $clear_fn:ident, $offset:expr, $bit:expr, $what:expr, $set_verb:expr, $clear_verb:expr) => {
        #[doc = concat!($set_verb, " ", $what)]
        #[inline(always)]
        pub fn $set_fn(&self) {
            self.bus.set_bits($offset, $bit)
        }

        #[doc = concat!($clear_verb, " ", $what)]
        #[inline(always)]
        pub fn $clear_fn(&self) {
            self.bus.clear_bits($offset, $bit)
        }
    };
}

/// Generate a bit check method (true when the bit is set).
macro_rules! reg_bit_check {
    ($fn:ident, $offset:expr, $bit:expr, $doc:expr) => {
        #[doc = $doc]
        #[inline(always)]
        pub fn $fn(&self) -> bool {
            (self.bus.read($offset) & $bit) != 0
        }
    };
}

// Export macros for use in submodules
pub(crate) use reg_bit_check;
pub(crate) use reg_bit_ops;
pub(crate) use reg_ro;
pub(crate) use reg_rw;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRegisters;

    #[test]
    fn modify_applies_closure_to_current_value() {
        let regs = MockRegisters::new();
        regs.write(0x84, 0x0000_00F0);
        regs.modify(0x84, |v| v | 0x1);
        assert_eq!(regs.read(0x84), 0x0000_00F1);
    }

    #[test]
    fn set_and_clear_bits() {
        let regs = MockRegisters::new();
        regs.set_bits(0xC4, 1 << 2);
        assert_eq!(regs.read(0xC4), 1 << 2);
        regs.clear_bits(0xC4, 1 << 2);
        assert_eq!(regs.read(0xC4), 0);
    }

    #[test]
    fn reference_forwards_to_inner() {
        let regs = MockRegisters::new();
        let by_ref = &regs;
        by_ref.write(0xE4, 0x1234_5678);
        assert_eq!(regs.read(0xE4), 0x1234_5678);
    }

    #[test]
    fn mmio_keeps_base() {
        // SAFETY: the accessor is never dereferenced in this test.
        let mmio = unsafe { Mmio::new(0x402D_8000) };
        assert_eq!(mmio.base(), 0x402D_8000);
    }
}
