//! ENET MAC Driver Core
//!
//! A `no_std`, `no_alloc` driver core for the ENET 10/100 Ethernet MAC with
//! IEEE 1588 support.
//!
//! The crate owns everything between the register block and the upper
//! Ethernet interface layer: the receive and transmit descriptor rings, the
//! multicast group filter and the software extension of the hardware 1588
//! timer. Frames are handed up through the [`EthIf`] callback trait.
//!
//! # Architecture
//!
//! 1. **Driver** ([`driver`]): the [`Enet`] controller with RX/TX, filtering,
//!    time, interrupts and statistics
//! 2. **HAL** ([`hal`]): management bus access
//! 3. **Sync** ([`sync`]): [`SharedEnet`], the whole-controller ISR-safe wrapper
//!
//! All hardware access goes through [`RegisterAccess`]; [`Mmio`] is the
//! memory-mapped implementation used on target.
//!
//! # Features
//!
//! - `defmt`: logging at lifecycle points and `defmt::Format` on public types
//!
//! # Example
//!
//! ```ignore
//! use ph_enet::{Enet, EnetConfig, EthIf, Mmio, Mode, RxFrame};
//!
//! static mut ENET: Enet<Mmio, 8, 8, 1536> = Enet::new(unsafe { Mmio::new(0x402D_8000) });
//!
//! let enet = unsafe { &mut *core::ptr::addr_of_mut!(ENET) };
//! enet.init(
//!     EnetConfig::new()
//!         .with_mac_address([0x02, 0x00, 0x00, 0x12, 0x34, 0x56])
//!         .with_timestamping(40),
//!     &mut delay,
//! )?;
//! enet.set_mode(Mode::Active)?;
//!
//! let mut buf = enet.borrow_tx_buffer(64)?;
//! buf.payload[..4].copy_from_slice(b"ping");
//! let index = buf.index;
//! enet.transmit(index, 0x88B5, &[0xFF; 6], 64, true, None)?;
//! ```
//!
//! # Memory Requirements
//!
//! Receive buffers are backed by an arena three times the ring size so frames
//! that wrap around the ring end can be made contiguous. With 8 RX and 8 TX
//! buffers of 1536 bytes the instance needs about 49 KB.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Mirrors the [lints] table in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{Duplex, EnetConfig, Mode, PhyInterface, Speed, State};
pub use driver::enet::Enet;
pub use driver::error::{
    BufferError, BufferResult, ConfigError, ConfigResult, Error, IoError, IoResult, Result,
};
pub use driver::interrupt::{InterruptStatus, main_function_all};
pub use driver::notify::{DiagnosticEvent, DiagnosticMonitor, DiagnosticStatus, EthIf, RxFrame};
pub use driver::rx::RxStatus;
pub use driver::stats::{CounterValues, DROP_COUNTERS, RxStats, TxErrorCounters, TxStats};
pub use driver::tx::TxBuffer;
pub use hal::mdio::MdioBus;
pub use internal::register::{Mmio, RegisterAccess};
pub use sync::SharedEnet;

/// IEEE 1588 time types and arithmetic.
pub mod ptp {
    pub use crate::internal::ptp::{
        MAX_CORRECTION_STEP, RateCorrection, RateRatio, TimeInterval, TimeStamp, div_s64,
        drift_ppb, rate_correction,
    };
}

pub use ptp::{RateCorrection, RateRatio, TimeInterval, TimeStamp};

/// Multicast hash helpers.
pub mod multicast {
    pub use crate::internal::multicast::{crc32, hash_bit};
}

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the safe driver APIs instead of touching registers directly.
///
/// # Safety
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the ENET hardware and accept responsibility for correct
/// sequencing and synchronization.
pub mod unsafe_registers {
    pub use crate::internal::register::enet::EnetRegs;
}

/// Shared driver constants.
pub mod constants {
    pub use crate::internal::constants::{
        // MAC address
        BROADCAST_ADDR,
        DEFAULT_MAC_ADDR,
        // Clocks and timer
        DEFAULT_MODULE_CLOCK_HZ,
        DEFAULT_TIMER_INCREMENT,
        // Frame sizes
        ETH_HEADER_SIZE,
        MAC_ADDR_LEN,
        MAX_FRAME_SIZE,
        MAX_TIMER_INCREMENT,
        MDC_MAX_FREQ_HZ,
        // Spin caps
        MII_SPIN_LIMIT,
        // Filtering
        MULTICAST_POOL_SIZE,
        NANOS_PER_SECOND,
        RESET_TIMEOUT_US,
        TIME_CAPTURE_SPIN_LIMIT,
    };
}
