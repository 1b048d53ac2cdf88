//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Raw memory-mapped register definitions
//! - [`constants`]: Internal constants and magic numbers
//! - [`dma`]: Descriptor rings and ring buffers
//! - [`multicast`]: Group hash and exact multicast pool
//! - [`ptp`]: IEEE 1588 time arithmetic and rate correction
//!
//! # Stability
//!
//! **WARNING:** Do not depend on any types or functions in this module from
//! external code. They are subject to change without notice.

pub(crate) mod constants;
pub(crate) mod dma;
pub(crate) mod multicast;
pub(crate) mod ptp;
pub(crate) mod register;
