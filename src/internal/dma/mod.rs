//! Descriptor rings and buffers
//!
//! All ring memory is statically allocated using const generics and owned
//! by the driver instance.
//!
//! # Architecture
//!
//! - [`RxRing`]: receive descriptors plus a buffer arena with spill regions
//!   used to make ring-wrapping frames contiguous
//! - [`TxRing`]: transmit descriptors, buffers and per-buffer ownership
//!   flags used for borrowing, confirmation and lazy reclaim
//! - `DescriptorRing`: circular descriptor array with a cursor, shared by both

pub(crate) mod descriptor;
mod ring;
mod rx;
mod tx;

pub(crate) use rx::{FrameSpan, RxClass, RxRing};
pub(crate) use tx::TxRing;
