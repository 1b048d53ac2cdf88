//! Core driver components for the ENET controller.
//!
//! This module contains the building blocks for configuring and operating
//! the Ethernet MAC:
//!
//! - [`config`] - Configuration types and builder
//! - [`error`] - Error types and result aliases
//! - [`enet`] - The controller instance, bring-up and MAC-level controls
//! - [`rx`] / [`tx`] - Frame reception and transmission
//! - [`filtering`] - Multicast group filter
//! - [`time`] - IEEE 1588 timer, timestamps and rate correction
//! - [`interrupt`] - Interrupt status and handlers, periodic housekeeping
//! - [`notify`] - Upper-layer and diagnostic callback traits
//! - [`stats`] - Hardware statistics counters
//!
//! # Example
//!
//! ```ignore
//! use ph_enet::driver::{Enet, EnetConfig};
//!
//! let config = EnetConfig::new()
//!     .with_mac_address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
//! ```

pub mod config;
pub mod enet;
pub mod error;
pub mod filtering;
pub mod interrupt;
pub mod notify;
pub mod rx;
pub mod stats;
pub mod time;
pub mod tx;

pub use config::{Duplex, EnetConfig, Mode, PhyInterface, Speed, State};
pub use enet::Enet;
pub use error::{
    BufferError, BufferResult, ConfigError, ConfigResult, Error, IoError, IoResult, Result,
};
pub use interrupt::{InterruptStatus, main_function_all};
pub use notify::{DiagnosticEvent, DiagnosticMonitor, DiagnosticStatus, EthIf, RxFrame};
pub use rx::RxStatus;
pub use stats::{CounterValues, DROP_COUNTERS, RxStats, TxErrorCounters, TxStats};
pub use tx::TxBuffer;
