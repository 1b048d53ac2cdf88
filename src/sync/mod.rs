//! Synchronization Support
//!
//! The driver already guards the state its interrupt handlers share with
//! task code (1588 time, pending confirmations). [`SharedEnet`] goes one step
//! further and places the whole controller behind a critical section, for
//! applications that keep the driver in a `static` and call it from both
//! task context and interrupt handlers.
//!
//! # Example
//!
//! ```ignore
//! use ph_enet::sync::SharedEnet;
//!
//! static ENET: SharedEnet<Mmio, 8, 8, 1536> =
//!     SharedEnet::new(unsafe { Mmio::new(0x402D_8000) });
//!
//! fn main() {
//!     ENET.with(|enet| {
//!         enet.init(EnetConfig::new(), delay).unwrap();
//!         enet.set_mode(Mode::Active).unwrap();
//!     });
//! }
//!
//! #[interrupt]
//! fn ENET_1588_TIMER() {
//!     ENET.on_timer_interrupt();
//! }
//! ```

mod shared;

pub use shared::{SharedEnet, SharedEnetDefault};
