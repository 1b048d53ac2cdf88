//! Hardware Abstraction Layer
//!
//! Higher-level views over the controller that do not belong to the frame
//! path itself.
//!
//! # Modules
//!
//! - [`mdio`]: Management bus access and MDC divider
//!
//! # Delay Integration
//!
//! Bring-up that waits on hardware takes an `embedded_hal::delay::DelayNs`.
//! Pass any delay implementation from your HAL.

pub mod mdio;

pub use mdio::{MdioBus, mscr_value};
