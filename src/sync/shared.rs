//! ISR-safe controller wrapper using critical sections.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::driver::enet::Enet;
use crate::driver::notify::{DiagnosticMonitor, EthIf};
use crate::internal::register::{Mmio, RegisterAccess};

/// ISR-safe controller wrapper.
///
/// All access goes through `critical_section::with()`, so task code and the
/// controller's interrupt handlers never observe the driver mid-update.
///
/// # Example
///
/// ```ignore
/// static ENET: SharedEnet<Mmio, 8, 8, 1536> =
///     SharedEnet::new(unsafe { Mmio::new(0x402D_8000) });
///
/// ENET.with(|enet| enet.init(EnetConfig::new(), delay))?;
///
/// #[interrupt]
/// fn ENET() {
///     ENET.on_interrupt(&mut upper);
/// }
/// ```
pub struct SharedEnet<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
{
    inner: Mutex<RefCell<Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>>>,
}

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    SharedEnet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Create a shared, uninitialized controller (const, suitable for statics).
    pub const fn new(bus: B) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Enet::new(bus))),
        }
    }

    /// Execute a closure with exclusive access to the controller.
    ///
    /// Interrupts are disabled for the duration of the closure. That includes
    /// any bounded hardware wait the closure triggers: management bus access
    /// ([`Enet::mii_read`], [`Enet::mii_write`]) spins for up to
    /// [`MII_SPIN_LIMIT`](crate::constants::MII_SPIN_LIMIT) polls, and
    /// [`Enet::init`] waits out the MAC reset. Run PHY traffic and bring-up
    /// before interrupt latency matters, or from a low-priority context.
    ///
    /// # Panics
    /// Panics if called re-entrantly from inside another `with`.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut enet| f(&mut enet))
        })
    }

    /// Combined receive and transmit interrupt.
    ///
    /// Does nothing if task code currently holds the controller; the event
    /// flags stay set and are picked up by the next interrupt or poll.
    pub fn on_interrupt<E: EthIf>(&self, upper: &mut E) {
        self.try_with(|enet| enet.irq_handler(upper));
    }

    /// Receive interrupt
    pub fn on_rx_interrupt<E: EthIf>(&self, upper: &mut E) {
        self.try_with(|enet| enet.rx_irq_handler(upper));
    }

    /// Transmit interrupt
    pub fn on_tx_interrupt<E: EthIf>(&self, upper: &mut E) {
        self.try_with(|enet| enet.tx_irq_handler(upper));
    }

    /// 1588 timer interrupt
    pub fn on_timer_interrupt(&self) {
        self.try_with(|enet| enet.timer_irq_handler());
    }

    /// Periodic housekeeping, see [`Enet::main_function`]
    pub fn main_function<E: EthIf, M: DiagnosticMonitor>(&self, upper: &mut E, monitor: &mut M) {
        self.with(|enet| enet.main_function(upper, monitor));
    }
}

/// Shared controller on memory-mapped registers with 8 RX, 8 TX, 1536 byte buffers.
pub type SharedEnetDefault = SharedEnet<Mmio, 8, 8, 1536>;
