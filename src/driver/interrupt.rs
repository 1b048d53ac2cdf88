//! Interrupt and periodic entry points.
//!
//! This module provides the [`InterruptStatus`] structure for parsing the
//! ENET event register, the receive/transmit/timer interrupt handlers and
//! the periodic [`Enet::main_function`].

use super::config::Mode;
use super::enet::Enet;
use super::notify::{DiagnosticEvent, DiagnosticMonitor, DiagnosticStatus, EthIf};
use crate::internal::register::RegisterAccess;
use crate::internal::register::enet::{eir, stat};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from the event register.
///
/// # Example
///
/// ```ignore
/// let status = enet.interrupt_status();
/// if status.rx_frame {
///     // Frame received
/// }
/// if status.has_error() {
///     // Bus error, babbling or transmit fault
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Frame received
    pub rx_frame: bool,
    /// Frame transmitted
    pub tx_frame: bool,
    /// Management frame complete
    pub mii: bool,
    /// 1588 timer wrapped
    pub timer_wrap: bool,
    /// Transmit timestamp available
    pub timestamp_available: bool,
    /// Receive frame longer than the maximum length
    pub babbling_rx: bool,
    /// Transmit frame longer than the maximum length
    pub babbling_tx: bool,
    /// System bus error; the controller stopped
    pub bus_error: bool,
    /// Collision after the slot time
    pub late_collision: bool,
    /// Collision retry limit reached
    pub retry_limit: bool,
    /// Transmit FIFO underrun
    pub underrun: bool,
}

impl InterruptStatus {
    /// Create from a raw EIR value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            rx_frame: (status & eir::RXF) != 0,
            tx_frame: (status & eir::TXF) != 0,
            mii: (status & eir::MII) != 0,
            timer_wrap: (status & eir::TS_TIMER) != 0,
            timestamp_available: (status & eir::TS_AVAIL) != 0,
            babbling_rx: (status & eir::BABR) != 0,
            babbling_tx: (status & eir::BABT) != 0,
            bus_error: (status & eir::EBERR) != 0,
            late_collision: (status & eir::LC) != 0,
            retry_limit: (status & eir::RL) != 0,
            underrun: (status & eir::UN) != 0,
        }
    }

    /// Convert to raw value for clearing (write-1-to-clear)
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let flags = [
            (self.rx_frame, eir::RXF),
            (self.tx_frame, eir::TXF),
            (self.mii, eir::MII),
            (self.timer_wrap, eir::TS_TIMER),
            (self.timestamp_available, eir::TS_AVAIL),
            (self.babbling_rx, eir::BABR),
            (self.babbling_tx, eir::BABT),
            (self.bus_error, eir::EBERR),
            (self.late_collision, eir::LC),
            (self.retry_limit, eir::RL),
            (self.underrun, eir::UN),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .fold(0, |acc, (_, bit)| acc | bit)
    }

    /// Check if any event occurred
    #[inline]
    pub fn any(&self) -> bool {
        self.to_raw() != 0
    }

    /// Check if any error occurred
    #[inline]
    pub fn has_error(&self) -> bool {
        self.babbling_rx
            || self.babbling_tx
            || self.bus_error
            || self.late_collision
            || self.retry_limit
            || self.underrun
    }
}

// =============================================================================
// Handlers
// =============================================================================

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Pending events without clearing them
    pub fn interrupt_status(&self) -> InterruptStatus {
        InterruptStatus::from_raw(self.regs.eir())
    }

    /// Clear the given events
    pub fn clear_interrupts(&self, status: InterruptStatus) {
        self.regs.set_eir(status.to_raw());
    }

    /// Receive interrupt entry point.
    ///
    /// The event flag is cleared before anything else so a frame arriving
    /// during the drain raises a fresh interrupt.
    pub fn rx_irq_handler<E: EthIf>(&mut self, upper: &mut E) {
        let raised = self.regs.take_events(eir::RXF) != 0;
        self.service_rx(raised, upper);
    }

    /// Transmit interrupt entry point.
    pub fn tx_irq_handler<E: EthIf>(&mut self, upper: &mut E) {
        let raised = self.regs.take_events(eir::TXF) != 0;
        self.service_tx(raised, upper);
    }

    /// Combined receive and transmit interrupt entry point.
    ///
    /// Both flags are cleared before either direction is processed.
    pub fn irq_handler<E: EthIf>(&mut self, upper: &mut E) {
        let taken = self.regs.take_events(eir::RXF | eir::TXF);
        self.service_rx(taken & eir::RXF != 0, upper);
        self.service_tx(taken & eir::TXF != 0, upper);
    }

    fn service_rx<E: EthIf>(&mut self, raised: bool, upper: &mut E) {
        if self.is_initialized() && raised && self.regs.is_event_enabled(eir::RXF) {
            self.drain(true, upper);
        }
    }

    fn service_tx<E: EthIf>(&mut self, raised: bool, upper: &mut E) {
        if self.is_initialized() && raised && self.regs.is_event_enabled(eir::TXF) {
            self.confirm_completed(upper);
        }
    }

    // =========================================================================
    // Periodic Processing
    // =========================================================================

    /// Periodic housekeeping.
    ///
    /// Reports run mode changes to the upper layer on edges only, and the
    /// level of every [`DiagnosticEvent`] on each call. Also replays a
    /// transmit doorbell that may have been lost.
    pub fn main_function<E: EthIf, M: DiagnosticMonitor>(&mut self, upper: &mut E, monitor: &mut M) {
        if !self.is_initialized() {
            return;
        }
        let ctrl = self.config.controller_index;

        let mode = self.mode();
        if mode != self.last_mode {
            self.last_mode = mode;
            upper.ctrl_mode_indication(ctrl, mode);
        }

        if mode == Mode::Active {
            self.replay_doorbell();
        }

        for event in DiagnosticEvent::ALL {
            let failed = self.diagnostic_failed(event);
            monitor.report_diagnostic(ctrl, event, DiagnosticStatus::from_failed(failed));
        }
    }

    fn diagnostic_failed(&self, event: DiagnosticEvent) -> bool {
        let counter = match event {
            DiagnosticEvent::Access => return self.access_failed,
            DiagnosticEvent::RxFramesLost => stat::IEEE_R_DROP,
            DiagnosticEvent::Crc => stat::IEEE_R_CRC,
            DiagnosticEvent::Undersize => stat::RMON_R_UNDERSIZE,
            DiagnosticEvent::Oversize => stat::RMON_R_OVERSIZE,
            DiagnosticEvent::Alignment => stat::IEEE_R_ALIGN,
            DiagnosticEvent::SingleCollision => stat::IEEE_T_1COL,
            DiagnosticEvent::MultipleCollision => stat::IEEE_T_MCOL,
            DiagnosticEvent::LateCollision => stat::IEEE_T_LCOL,
        };
        self.regs.counter(counter) != 0
    }
}

/// Run [`Enet::main_function`] for every controller.
pub fn main_function_all<'a, B, E, M, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>(
    controllers: impl IntoIterator<Item = &'a mut Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>>,
    upper: &mut E,
    monitor: &mut M,
) where
    B: RegisterAccess + 'a,
    E: EthIf,
    M: DiagnosticMonitor,
{
    for enet in controllers {
        enet.main_function(upper, monitor);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
