//! Testing utilities and mock implementations
//!
//! Mocks for running the ENET driver on the host without hardware access.
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::vec::Vec;

use crate::driver::config::Mode;
use crate::driver::notify::{DiagnosticEvent, DiagnosticMonitor, DiagnosticStatus, EthIf, RxFrame};
use crate::internal::ptp::TimeStamp;
use crate::internal::register::RegisterAccess;
use crate::internal::register::enet::{
    ATCR_OFFSET, ATVR_OFFSET, DESCRIPTOR_ACTIVE, ECR_OFFSET, EIR_OFFSET, MIBC_OFFSET,
    MMFR_OFFSET, RDAR_OFFSET, TDAR_OFFSET, atcr, ecr, eir, mibc, mmfr,
};

/// First and last offset of the statistics counter block
const STATS_RANGE: core::ops::RangeInclusive<usize> = 0x200..=0x2FC;

// =============================================================================
// Mock Register Block
// =============================================================================

/// Register file with the side effects the driver relies on.
///
/// - EIR is write-1-to-clear
/// - An MMFR write completes immediately: EIR.MII is raised and read
///   operations latch [`MockRegisters::set_mii_response`] into the data field
/// - ECR.RESET self-clears
/// - ATCR.CAPTURE self-clears and latches the next queued timer value into
///   ATVR; the last queued value repeats. Events armed with
///   [`MockRegisters::raise_after_captures`] are raised after the latch
/// - RDAR/TDAR writes leave the active bit set until the test clears it
/// - MIBC.MIB_CLEAR zeroes the statistics block
#[derive(Debug, Default)]
pub struct MockRegisters {
    registers: RefCell<HashMap<usize, u32>>,
    write_log: RefCell<Vec<(usize, u32)>>,
    mii_response: Cell<u16>,
    mii_stuck: Cell<bool>,
    reset_stuck: Cell<bool>,
    timer_values: RefCell<VecDeque<u32>>,
    capture_events: Cell<Option<(usize, u32)>>,
}

impl MockRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw register value without side effects
    pub fn get(&self, offset: usize) -> u32 {
        self.registers.borrow().get(&offset).copied().unwrap_or(0)
    }

    /// Set a register value without side effects
    pub fn set(&self, offset: usize, value: u32) {
        self.registers.borrow_mut().insert(offset, value);
    }

    /// Raise interrupt event bits as the controller would
    pub fn raise_events(&self, mask: u32) {
        self.set(EIR_OFFSET, self.get(EIR_OFFSET) | mask);
    }

    /// Value returned by the next MII read
    pub fn set_mii_response(&self, value: u16) {
        self.mii_response.set(value);
    }

    /// Never complete management frames
    pub fn set_mii_stuck(&self, stuck: bool) {
        self.mii_stuck.set(stuck);
    }

    /// Never complete a MAC reset
    pub fn set_reset_stuck(&self, stuck: bool) {
        self.reset_stuck.set(stuck);
    }

    /// Queue values returned by successive timer captures
    pub fn queue_timer_values(&self, values: &[u32]) {
        self.timer_values.borrow_mut().extend(values.iter().copied());
    }

    /// Raise `mask` right after the `captures`-th timer capture from now
    pub fn raise_after_captures(&self, captures: usize, mask: u32) {
        self.capture_events.set(Some((captures, mask)));
    }

    /// Let the transmit doorbell go idle
    pub fn clear_tx_active(&self) {
        self.set(TDAR_OFFSET, 0);
    }

    /// All writes in order
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.write_log.borrow().clone()
    }

    /// Writes to one register in order
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.write_log
            .borrow()
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_writes(&self) {
        self.write_log.borrow_mut().clear();
    }

    fn next_timer_value(&self) -> u32 {
        let mut values = self.timer_values.borrow_mut();
        if values.len() > 1 {
            values.pop_front().unwrap_or(0)
        } else {
            values.front().copied().unwrap_or_else(|| self.get(ATVR_OFFSET))
        }
    }
}

impl RegisterAccess for MockRegisters {
    fn read(&self, offset: usize) -> u32 {
        self.get(offset)
    }

    fn write(&self, offset: usize, value: u32) {
        self.write_log.borrow_mut().push((offset, value));
        match offset {
            EIR_OFFSET => self.set(EIR_OFFSET, self.get(EIR_OFFSET) & !value),
            ECR_OFFSET => {
                if value & ecr::RESET != 0 && !self.reset_stuck.get() {
                    self.set(ECR_OFFSET, value & !ecr::RESET);
                } else {
                    self.set(ECR_OFFSET, value);
                }
            }
            MMFR_OFFSET => {
                if value & mmfr::OP_MASK == mmfr::OP_READ {
                    let data = self.mii_response.get() as u32;
                    self.set(MMFR_OFFSET, (value & !mmfr::DATA_MASK) | data);
                } else {
                    self.set(MMFR_OFFSET, value);
                }
                if !self.mii_stuck.get() {
                    self.raise_events(eir::MII);
                }
            }
            ATCR_OFFSET => {
                if value & atcr::CAPTURE != 0 {
                    let captured = self.next_timer_value();
                    self.set(ATVR_OFFSET, captured);
                    match self.capture_events.get() {
                        Some((n, mask)) if n <= 1 => {
                            self.capture_events.set(None);
                            self.raise_events(mask);
                        }
                        Some((n, mask)) => self.capture_events.set(Some((n - 1, mask))),
                        None => {}
                    }
                }
                self.set(ATCR_OFFSET, value & !atcr::CAPTURE);
            }
            RDAR_OFFSET | TDAR_OFFSET => self.set(offset, value & DESCRIPTOR_ACTIVE),
            MIBC_OFFSET => {
                if value & mibc::MIB_CLEAR != 0 {
                    self.registers
                        .borrow_mut()
                        .retain(|o, _| !STATS_RANGE.contains(o));
                }
                self.set(MIBC_OFFSET, value);
            }
            _ => self.set(offset, value),
        }
    }
}

// =============================================================================
// Recording Callbacks
// =============================================================================

/// Copy of a delivered frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedFrame {
    pub ctrl: u8,
    pub ether_type: u16,
    pub is_broadcast: bool,
    pub source: [u8; 6],
    pub payload: Vec<u8>,
    pub timestamp: Option<TimeStamp>,
}

/// Upper layer that records every callback
#[derive(Debug, Default)]
pub struct RecordingEthIf {
    pub received: Vec<ReceivedFrame>,
    pub confirmed: Vec<(u8, usize)>,
    pub modes: Vec<(u8, Mode)>,
}

impl RecordingEthIf {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EthIf for RecordingEthIf {
    fn rx_indication(&mut self, ctrl: u8, frame: &RxFrame<'_>) {
        self.received.push(ReceivedFrame {
            ctrl,
            ether_type: frame.ether_type,
            is_broadcast: frame.is_broadcast,
            source: frame.source,
            payload: frame.payload.to_vec(),
            timestamp: frame.timestamp,
        });
    }

    fn tx_confirmation(&mut self, ctrl: u8, buf_idx: usize) {
        self.confirmed.push((ctrl, buf_idx));
    }

    fn ctrl_mode_indication(&mut self, ctrl: u8, mode: Mode) {
        self.modes.push((ctrl, mode));
    }
}

/// Diagnostic monitor that records every report
#[derive(Debug, Default)]
pub struct RecordingMonitor {
    pub reports: Vec<(u8, DiagnosticEvent, DiagnosticStatus)>,
}

impl RecordingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent status reported for `event`
    pub fn last(&self, event: DiagnosticEvent) -> Option<DiagnosticStatus> {
        self.reports
            .iter()
            .rev()
            .find(|(_, e, _)| *e == event)
            .map(|(_, _, s)| *s)
    }
}

impl DiagnosticMonitor for RecordingMonitor {
    fn report_diagnostic(&mut self, ctrl: u8, event: DiagnosticEvent, status: DiagnosticStatus) {
        self.reports.push((ctrl, event, status));
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting.
#[derive(Debug, Default)]
pub struct MockDelay {
    total_ns: RefCell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    /// Total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += ns as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::enet::PALR_OFFSET;

    #[test]
    fn eir_is_write_one_to_clear() {
        let mock = MockRegisters::new();
        mock.raise_events(eir::RXF | eir::TXF);
        mock.write(EIR_OFFSET, eir::RXF);
        assert_eq!(mock.read(EIR_OFFSET), eir::TXF);
    }

    #[test]
    fn mii_read_latches_response() {
        let mock = MockRegisters::new();
        mock.set_mii_response(0xBEEF);
        mock.write(MMFR_OFFSET, mmfr::ST | mmfr::OP_READ | mmfr::TA);
        assert_eq!(mock.read(MMFR_OFFSET) & mmfr::DATA_MASK, 0xBEEF);
        assert_ne!(mock.read(EIR_OFFSET) & eir::MII, 0);
    }

    #[test]
    fn timer_capture_repeats_last_value() {
        let mock = MockRegisters::new();
        mock.queue_timer_values(&[10, 20]);
        for expected in [10, 20, 20] {
            mock.write(ATCR_OFFSET, atcr::EN | atcr::CAPTURE);
            assert_eq!(mock.read(ATVR_OFFSET), expected);
            assert_eq!(mock.read(ATCR_OFFSET), atcr::EN);
        }
    }

    #[test]
    fn mib_clear_zeroes_statistics_only() {
        let mock = MockRegisters::new();
        mock.set(0x2C8, 7);
        mock.set(PALR_OFFSET, 1);
        mock.write(MIBC_OFFSET, mibc::MIB_CLEAR);
        assert_eq!(mock.read(0x2C8), 0);
        assert_eq!(mock.read(PALR_OFFSET), 1);
    }

    #[test]
    fn write_log_filters_by_register() {
        let mock = MockRegisters::new();
        mock.write(TDAR_OFFSET, DESCRIPTOR_ACTIVE);
        mock.write(PALR_OFFSET, 5);
        mock.write(TDAR_OFFSET, DESCRIPTOR_ACTIVE);
        assert_eq!(mock.writes_to(TDAR_OFFSET).len(), 2);
        assert_eq!(mock.writes().len(), 3);
        assert_eq!(mock.read(TDAR_OFFSET), DESCRIPTOR_ACTIVE);
    }
}
