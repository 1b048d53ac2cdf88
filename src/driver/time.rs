//! IEEE 1588 timer control.
//!
//! The hardware counts nanoseconds and wraps once per second, raising
//! `EIR.TS_TIMER`. Seconds are extended in software: the wrap is folded
//! into the stored [`TimeStamp`] either by [`Enet::timer_irq_handler`] or
//! lazily whenever time is read.
//!
//! All updates to the stored time happen inside a critical section so the
//! timer interrupt never observes a half-written value.

use critical_section::CriticalSection;

use super::enet::Enet;
use super::error::{ConfigError, IoError, Result};
use crate::internal::constants::{MAX_TIMER_INCREMENT, NANOS_PER_SECOND, TIME_CAPTURE_SPIN_LIMIT};
use crate::internal::ptp::{RateCorrection, RateRatio, TimeInterval, TimeStamp, rate_correction};
use crate::internal::register::RegisterAccess;
use crate::internal::register::enet::{ATCOR_MASK, atcr, eir};

impl<B: RegisterAccess, const RX_BUFS: usize, const TX_BUFS: usize, const BUF_SIZE: usize>
    Enet<B, RX_BUFS, TX_BUFS, BUF_SIZE>
{
    /// Restart the 1588 timer from zero with the given increment.
    pub(super) fn start_timer(&mut self, increment: u8) {
        self.regs.set_atcr(atcr::RESTART);
        self.regs.set_atvr(0);
        self.regs.set_atper(NANOS_PER_SECOND);
        self.regs
            .set_timer_increment(increment as u32, increment as u32);
        self.regs.set_atcor(0);
        self.regs.set_atcr(atcr::EN | atcr::PEREN);
        self.regs.take_events(eir::TS_TIMER);
        critical_section::with(|cs| self.time.borrow(cs).set(TimeStamp::ZERO));
    }

    fn ensure_timestamping(&self) -> Result<()> {
        self.ensure_initialized()?;
        if self.config.timestamping {
            Ok(())
        } else {
            Err(IoError::InvalidState.into())
        }
    }

    /// Latch the running counter into ATVR and read it.
    ///
    /// On timeout the stale ATVR value is returned.
    fn capture(&self) -> u32 {
        self.regs.set_atcr(self.regs.atcr() | atcr::CAPTURE);
        for _ in 0..TIME_CAPTURE_SPIN_LIMIT {
            if !self.regs.is_capture_pending() {
                break;
            }
            core::hint::spin_loop();
        }
        self.regs.atvr()
    }

    /// Fold a pending counter wrap into the stored seconds.
    fn service_wrap(&self, cs: CriticalSection<'_>) -> bool {
        if self.regs.take_events(eir::TS_TIMER) == 0 {
            return false;
        }
        let state = self.time.borrow(cs);
        let mut now = state.get();
        now.increment_second();
        state.set(now);
        true
    }

    /// Timer interrupt entry point.
    ///
    /// Call from the ENET timer interrupt; advances the stored seconds once
    /// per hardware wrap.
    pub fn timer_irq_handler(&mut self) {
        if !self.is_initialized() || !self.config.timestamping {
            return;
        }
        critical_section::with(|cs| {
            self.service_wrap(cs);
        });
    }

    /// Extend a captured nanosecond value to a full timestamp.
    ///
    /// The live counter is captured and any pending wrap folded in. A live
    /// value below the captured one means the counter wrapped after the
    /// capture, so the capture belongs to the previous second.
    pub(super) fn reconcile(&self, captured: u32) -> Result<TimeStamp> {
        if captured >= NANOS_PER_SECOND {
            return Err(IoError::InvalidState.into());
        }
        Ok(critical_section::with(|cs| self.reconcile_in(cs, captured)))
    }

    fn reconcile_in(&self, cs: CriticalSection<'_>, captured: u32) -> TimeStamp {
        let live = self.capture();
        let mut now = self.time.borrow(cs).get();
        if self.service_wrap(cs) {
            now.increment_second();
            // Wrap raised after the live capture was taken.
            if live >= NANOS_PER_SECOND / 2 {
                now.decrement_second();
            }
        }
        if live < captured {
            now.decrement_second();
        }
        now.nanoseconds = captured;
        now
    }

    /// Current 1588 time.
    ///
    /// Both counter captures happen inside one critical section, so the
    /// timer interrupt cannot fold a wrap in between.
    ///
    /// # Errors
    /// - `InvalidState` - timestamping disabled
    pub fn current_time(&mut self) -> Result<TimeStamp> {
        self.ensure_timestamping()?;
        Ok(critical_section::with(|cs| {
            let first = self.capture().min(NANOS_PER_SECOND - 1);
            self.reconcile_in(cs, first)
        }))
    }

    /// Set the 1588 time.
    ///
    /// # Errors
    /// - `InvalidState` - timestamping disabled
    /// - `InvalidConfig` - nanoseconds not below one second
    pub fn set_global_time(&mut self, time: &TimeStamp) -> Result<()> {
        self.ensure_timestamping()?;
        if time.nanoseconds >= NANOS_PER_SECOND {
            return Err(ConfigError::InvalidConfig.into());
        }
        critical_section::with(|cs| {
            self.regs.set_atvr(time.nanoseconds);
            self.regs.take_events(eir::TS_TIMER);
            self.time.borrow(cs).set(*time);
        });

        #[cfg(feature = "defmt")]
        defmt::debug!("ENET{} time set to {}", self.config.controller_index, time);

        Ok(())
    }

    /// Step the 1588 time by `offset` and adjust its rate.
    ///
    /// # Errors
    /// - `InvalidState` - timestamping disabled
    pub fn set_correction_time(
        &mut self,
        offset: &TimeInterval,
        rate: &RateRatio,
    ) -> Result<RateCorrection> {
        let now = self.current_time()?;
        let target = now.apply_offset(offset);
        critical_section::with(|cs| {
            self.regs.set_atvr(target.nanoseconds);
            self.regs.take_events(eir::TS_TIMER);
            self.time.borrow(cs).set(target);
        });
        self.correct_rate(rate)
    }

    /// Adjust the timer rate from a measured rate ratio.
    ///
    /// Identical deltas, or a zero ingress delta, program no correction.
    ///
    /// # Errors
    /// - `InvalidState` - timestamping disabled
    pub fn correct_rate(&mut self, rate: &RateRatio) -> Result<RateCorrection> {
        self.ensure_timestamping()?;

        let ingress = rate.ingress_delta.as_nanos();
        let origin = rate.origin_delta.as_nanos();
        let correction = rate_correction(ingress, origin, self.config.timer_tick_hz());

        let increment = self.config.timer_increment;
        let corrected = correction.corrected_increment(increment, MAX_TIMER_INCREMENT);
        self.regs
            .set_timer_increment(increment as u32, corrected as u32);
        self.regs.set_atcor(correction.period & ATCOR_MASK);

        Ok(correction)
    }
}
