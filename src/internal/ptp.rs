//! IEEE 1588 time arithmetic.
//!
//! The controller counts nanoseconds in a 32-bit register that wraps once
//! per second. Seconds are kept in software as a 48-bit value split into a
//! 16-bit high part and a 32-bit low part, matching the PTP timestamp
//! format. Everything here is pure and independent of the hardware.

use crate::internal::constants::NANOS_PER_SECOND;

const SECONDS_MASK: u64 = (1 << 48) - 1;

/// PTP timestamp: 48-bit seconds and nanoseconds within the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeStamp {
    /// Upper 16 bits of the seconds field
    pub seconds_hi: u16,
    /// Lower 32 bits of the seconds field
    pub seconds: u32,
    /// Nanoseconds, always below one second
    pub nanoseconds: u32,
}

impl TimeStamp {
    /// Zero time
    pub const ZERO: Self = Self {
        seconds_hi: 0,
        seconds: 0,
        nanoseconds: 0,
    };

    /// Build a timestamp from 48-bit seconds and nanoseconds. Excess
    /// nanoseconds carry into the seconds.
    #[must_use]
    pub const fn new(seconds: u64, nanoseconds: u32) -> Self {
        let seconds = seconds + (nanoseconds / NANOS_PER_SECOND) as u64;
        Self::from_parts(seconds, nanoseconds % NANOS_PER_SECOND)
    }

    const fn from_parts(seconds: u64, nanoseconds: u32) -> Self {
        let seconds = seconds & SECONDS_MASK;
        Self {
            seconds_hi: (seconds >> 32) as u16,
            seconds: seconds as u32,
            nanoseconds,
        }
    }

    /// Combined 48-bit seconds value.
    #[inline(always)]
    #[must_use]
    pub const fn total_seconds(&self) -> u64 {
        ((self.seconds_hi as u64) << 32) | self.seconds as u64
    }

    /// Advance by one second, carrying into the high part.
    pub fn increment_second(&mut self) {
        let (seconds, carry) = self.seconds.overflowing_add(1);
        self.seconds = seconds;
        if carry {
            self.seconds_hi = self.seconds_hi.wrapping_add(1);
        }
    }

    /// Go back one second, borrowing from the high part.
    pub fn decrement_second(&mut self) {
        let (seconds, borrow) = self.seconds.overflowing_sub(1);
        self.seconds = seconds;
        if borrow {
            self.seconds_hi = self.seconds_hi.wrapping_sub(1);
        }
    }

    /// Apply a signed offset, propagating carry and borrow from the
    /// nanoseconds through both seconds fields. Wraps at 48 bits.
    #[must_use]
    pub fn apply_offset(&self, offset: &TimeInterval) -> Self {
        let delta = offset.timestamp;
        let delta_seconds =
            delta.total_seconds() + (delta.nanoseconds / NANOS_PER_SECOND) as u64;
        let delta_nanos = delta.nanoseconds % NANOS_PER_SECOND;

        if offset.negative {
            let (nanos, borrow) = if self.nanoseconds < delta_nanos {
                (self.nanoseconds + NANOS_PER_SECOND - delta_nanos, 1)
            } else {
                (self.nanoseconds - delta_nanos, 0)
            };
            let seconds = self
                .total_seconds()
                .wrapping_sub(delta_seconds)
                .wrapping_sub(borrow);
            Self::from_parts(seconds, nanos)
        } else {
            let mut nanos = self.nanoseconds + delta_nanos;
            let mut carry = 0;
            if nanos >= NANOS_PER_SECOND {
                nanos -= NANOS_PER_SECOND;
                carry = 1;
            }
            let seconds = self
                .total_seconds()
                .wrapping_add(delta_seconds)
                .wrapping_add(carry);
            Self::from_parts(seconds, nanos)
        }
    }
}

/// Signed time difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeInterval {
    /// Magnitude
    pub timestamp: TimeStamp,
    /// Sign
    pub negative: bool,
}

impl TimeInterval {
    /// Positive interval.
    #[must_use]
    pub const fn positive(timestamp: TimeStamp) -> Self {
        Self {
            timestamp,
            negative: false,
        }
    }

    /// Negative interval.
    #[must_use]
    pub const fn negative(timestamp: TimeStamp) -> Self {
        Self {
            timestamp,
            negative: true,
        }
    }

    /// Signed length in nanoseconds, saturating at the `i64` range.
    #[must_use]
    pub fn as_nanos(&self) -> i64 {
        let seconds = self.timestamp.total_seconds() as i64;
        let magnitude = seconds
            .saturating_mul(NANOS_PER_SECOND as i64)
            .saturating_add(self.timestamp.nanoseconds as i64);
        if self.negative { -magnitude } else { magnitude }
    }
}

/// Elapsed local and master time over the same synchronization window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateRatio {
    /// Local (ingress) time elapsed
    pub ingress_delta: TimeInterval,
    /// Master (origin) time elapsed
    pub origin_delta: TimeInterval,
}

/// Timer rate correction: adjust the increment by `delta` nanoseconds once
/// every `period` timer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateCorrection {
    /// Ticks between corrections (ATCOR); zero disables correction
    pub period: u32,
    /// Signed adjustment applied to the increment on a correction tick
    pub delta: i32,
}

impl RateCorrection {
    /// No correction
    pub const NONE: Self = Self {
        period: 0,
        delta: 0,
    };

    /// Increment to use on correction ticks, limited to the ATINC field.
    #[must_use]
    pub const fn corrected_increment(&self, increment: u8, max: u8) -> u8 {
        let value = increment as i32 + self.delta;
        if value < 0 {
            0
        } else if value > max as i32 {
            max
        } else {
            value as u8
        }
    }
}

/// Largest per-tick correction magnitude.
pub const MAX_CORRECTION_STEP: u32 = 127;

/// Signed 64-bit division truncating toward zero.
///
/// A zero divisor yields -1 (all bits set). Positive power-of-two divisors
/// use an arithmetic shift, which rounds negative quotients toward negative
/// infinity.
#[must_use]
pub const fn div_s64(dividend: i64, divisor: i64) -> i64 {
    if divisor == 0 {
        return -1;
    }
    if divisor > 0 && divisor.count_ones() == 1 {
        return dividend >> divisor.trailing_zeros();
    }

    let negative = (dividend < 0) != (divisor < 0);
    let numerator = dividend.unsigned_abs();
    let denominator = divisor.unsigned_abs();

    let mut quotient: u64 = 0;
    let mut remainder: u64 = 0;
    let mut bit = 64;
    while bit > 0 {
        bit -= 1;
        remainder = (remainder << 1) | ((numerator >> bit) & 1);
        if remainder >= denominator {
            remainder -= denominator;
            quotient |= 1 << bit;
        }
    }

    if negative {
        (quotient as i64).wrapping_neg()
    } else {
        quotient as i64
    }
}

/// Frequency offset of the local clock in parts per billion. Positive when
/// the local clock runs slow relative to the master.
#[must_use]
pub fn drift_ppb(ingress_ns: i64, origin_ns: i64) -> i64 {
    let diff = origin_ns.saturating_sub(ingress_ns);
    div_s64(diff.saturating_mul(NANOS_PER_SECOND as i64), ingress_ns)
}

/// Pick the timer correction for the measured deltas.
///
/// `tick_hz` is the timer tick rate. A drift that one nanosecond every N
/// ticks can absorb is corrected that way; a larger drift corrects every
/// tick by up to [`MAX_CORRECTION_STEP`] nanoseconds.
#[must_use]
pub fn rate_correction(ingress_ns: i64, origin_ns: i64, tick_hz: u32) -> RateCorrection {
    if ingress_ns <= 0 || tick_hz == 0 {
        return RateCorrection::NONE;
    }
    let drift = drift_ppb(ingress_ns, origin_ns);
    if drift == 0 {
        return RateCorrection::NONE;
    }

    let sign = if drift < 0 { -1 } else { 1 };
    let magnitude = drift.unsigned_abs();
    let period = tick_hz as u64 / magnitude;
    if period >= 1 {
        RateCorrection {
            period: period as u32,
            delta: sign,
        }
    } else {
        let step = (magnitude / tick_hz as u64).min(MAX_CORRECTION_STEP as u64);
        RateCorrection {
            period: 1,
            delta: sign * step as i32,
        }
    }
}
