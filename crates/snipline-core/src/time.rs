//! Time representation for cut-accurate editing
//!
//! Offsets are stored as rational seconds so that range arithmetic
//! (`end - start`, summed segment durations) stays exact. Float input is
//! quantized to microseconds on the way in.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Denominator used when converting float seconds.
const PRECISION: i64 = 1_000_000;

/// A second offset into a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimePoint {
    value: Rational64,
}

impl TimePoint {
    /// Zero offset.
    pub const ZERO: Self = Self {
        value: Rational64::new_raw(0, 1),
    };

    /// Create a time point of `numerator / denominator` seconds.
    #[inline]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            value: Rational64::new(numerator, denominator),
        }
    }

    /// Create a time point from whole seconds.
    #[inline]
    pub fn from_secs(seconds: i64) -> Self {
        Self::new(seconds, 1)
    }

    /// Create a time point from float seconds, rounded to the microsecond.
    ///
    /// Non-finite input maps to zero; callers that care must check
    /// `f64::is_finite` first.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        if !seconds.is_finite() {
            return Self::ZERO;
        }
        Self::new((seconds * PRECISION as f64).round() as i64, PRECISION)
    }

    /// Convert to float seconds.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        *self.value.numer() as f64 / *self.value.denom() as f64
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        *self.value.numer() == 0
    }

    #[inline]
    pub fn is_negative(self) -> bool {
        *self.value.numer() < 0
    }

    /// Clamp into `[lo, hi]`.
    pub fn clamp_to(self, lo: Self, hi: Self) -> Self {
        if self < lo {
            lo
        } else if self > hi {
            hi
        } else {
            self
        }
    }
}

impl Default for TimePoint {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for TimePoint {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
        }
    }
}

impl Sub for TimePoint {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
        }
    }
}

impl std::iter::Sum for TimePoint {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, t| acc + t)
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_seconds_f64())
    }
}

/// A half-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimePoint,
    pub end: TimePoint,
}

impl TimeRange {
    #[inline]
    pub fn new(start: TimePoint, end: TimePoint) -> Self {
        Self { start, end }
    }

    /// Create a range from a start and a duration.
    #[inline]
    pub fn with_duration(start: TimePoint, duration: TimePoint) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    #[inline]
    pub fn duration(self) -> TimePoint {
        self.end - self.start
    }

    /// True when the range covers no time.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn contains(self, time: TimePoint) -> bool {
        time >= self.start && time < self.end
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Compute the intersection of two ranges, if any.
    pub fn intersection(self, other: Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Self::new(
            self.start.max(other.start),
            self.end.min(other.end),
        ))
    }

    /// Shift both ends by `offset`.
    pub fn shifted(self, offset: TimePoint) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Shift both ends back by `offset`.
    pub fn shifted_back(self, offset: TimePoint) -> Self {
        Self::new(self.start - offset, self.end - offset)
    }
}

/// Render a playback position as `m:ss`, the format of the transport label.
pub fn format_position(time: TimePoint) -> String {
    let millis = (time.to_seconds_f64().max(0.0) * 1000.0).floor() as u64;
    format!("{}:{:02}", millis / 60_000, (millis / 1000) % 60)
}

/// Parse an FFmpeg `HH:MM:SS.ff` timecode.
///
/// Returns `None` for `N/A`, negative, or otherwise malformed values.
pub fn parse_timecode(timecode: &str) -> Option<TimePoint> {
    let mut parts = timecode.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    let whole = (hours * 3600 + minutes * 60) as i64;
    Some(TimePoint::from_secs(whole) + TimePoint::from_seconds_f64(seconds))
}
