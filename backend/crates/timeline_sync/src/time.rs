//! Time values exchanged with the timeline widget
//!
//! The widget works in epoch milliseconds. `TimeMs` wraps one instant,
//! `DateRange` a window between two of them.

use crate::error::{Result, TimelineError};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

pub const MS_PER_SECOND: i64 = 1_000;
pub const MS_PER_HOUR: i64 = 3_600_000;

/// Milliseconds since the Unix epoch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TimeMs(pub i64);

impl TimeMs {
    pub fn from_millis(millis: i64) -> Self {
        TimeMs(millis)
    }

    pub fn now() -> Self {
        let millis = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_millis() as i64,
            Err(before_epoch) => -(before_epoch.duration().as_millis() as i64),
        };
        TimeMs(millis)
    }

    pub fn millis(self) -> i64 {
        self.0
    }

    pub fn add_millis(self, millis: i64) -> TimeMs {
        TimeMs(self.0.saturating_add(millis))
    }

    pub fn sub_millis(self, millis: i64) -> TimeMs {
        TimeMs(self.0.saturating_sub(millis))
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<i64> for TimeMs {
    fn from(millis: i64) -> Self {
        TimeMs(millis)
    }
}

/// A window of time as the client renders it. Ranges reported by the client
/// are taken as-is; ranges requested by the application go through
/// [`DateRange::checked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct DateRange {
    start: TimeMs,
    end: TimeMs,
}

impl DateRange {
    pub fn new(start: TimeMs, end: TimeMs) -> Self {
        Self { start, end }
    }

    /// Fails with `InvalidWindow` unless `start < end`.
    pub fn checked(start: TimeMs, end: TimeMs) -> Result<Self> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(TimelineError::InvalidWindow { start, end })
        }
    }

    /// The window of `millis` length starting at `start`.
    pub fn starting_at(start: TimeMs, millis: i64) -> Self {
        Self::new(start, start.add_millis(millis))
    }

    pub fn start(&self) -> TimeMs {
        self.start
    }

    pub fn end(&self) -> TimeMs {
        self.end
    }

    pub fn span_millis(&self) -> i64 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn center(&self) -> TimeMs {
        self.start.add_millis(self.span_millis() / 2)
    }

    pub fn contains(&self, time: TimeMs) -> bool {
        self.start <= time && time <= self.end
    }

    /// Grows the range on both sides by half of `factor` times its span.
    /// Negative and NaN factors leave the range unchanged.
    pub fn expanded(&self, factor: f64) -> DateRange {
        let factor = clamp_factor(factor);
        let expand_millis = ((self.span_millis() as f64 * factor) as i64) / 2;
        DateRange::new(
            self.start.sub_millis(expand_millis),
            self.end.add_millis(expand_millis),
        )
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}

pub(crate) fn clamp_factor(factor: f64) -> f64 {
    if factor.is_nan() { 0.0 } else { factor.max(0.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_rejects_empty_and_inverted() {
        assert!(DateRange::checked(TimeMs(0), TimeMs(1)).is_ok());
        assert_eq!(
            DateRange::checked(TimeMs(5), TimeMs(5)),
            Err(TimelineError::InvalidWindow {
                start: TimeMs(5),
                end: TimeMs(5)
            })
        );
        assert!(DateRange::checked(TimeMs(6), TimeMs(5)).is_err());
    }

    #[test]
    fn test_expanded_window() {
        let t0 = 1_700_000_000_000;
        let range = DateRange::new(TimeMs(t0), TimeMs(t0 + 60_000));

        let expanded = range.expanded(0.2);
        assert_eq!(expanded.start(), TimeMs(t0 - 6_000));
        assert_eq!(expanded.end(), TimeMs(t0 + 66_000));

        assert_eq!(range.expanded(0.0), range);
        assert_eq!(range.expanded(-1.0), range);
        assert_eq!(range.expanded(f64::NAN), range);
    }

    #[test]
    fn test_range_helpers() {
        let range = DateRange::starting_at(TimeMs(1_000), 8 * MS_PER_HOUR);
        assert_eq!(range.span_millis(), 8 * MS_PER_HOUR);
        assert_eq!(range.center(), TimeMs(1_000 + 4 * MS_PER_HOUR));
        assert!(range.contains(TimeMs(1_000)));
        assert!(range.contains(range.end()));
        assert!(!range.contains(TimeMs(999)));
        assert_eq!(range.to_string(), "[1000ms .. 28801000ms]");
    }
}

/// Property tests for window expansion
#[cfg(test)]
mod proptest_expansion {
    use super::*;
    use proptest::prelude::*;

    const LIMIT: i64 = 1_000_000_000_000;

    proptest! {
        #[test]
        fn expansion_is_symmetric_and_proportional(
            start in -LIMIT..LIMIT,
            span in 1i64..LIMIT,
            factor in 0.0f64..4.0,
        ) {
            let window = DateRange::starting_at(TimeMs(start), span);
            let expanded = window.expanded(factor);
            let grow = ((span as f64 * factor) as i64) / 2;

            prop_assert_eq!(expanded.start(), TimeMs(start - grow));
            prop_assert_eq!(expanded.end(), TimeMs(start + span + grow));
            prop_assert!(expanded.span_millis() >= window.span_millis());
            prop_assert_eq!(
                window.start().millis() - expanded.start().millis(),
                expanded.end().millis() - window.end().millis()
            );
        }

        #[test]
        fn negative_factor_leaves_window_unchanged(
            start in -LIMIT..LIMIT,
            span in 1i64..LIMIT,
            factor in -4.0f64..0.0,
        ) {
            let window = DateRange::starting_at(TimeMs(start), span);
            prop_assert_eq!(window.expanded(factor), window);
        }
    }
}
