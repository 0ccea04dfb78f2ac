//! Clock traits the hub is generic over.
//!
//! The hub never sleeps or arms timers itself. It compares instants handed out
//! by a [`TimeSource`] and reports back how long the caller may wait.

/// Clock the hub polls on every call to `service`.
pub trait TimeSource<I: TimeInstant> {
    /// Current instant. Must never go backwards.
    fn now(&self) -> I;
}

/// Span of time used for the startup delay and the refresh interval.
pub trait TimeDuration: Copy + PartialEq {
    const ZERO: Self;

    /// Whole milliseconds, used for comparisons.
    fn as_millis(&self) -> u64;

    fn from_millis(millis: u64) -> Self;

    /// `self - other`, clamped at [`ZERO`](Self::ZERO).
    fn saturating_sub(self, other: Self) -> Self;
}

/// Point in time handed out by a [`TimeSource`].
pub trait TimeInstant: Copy {
    type Duration: TimeDuration;

    /// Time passed since `earlier`, or zero if `earlier` is in the future.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Returns true once at least `duration` has passed since `earlier`.
    #[inline]
    fn has_elapsed(&self, earlier: Self, duration: Self::Duration) -> bool {
        self.duration_since(earlier).as_millis() >= duration.as_millis()
    }

    /// Time left until `duration` has passed since `earlier` (ZERO if already due).
    #[inline]
    fn remaining(&self, earlier: Self, duration: Self::Duration) -> Self::Duration {
        duration.saturating_sub(self.duration_since(earlier))
    }
}


#[cfg(feature = "embassy-time")]
mod embassy {
    use super::{TimeDuration, TimeInstant, TimeSource};
    use embassy_time::{Duration, Instant};

    impl TimeDuration for Duration {
        const ZERO: Self = Duration::from_ticks(0);

        fn as_millis(&self) -> u64 {
            Duration::as_millis(self)
        }

        fn from_millis(millis: u64) -> Self {
            Duration::from_millis(millis)
        }

        fn saturating_sub(self, other: Self) -> Self {
            Duration::from_ticks(self.as_ticks().saturating_sub(other.as_ticks()))
        }
    }

    impl TimeInstant for Instant {
        type Duration = Duration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            self.checked_duration_since(earlier).unwrap_or(Duration::from_ticks(0))
        }
    }

    /// Time source reading the global embassy time driver.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl TimeSource<Instant> for SystemClock {
        fn now(&self) -> Instant {
            Instant::now()
        }
    }

}

#[cfg(feature = "embassy-time")]
pub use embassy::SystemClock;
