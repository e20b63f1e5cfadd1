//! Time utilities for studyhall
//!
//! Provides monotonic time (for elapsed tracking, immune to wall-clock
//! changes) and wall-clock helpers (for session stamps and daily rollover).

use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// Get the current local time.
pub fn now() -> DateTime<Local> {
    Local::now()
}

/// Represents a point in monotonic time for elapsed-time tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonotonicInstant(Instant);

impl MonotonicInstant {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }

    pub fn duration_since(&self, earlier: MonotonicInstant) -> Duration {
        self.0.duration_since(earlier.0)
    }

    /// Returns duration since `earlier`, or zero if `earlier` is in the future
    pub fn saturating_duration_since(&self, earlier: MonotonicInstant) -> Duration {
        if self.0 > earlier.0 {
            self.0.duration_since(earlier.0)
        } else {
            Duration::ZERO
        }
    }
}

impl std::ops::Add<Duration> for MonotonicInstant {
    type Output = MonotonicInstant;

    fn add(self, rhs: Duration) -> Self::Output {
        MonotonicInstant(self.0 + rhs)
    }
}

/// Format elapsed milliseconds as `HH:MM:SS`, zero-padded, unbounded hours.
pub fn format_elapsed(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Calendar-date stamp used for daily rollover comparison.
pub fn day_stamp(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Date portion of a session stamp.
pub fn format_entry_date(dt: &DateTime<Local>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Time-of-day portion of a session stamp.
pub fn format_entry_time(dt: &DateTime<Local>) -> String {
    dt.format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(999), "00:00:00");
        assert_eq!(format_elapsed(1_000), "00:00:01");
        assert_eq!(format_elapsed(65_000), "00:01:05");
        assert_eq!(format_elapsed(3_661_000), "01:01:01");
        // Hours are unbounded, not wrapped at 24
        assert_eq!(format_elapsed(360_000_000), "100:00:00");
    }

    #[test]
    fn test_day_stamp() {
        let dt = Local.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(day_stamp(&dt), "2025-12-25");
    }

    #[test]
    fn test_entry_stamps() {
        let dt = Local.with_ymd_and_hms(2025, 12, 25, 14, 30, 45).unwrap();
        assert_eq!(format_entry_date(&dt), "2025-12-25");
        assert_eq!(format_entry_time(&dt), "14:30:45");
    }

    #[test]
    fn test_monotonic_instant() {
        let t1 = MonotonicInstant::now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = MonotonicInstant::now();

        assert!(t2 > t1);
        assert!(t2.duration_since(t1) >= Duration::from_millis(10));
    }

    #[test]
    fn test_saturating_duration_since() {
        let t1 = MonotonicInstant::now();
        let t2 = t1 + Duration::from_secs(5);

        assert_eq!(t2.saturating_duration_since(t1), Duration::from_secs(5));
        assert_eq!(t1.saturating_duration_since(t2), Duration::ZERO);
    }
}
