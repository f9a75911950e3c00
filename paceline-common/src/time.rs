//! Timestamp and time-display utilities

use chrono::{DateTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format elapsed seconds as a workout clock readout
///
/// Under an hour: `M:SS`; an hour or more: `H:MM:SS`. Negative input
/// is clamped to zero.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800);
    }

    #[test]
    fn test_format_clock_minutes() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.4), "1:05");
        assert_eq!(format_clock(599.9), "9:59");
        assert_eq!(format_clock(600.0), "10:00");
    }

    #[test]
    fn test_format_clock_hours() {
        assert_eq!(format_clock(3600.0), "1:00:00");
        assert_eq!(format_clock(3661.0), "1:01:01");
    }

    #[test]
    fn test_format_clock_clamps_negative() {
        assert_eq!(format_clock(-5.0), "0:00");
    }
}
