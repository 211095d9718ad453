//! Story clock helpers.
//!
//! The engine keeps no timers. Consumers tick on their own schedule and
//! format the time since the story started with these pure functions.

use std::time::{Duration, Instant};

/// Returns how long the story has been running at `now`, saturating at zero.
#[inline]
pub fn elapsed_since(now: Instant, started_at: Instant) -> Duration {
    now.saturating_duration_since(started_at)
}

/// Formats whole seconds as zero-padded `MM:SS`.
///
/// Minutes keep counting past an hour, so `3600` renders as `60:00`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(3599), "59:59");
        assert_eq!(format_elapsed(3600), "60:00");
        assert_eq!(format_elapsed(6000), "100:00");
    }

    #[test]
    fn test_elapsed_since() {
        let started_at = Instant::now();
        let now = started_at + Duration::from_millis(65_900);
        assert_eq!(elapsed_since(now, started_at).as_secs(), 65);
        assert_eq!(elapsed_since(started_at, now), Duration::ZERO);
    }
}
