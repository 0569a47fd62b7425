//! Timestamp utilities

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Convert a filesystem timestamp to unix seconds
pub fn system_time_to_unix_seconds(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_system_time_epoch_is_zero() {
        assert_eq!(system_time_to_unix_seconds(UNIX_EPOCH), 0);
    }

    #[test]
    fn test_system_time_truncates_subseconds() {
        let time = UNIX_EPOCH + Duration::from_millis(1_700_000_000_900);
        assert_eq!(system_time_to_unix_seconds(time), 1_700_000_000);
    }

    #[test]
    fn test_system_time_before_epoch_is_negative() {
        let time = UNIX_EPOCH - Duration::from_secs(60);
        assert_eq!(system_time_to_unix_seconds(time), -60);
    }
}
