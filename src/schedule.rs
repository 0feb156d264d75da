// ABOUTME: Daily wall-clock scheduling for the review pass
// ABOUTME: Computes the next local occurrence of HH:MM and sleeps until it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Grocery Tracker Contributors

//! Wall-clock daily schedule.
//!
//! `next_occurrence` is pure so the rollover logic is testable; the loop in
//! the binary re-resolves local time after every wakeup, which keeps the
//! schedule correct across DST transitions without special casing.

use chrono::{DateTime, Duration, Local, NaiveTime};
use tracing::warn;

/// The next local occurrence of `hour:minute` strictly after `now`.
///
/// Falls back to 24 hours from `now` when the target time cannot be
/// represented (skipped during a DST spring-forward).
pub fn next_occurrence(now: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
    let Some(target_time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        warn!(hour, minute, "invalid schedule time, deferring one day");
        return now + Duration::days(1);
    };

    for day_offset in 0..=2 {
        let date = now.date_naive() + Duration::days(day_offset);
        let candidate = date.and_time(target_time);
        if let Some(resolved) = candidate.and_local_timezone(Local).earliest() {
            if resolved > now {
                return resolved;
            }
        }
    }
    now + Duration::days(1)
}

/// Duration from `now` until the next occurrence, for `tokio::time::sleep`
pub fn sleep_until_next(now: DateTime<Local>, hour: u32, minute: u32) -> std::time::Duration {
    let next = next_occurrence(now, hour, minute);
    (next - now)
        .to_std()
        .unwrap_or(std::time::Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_same_day_when_time_is_ahead() {
        let now = local(2025, 8, 24, 9, 0);
        let next = next_occurrence(now, 16, 0);
        assert_eq!(next, local(2025, 8, 24, 16, 0));
    }

    #[test]
    fn test_next_day_when_time_has_passed() {
        let now = local(2025, 8, 24, 17, 30);
        let next = next_occurrence(now, 16, 0);
        assert_eq!(next, local(2025, 8, 25, 16, 0));
    }

    #[test]
    fn test_exact_hit_schedules_tomorrow() {
        let now = local(2025, 8, 24, 16, 0);
        let next = next_occurrence(now, 16, 0);
        assert_eq!(next, local(2025, 8, 25, 16, 0));
    }

    #[test]
    fn test_sleep_duration_positive() {
        let now = local(2025, 8, 24, 15, 59);
        let dur = sleep_until_next(now, 16, 0);
        assert_eq!(dur, std::time::Duration::from_secs(60));
    }
}
