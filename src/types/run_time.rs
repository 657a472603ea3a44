// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Human-readable run-time formatting.
//!
//! Average run times are shown on the hub as compact text such as
//! `"1m 30s"` or `"2h 5m"`.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use particle_bridge::types::format_run_time;
//!
//! assert_eq!(format_run_time(Duration::ZERO), "0ms");
//! assert_eq!(format_run_time(Duration::from_millis(1500)), "1.5s");
//! assert_eq!(format_run_time(Duration::from_secs(90)), "1m 30s");
//! ```

use std::fmt::Write as _;
use std::time::Duration;

const MS_PER_SECOND: u128 = 1_000;
const MS_PER_MINUTE: u128 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u128 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u128 = 24 * MS_PER_HOUR;

/// Formats a duration as compact text.
///
/// Sub-second durations are shown in milliseconds. Longer durations are
/// split into days, hours, minutes and seconds, omitting zero units;
/// seconds keep one decimal (truncated) when it is non-zero.
#[must_use]
pub fn format_run_time(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms < MS_PER_SECOND {
        return format!("{ms}ms");
    }

    let mut parts = Vec::with_capacity(4);
    let days = ms / MS_PER_DAY;
    let hours = (ms % MS_PER_DAY) / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let tenths = (ms % MS_PER_MINUTE) / 100;

    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if tenths > 0 {
        let mut seconds = (tenths / 10).to_string();
        if tenths % 10 != 0 {
            let _ = write!(seconds, ".{}", tenths % 10);
        }
        seconds.push('s');
        parts.push(seconds);
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_in_millis() {
        assert_eq!(format_run_time(Duration::from_millis(0)), "0ms");
        assert_eq!(format_run_time(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn whole_seconds() {
        assert_eq!(format_run_time(Duration::from_secs(2)), "2s");
        assert_eq!(format_run_time(Duration::from_secs(4)), "4s");
    }

    #[test]
    fn fractional_seconds_truncate() {
        assert_eq!(format_run_time(Duration::from_millis(2_345)), "2.3s");
    }

    #[test]
    fn mixed_units_skip_zeroes() {
        assert_eq!(format_run_time(Duration::from_secs(3_723)), "1h 2m 3s");
        assert_eq!(format_run_time(Duration::from_secs(7_200)), "2h");
        assert_eq!(format_run_time(Duration::from_secs(93_600)), "1d 2h");
    }

    #[test]
    fn sub_second_remainder_above_a_minute() {
        assert_eq!(format_run_time(Duration::from_millis(60_050)), "1m");
    }
}
