// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sliding-window duty-cycle counter.
//!
//! A [`DutyCycleCounter`] records the on-periods of a binary signal and
//! answers two questions about the recent past: how many times the signal
//! was switched on, and how long it stayed on on average. Only intervals
//! whose start lies inside the retention window take part in either answer.
//!
//! Time comes from tokio's clock, so tests can pause and advance it. Every
//! operation also has an `*_at` variant that takes an explicit instant.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use particle_bridge::counter::DutyCycleCounter;
//!
//! let mut counter = DutyCycleCounter::new(Duration::from_secs(10));
//! let t0 = Instant::now();
//!
//! counter.start_event_at(t0);
//! counter.stop_event_at(t0 + Duration::from_secs(2));
//!
//! let now = t0 + Duration::from_secs(3);
//! assert_eq!(counter.number_of_events_at(now), 1);
//! assert_eq!(counter.average_run_time_at(now), Some(Duration::from_secs(2)));
//! ```

use std::collections::VecDeque;
use std::time::Duration;

use tokio::time::Instant;

use crate::types::format_run_time;

/// One on-period of a monitored signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: Instant,
    stop: Option<Instant>,
}

impl Interval {
    /// When the signal switched on.
    #[must_use]
    pub fn start(&self) -> Instant {
        self.start
    }

    /// When the signal switched off, or `None` while it is still on.
    #[must_use]
    pub fn stop(&self) -> Option<Instant> {
        self.stop
    }

    /// Returns true while the interval has not been closed.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stop.is_none()
    }

    /// Length of a closed interval.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.stop.map(|stop| stop.saturating_duration_since(self.start))
    }
}

/// Sliding-window tracker of on/off intervals for one binary signal.
///
/// Invariants:
/// - at most one interval is open, and it is always the most recent one;
/// - intervals are kept in non-decreasing start order;
/// - a closed interval never stops before it starts.
///
/// [`start_event`](Self::start_event) while the signal is already on and
/// [`stop_event`](Self::stop_event) while it is already off are no-ops, so
/// duplicate or missed edge reports cannot stack open intervals.
///
/// The counter is not synchronized; it is owned and mutated by a single
/// device task.
#[derive(Debug, Clone)]
pub struct DutyCycleCounter {
    window: Duration,
    intervals: VecDeque<Interval>,
}

impl DutyCycleCounter {
    /// Window used by heater devices: the last 24 hours.
    pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    /// Creates an empty counter with the given retention window.
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            intervals: VecDeque::new(),
        }
    }

    /// Returns the retention window.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns all retained intervals, oldest first.
    pub fn intervals(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    /// Returns true while the most recent interval is still open.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.intervals.back().is_some_and(Interval::is_open)
    }

    /// Opens a new interval now.
    ///
    /// Returns false (and records nothing) if an interval is already open.
    pub fn start_event(&mut self) -> bool {
        self.start_event_at(Instant::now())
    }

    /// Opens a new interval at `now`.
    pub fn start_event_at(&mut self, now: Instant) -> bool {
        if self.is_running() {
            return false;
        }
        // Keep start order monotonic even if the caller's clock steps back.
        let start = self
            .intervals
            .back()
            .and_then(Interval::stop)
            .map_or(now, |last_stop| now.max(last_stop));
        self.intervals.push_back(Interval { start, stop: None });
        true
    }

    /// Closes the open interval now.
    ///
    /// Returns false if no interval was open.
    pub fn stop_event(&mut self) -> bool {
        self.stop_event_at(Instant::now())
    }

    /// Closes the open interval at `now`.
    pub fn stop_event_at(&mut self, now: Instant) -> bool {
        match self.intervals.back_mut() {
            Some(last) if last.is_open() => {
                last.stop = Some(now.max(last.start));
                true
            }
            _ => false,
        }
    }

    /// Drives the counter from an observed signal level.
    ///
    /// `true` opens an interval unless one is open; `false` closes the open
    /// interval, if any. Returns true if the counter changed.
    pub fn record(&mut self, on: bool) -> bool {
        self.record_at(on, Instant::now())
    }

    /// Drives the counter from an observed signal level at `now`.
    pub fn record_at(&mut self, on: bool, now: Instant) -> bool {
        if on {
            self.start_event_at(now)
        } else {
            self.stop_event_at(now)
        }
    }

    /// Number of intervals (open or closed) that started within the window.
    #[must_use]
    pub fn number_of_events(&self) -> usize {
        self.number_of_events_at(Instant::now())
    }

    /// Number of intervals that started within the window ending at `now`.
    #[must_use]
    pub fn number_of_events_at(&self, now: Instant) -> usize {
        self.intervals
            .iter()
            .filter(|interval| self.in_window(interval, now))
            .count()
    }

    /// Mean length of the closed intervals that started within the window.
    ///
    /// Returns `None` when no closed interval qualifies; callers display
    /// zero in that case.
    #[must_use]
    pub fn average_run_time(&self) -> Option<Duration> {
        self.average_run_time_at(Instant::now())
    }

    /// Mean length of the closed intervals in the window ending at `now`.
    #[must_use]
    pub fn average_run_time_at(&self, now: Instant) -> Option<Duration> {
        let durations: Vec<Duration> = self
            .intervals
            .iter()
            .filter(|interval| self.in_window(interval, now))
            .filter_map(Interval::duration)
            .collect();

        if durations.is_empty() {
            return None;
        }

        let total: Duration = durations.iter().sum();
        let count = u32::try_from(durations.len()).unwrap_or(u32::MAX);
        Some(total / count)
    }

    /// Average run time as display text, zero when nothing qualifies.
    #[must_use]
    pub fn average_run_time_pretty(&self) -> String {
        self.average_run_time_pretty_at(Instant::now())
    }

    /// Average run time in the window ending at `now`, as display text.
    #[must_use]
    pub fn average_run_time_pretty_at(&self, now: Instant) -> String {
        format_run_time(self.average_run_time_at(now).unwrap_or_default())
    }

    /// Removes every interval that started before the window.
    ///
    /// Returns the number of intervals removed. Calling it again right
    /// away removes nothing.
    pub fn clean_old_events(&mut self) -> usize {
        self.clean_old_events_at(Instant::now())
    }

    /// Removes every interval that started before the window ending at `now`.
    pub fn clean_old_events_at(&mut self, now: Instant) -> usize {
        let Some(window_start) = now.checked_sub(self.window) else {
            return 0;
        };
        let before = self.intervals.len();
        self.intervals
            .retain(|interval| interval.start >= window_start);
        before - self.intervals.len()
    }

    fn in_window(&self, interval: &Interval, now: Instant) -> bool {
        if interval.start > now {
            return false;
        }
        now.checked_sub(self.window)
            .is_none_or(|window_start| interval.start >= window_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(10);

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn empty_counter() {
        let counter = DutyCycleCounter::new(WINDOW);
        assert_eq!(counter.number_of_events(), 0);
        assert_eq!(counter.average_run_time(), None);
        assert_eq!(counter.average_run_time_pretty(), "0ms");
        assert!(!counter.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn window_scenario() {
        let mut counter = DutyCycleCounter::new(WINDOW);

        counter.start_event();
        tokio::time::advance(ms(2_000)).await;
        counter.stop_event();

        assert_eq!(counter.number_of_events(), 1);
        assert_eq!(counter.average_run_time(), Some(ms(2_000)));
        assert_eq!(counter.average_run_time_pretty(), "2s");

        counter.start_event();
        tokio::time::advance(ms(6_000)).await;
        counter.stop_event();

        assert_eq!(counter.number_of_events(), 2);
        assert_eq!(counter.average_run_time(), Some(ms(4_000)));
        assert_eq!(counter.average_run_time_pretty(), "4s");

        // Both intervals now start more than 10s in the past.
        tokio::time::advance(ms(4_001)).await;
        assert_eq!(counter.clean_old_events(), 2);
        assert_eq!(counter.number_of_events(), 0);
        assert_eq!(counter.average_run_time(), None);
    }

    #[test]
    fn round_trip_single_interval() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        counter.start_event_at(t0);
        counter.stop_event_at(t0 + ms(1_500));

        let now = t0 + ms(1_600);
        assert_eq!(counter.number_of_events_at(now), 1);
        assert_eq!(counter.average_run_time_at(now), Some(ms(1_500)));
    }

    #[test]
    fn open_interval_counts_but_is_not_averaged() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        counter.start_event_at(t0);
        counter.stop_event_at(t0 + ms(1_000));
        counter.start_event_at(t0 + ms(2_000));

        let now = t0 + ms(9_000);
        assert_eq!(counter.number_of_events_at(now), 2);
        assert_eq!(counter.average_run_time_at(now), Some(ms(1_000)));
        assert!(counter.is_running());
    }

    #[test]
    fn repeated_start_is_ignored() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        assert!(counter.start_event_at(t0));
        assert!(!counter.start_event_at(t0 + ms(500)));
        assert!(counter.stop_event_at(t0 + ms(1_000)));

        assert_eq!(counter.intervals().count(), 1);
        assert_eq!(counter.average_run_time_at(t0 + ms(1_000)), Some(ms(1_000)));
    }

    #[test]
    fn stop_without_open_interval_is_ignored() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        assert!(!counter.stop_event_at(t0));

        counter.start_event_at(t0);
        counter.stop_event_at(t0 + ms(100));
        assert!(!counter.stop_event_at(t0 + ms(900)));
        assert_eq!(counter.average_run_time_at(t0 + ms(1_000)), Some(ms(100)));
    }

    #[test]
    fn intervals_starting_before_window_are_excluded() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        counter.start_event_at(t0);
        counter.stop_event_at(t0 + ms(8_000));
        counter.start_event_at(t0 + ms(9_000));
        counter.stop_event_at(t0 + ms(10_000));

        let now = t0 + ms(12_000);
        assert_eq!(counter.number_of_events_at(now), 1);
        assert_eq!(counter.average_run_time_at(now), Some(ms(1_000)));
    }

    #[test]
    fn clean_removes_every_old_interval() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        for i in 0..5 {
            let start = t0 + ms(i * 1_000);
            counter.start_event_at(start);
            counter.stop_event_at(start + ms(500));
        }
        counter.start_event_at(t0 + ms(20_000));
        counter.stop_event_at(t0 + ms(20_500));

        let now = t0 + ms(21_000);
        assert_eq!(counter.clean_old_events_at(now), 5);
        assert_eq!(counter.intervals().count(), 1);
        assert_eq!(counter.number_of_events_at(now), 1);
    }

    #[test]
    fn clean_is_idempotent() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        counter.start_event_at(t0);
        counter.stop_event_at(t0 + ms(1_000));
        counter.start_event_at(t0 + ms(15_000));

        let now = t0 + ms(16_000);
        counter.clean_old_events_at(now);
        let once: Vec<Interval> = counter.intervals().copied().collect();
        assert_eq!(counter.clean_old_events_at(now), 0);
        let twice: Vec<Interval> = counter.intervals().copied().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn record_drives_transitions() {
        let mut counter = DutyCycleCounter::new(WINDOW);
        let t0 = Instant::now();
        assert!(counter.record_at(true, t0));
        assert!(!counter.record_at(true, t0 + ms(10)));
        assert!(counter.record_at(false, t0 + ms(90)));
        assert!(!counter.record_at(false, t0 + ms(100)));

        assert_eq!(counter.intervals().count(), 1);
        assert_eq!(counter.average_run_time_at(t0 + ms(100)), Some(ms(90)));
    }
}
