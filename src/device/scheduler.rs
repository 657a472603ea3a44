// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recurring refresh and maintenance timers.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Work a timer asks the device actor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Poll the device status.
    Refresh,
    /// Prune old counter intervals.
    Maintenance,
}

/// Owns the recurring timers of one device.
///
/// Each timer is a task that sends a [`Tick`] into the device mailbox. The
/// first tick of every timer fires one full period after initialization.
/// Timers are cleared on [`teardown`](Self::teardown) and on drop.
#[derive(Debug)]
pub struct PollingScheduler {
    device_id: String,
    maintenance: bool,
    timers: Vec<JoinHandle<()>>,
}

impl PollingScheduler {
    /// Longest timer period; longer periods are shortened to it.
    pub const MAX_PERIOD: Duration = Duration::from_secs(365 * 24 * 60 * 60);

    /// Period of the counter maintenance timer.
    pub const MAINTENANCE_PERIOD: Duration = Duration::from_secs(60 * 60);

    /// Creates a scheduler with no timers. `maintenance` adds the hourly
    /// counter maintenance timer on initialization.
    #[must_use]
    pub fn new(device_id: impl Into<String>, maintenance: bool) -> Self {
        Self {
            device_id: device_id.into(),
            maintenance,
            timers: Vec::new(),
        }
    }

    /// Adds the timers.
    pub fn initialize<M>(&mut self, refresh_period: Duration, mailbox: &mpsc::WeakSender<M>)
    where
        M: From<Tick> + Send + 'static,
    {
        tracing::info!(device_id = %self.device_id, ?refresh_period, "Adding timers");
        self.timers
            .push(spawn_timer(refresh_period, Tick::Refresh, mailbox.clone()));
        if self.maintenance {
            self.timers.push(spawn_timer(
                Self::MAINTENANCE_PERIOD,
                Tick::Maintenance,
                mailbox.clone(),
            ));
        }
    }

    /// Clears every timer and adds them again with a new refresh period.
    pub fn reinitialize<M>(&mut self, refresh_period: Duration, mailbox: &mpsc::WeakSender<M>)
    where
        M: From<Tick> + Send + 'static,
    {
        self.teardown();
        self.initialize(refresh_period, mailbox);
    }

    /// Clears every timer. Safe to call when none exist.
    pub fn teardown(&mut self) {
        if self.timers.is_empty() {
            return;
        }
        tracing::info!(device_id = %self.device_id, "Removing timers");
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }

    /// Number of live timers.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.timers.iter().filter(|t| !t.is_finished()).count()
    }
}

impl Drop for PollingScheduler {
    fn drop(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
    }
}

fn spawn_timer<M>(period: Duration, tick: Tick, mailbox: mpsc::WeakSender<M>) -> JoinHandle<()>
where
    M: From<Tick> + Send + 'static,
{
    let period = period.min(PollingScheduler::MAX_PERIOD);
    let now = Instant::now();
    let first = now.checked_add(period).unwrap_or(now);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(first, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let Some(sender) = mailbox.upgrade() else {
                break;
            };
            if sender.send(M::from(tick)).await.is_err() {
                break;
            }
        }
    })
}
