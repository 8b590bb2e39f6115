/*
 *  timesync.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Periodic wall-clock resync, scheduled shortly after the top of each
 *  hour with a little jitter so a fleet of panels doesn't stampede the
 *  time source.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::sync::Arc;
use std::time::Duration;

use chrono::Timelike;
use log::{info, warn};
use rand::Rng;

use crate::net;
use crate::timeutil::ClockSource;

/// One resync attempt. Split out as a trait so the scheduler loop can be
/// exercised without touching the host clock.
pub trait TimeSync: Send + Sync {
    fn sync_time(&self) -> impl std::future::Future<Output = bool> + Send;
}

/// Host-clock sync. The OS time daemon owns the actual adjustment; this
/// just nudges the schedule and reports connectivity.
pub struct SystemTimeSync;

impl TimeSync for SystemTimeSync {
    async fn sync_time(&self) -> bool {
        if !net::is_connected() {
            warn!("time sync skipped: network is not connected");
            return false;
        }
        info!("time sync checkpoint reached");
        true
    }
}

/// Seconds from `now` until the next top of the hour (1..=3600).
pub fn seconds_until_next_hour(minute: u32, second: u32) -> u64 {
    3600 - u64::from(minute) * 60 - u64::from(second)
}

/// Sleep until just past each top of the hour (plus 0-59s of jitter) and
/// run a sync attempt.
pub async fn sync_periodically<S: TimeSync>(sync: S, clock: Arc<dyn ClockSource>) {
    loop {
        let now = clock.now();
        let wait = seconds_until_next_hour(now.minute(), now.second());
        let jitter: u64 = rand::rng().random_range(0..60);
        info!("next time sync in {}s (+{}s jitter)", wait, jitter);
        tokio::time::sleep(Duration::from_secs(wait + jitter)).await;
        if !sync.sync_time().await {
            warn!("time sync attempt failed, will retry next hour");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_to_top_of_hour() {
        assert_eq!(seconds_until_next_hour(0, 0), 3600);
        assert_eq!(seconds_until_next_hour(59, 59), 1);
        assert_eq!(seconds_until_next_hour(30, 0), 1800);
        assert_eq!(seconds_until_next_hour(12, 34), 3600 - 12 * 60 - 34);
    }
}
