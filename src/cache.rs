/*
 *  cache.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Time-keyed cache over the online data the panel shows. Each key has its
 *  own time-to-live; readers see `None` once an entry has lapsed.
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

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Local};
use log::debug;

use crate::timeutil::ClockSource;

/// Cache slots, one per upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    NextBuses,
    LineStatus,
    CustomMessage,
}

impl CacheKey {
    pub fn name(&self) -> &'static str {
        match self {
            CacheKey::NextBuses => "next_buses",
            CacheKey::LineStatus => "line_status",
            CacheKey::CustomMessage => "custom_message",
        }
    }
}

/// What a slot holds. Bus arrivals are minutes-from-now, already sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Buses(Vec<u32>),
    Text(String),
}

struct Entry {
    value: CacheValue,
    expires_at: DateTime<Local>,
}

/// Per-key time-to-live budget, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct CacheTtls {
    pub next_buses_secs: i64,
    pub line_status_secs: i64,
    pub custom_message_secs: i64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        CacheTtls {
            next_buses_secs: 60,
            line_status_secs: 300,
            custom_message_secs: 3600,
        }
    }
}

impl CacheTtls {
    fn for_key(&self, key: CacheKey) -> Duration {
        let secs = match key {
            CacheKey::NextBuses => self.next_buses_secs,
            CacheKey::LineStatus => self.line_status_secs,
            CacheKey::CustomMessage => self.custom_message_secs,
        };
        Duration::seconds(secs)
    }
}

/// The cache proper. Interior mutability so refresh tasks write while the
/// attract loop reads.
pub struct OnlineCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    ttls: CacheTtls,
    clock: Arc<dyn ClockSource>,
}

impl OnlineCache {
    pub fn new(ttls: CacheTtls, clock: Arc<dyn ClockSource>) -> Self {
        OnlineCache {
            entries: RwLock::new(HashMap::new()),
            ttls,
            clock,
        }
    }

    /// Store a value and stamp it with the key's time-to-live.
    pub fn set(&self, key: CacheKey, value: CacheValue) {
        let expires_at = self.clock.now() + self.ttls.for_key(key);
        debug!("cache set {} (expires {})", key.name(), expires_at.format("%H:%M:%S"));
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, Entry { value, expires_at });
        }
    }

    /// Fetch a value, or `None` when the slot is empty or has lapsed.
    pub fn get(&self, key: CacheKey) -> Option<CacheValue> {
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;
        let entry = entries.get(&key)?;
        if now >= entry.expires_at {
            debug!("cache miss {} (lapsed)", key.name());
            return None;
        }
        Some(entry.value.clone())
    }

    /// Whether the slot needs refreshing (empty or lapsed).
    pub fn is_expired(&self, key: CacheKey) -> bool {
        self.get(key).is_none()
    }

    /// Bus arrivals in minutes, when fresh.
    pub fn next_buses(&self) -> Option<Vec<u32>> {
        match self.get(CacheKey::NextBuses) {
            Some(CacheValue::Buses(times)) => Some(times),
            _ => None,
        }
    }

    /// Line status description, when fresh.
    pub fn line_status(&self) -> Option<String> {
        match self.get(CacheKey::LineStatus) {
            Some(CacheValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// The remotely-set message, when fresh.
    pub fn custom_message(&self) -> Option<String> {
        match self.get(CacheKey::CustomMessage) {
            Some(CacheValue::Text(text)) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use std::sync::Mutex;

    use chrono::{DateTime, Duration, Local, TimeZone};

    use crate::timeutil::ClockSource;

    /// Manually-advanced clock for cache and scheduler tests.
    pub struct TestClock {
        now: Mutex<DateTime<Local>>,
    }

    impl TestClock {
        pub fn new() -> Self {
            TestClock {
                now: Mutex::new(Local.with_ymd_and_hms(2024, 9, 20, 12, 0, 0).unwrap()),
            }
        }

        pub fn advance_secs(&self, secs: i64) {
            let mut now = self.now.lock().unwrap();
            *now += Duration::seconds(secs);
        }
    }

    impl ClockSource for TestClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_clock::TestClock;
    use super::*;

    fn cache_with_clock() -> (OnlineCache, Arc<TestClock>) {
        let clock = Arc::new(TestClock::new());
        let cache = OnlineCache::new(CacheTtls::default(), clock.clone());
        (cache, clock)
    }

    #[test]
    fn empty_slots_read_as_none() {
        let (cache, _) = cache_with_clock();
        assert!(cache.get(CacheKey::NextBuses).is_none());
        assert!(cache.is_expired(CacheKey::CustomMessage));
    }

    #[test]
    fn set_then_get_round_trips() {
        let (cache, _) = cache_with_clock();
        cache.set(CacheKey::NextBuses, CacheValue::Buses(vec![2, 9]));
        assert_eq!(cache.next_buses(), Some(vec![2, 9]));
        assert!(!cache.is_expired(CacheKey::NextBuses));
    }

    #[test]
    fn entries_lapse_on_their_own_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.set(CacheKey::NextBuses, CacheValue::Buses(vec![5]));
        cache.set(CacheKey::LineStatus, CacheValue::Text("Good Service".into()));

        clock.advance_secs(59);
        assert!(cache.next_buses().is_some());

        clock.advance_secs(1);
        assert!(cache.next_buses().is_none());
        // line status has a five-minute budget and is still fresh
        assert_eq!(cache.line_status(), Some("Good Service".into()));

        clock.advance_secs(300);
        assert!(cache.line_status().is_none());
    }

    #[test]
    fn rewrites_restart_the_ttl() {
        let (cache, clock) = cache_with_clock();
        cache.set(CacheKey::CustomMessage, CacheValue::Text("first".into()));
        clock.advance_secs(3599);
        cache.set(CacheKey::CustomMessage, CacheValue::Text("second".into()));
        clock.advance_secs(3599);
        assert_eq!(cache.custom_message(), Some("second".into()));
    }

    #[test]
    fn wrong_typed_slot_reads_as_none() {
        let (cache, _) = cache_with_clock();
        cache.set(CacheKey::NextBuses, CacheValue::Text("oops".into()));
        assert!(cache.next_buses().is_none());
    }
}
