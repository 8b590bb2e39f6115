/*
 *  transit.rs
 *
 *  PanelClock - rolling digits for an 11x53 LED matrix
 *
 *  Fetch and parse the three online feeds the panel shows: bus arrivals,
 *  tube line status, and a remotely-editable custom message. Refresh
 *  failures are logged and leave whatever the cache still holds.
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

use std::time::Duration;

use log::{info, warn};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::cache::{CacheKey, CacheValue, OnlineCache};
use crate::config::TransitSettings;
use crate::net;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum TransitError {
    #[error("network is not connected")]
    Offline,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected http status {0}")]
    Status(StatusCode),
    #[error("bad json payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing data: {0}")]
    MissingData(&'static str),
}

/// The transport seam. Production uses `HttpFetcher`; tests swap in
/// canned or failing fetchers.
pub trait JsonFetch: Send + Sync {
    fn fetch_text(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<String, TransitError>> + Send;
}

/// Real HTTP transport with a short timeout and a connectivity pre-check.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, TransitError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("panelclock/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpFetcher { client })
    }
}

impl JsonFetch for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, TransitError> {
        if !net::is_connected() {
            return Err(TransitError::Offline);
        }
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(TransitError::Status(response.status()));
        }
        Ok(response.text().await?)
    }
}

/// Arrival predictions for one bus line: whole minutes, sorted ascending.
pub fn parse_arrivals(payload: &Value, line_name: &str) -> Result<Vec<u32>, TransitError> {
    let records = payload
        .as_array()
        .ok_or(TransitError::MissingData("arrivals payload is not an array"))?;
    let mut minutes: Vec<u32> = records
        .iter()
        .filter(|r| r.get("lineName").and_then(Value::as_str) == Some(line_name))
        .filter_map(|r| r.get("timeToStation").and_then(Value::as_u64))
        .map(|secs| (secs / 60) as u32)
        .collect();
    minutes.sort_unstable();
    Ok(minutes)
}

/// Status description for one line id, e.g. "Good Service".
pub fn parse_line_status(payload: &Value, line_id: &str) -> Result<String, TransitError> {
    let records = payload
        .as_array()
        .ok_or(TransitError::MissingData("status payload is not an array"))?;
    records
        .iter()
        .find(|r| r.get("id").and_then(Value::as_str) == Some(line_id))
        .and_then(|r| r.get("lineStatuses"))
        .and_then(|s| s.get(0))
        .and_then(|s| s.get("statusSeverityDescription"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(TransitError::MissingData("line status not found"))
}

/// The custom message endpoint has been seen in two shapes: a JSON object
/// with a `custom_message` field, and a bare text body. Blank counts as
/// missing either way.
pub fn parse_custom_message(body: &str) -> Result<String, TransitError> {
    let text = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("custom_message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(TransitError::MissingData("custom_message field absent"))?,
        _ => body.trim().to_owned(),
    };
    let text = text.trim().to_owned();
    if text.is_empty() {
        return Err(TransitError::MissingData("custom message is blank"));
    }
    Ok(text)
}

/// "due" for a bus arriving now, minutes otherwise.
pub fn format_bus_times(line_name: &str, minutes: &[u32]) -> String {
    let times: Vec<String> = minutes
        .iter()
        .map(|m| {
            if *m == 0 {
                "due".to_owned()
            } else {
                m.to_string()
            }
        })
        .collect();
    format!("Next {} in: {} mins", line_name, times.join(", "))
}

pub fn format_line_status(line_label: &str, status: &str) -> String {
    format!("{} line: {}", line_label, status)
}

/// Fetches the three feeds and keeps the cache stocked.
pub struct TransitClient<F: JsonFetch> {
    fetcher: F,
    settings: TransitSettings,
}

impl<F: JsonFetch> TransitClient<F> {
    pub fn new(fetcher: F, settings: TransitSettings) -> Self {
        TransitClient { fetcher, settings }
    }

    pub fn settings(&self) -> &TransitSettings {
        &self.settings
    }

    async fn fetch_next_buses(&self) -> Result<Vec<u32>, TransitError> {
        let body = self.fetcher.fetch_text(&self.settings.next_buses_url).await?;
        let payload: Value = serde_json::from_str(&body)?;
        parse_arrivals(&payload, &self.settings.bus_line)
    }

    async fn fetch_line_status(&self) -> Result<String, TransitError> {
        let body = self.fetcher.fetch_text(&self.settings.line_status_url).await?;
        let payload: Value = serde_json::from_str(&body)?;
        parse_line_status(&payload, &self.settings.line_id)
    }

    async fn fetch_custom_message(&self) -> Result<String, TransitError> {
        let body = self
            .fetcher
            .fetch_text(&self.settings.custom_message_url)
            .await?;
        parse_custom_message(&body)
    }

    /// Refresh the bus arrivals slot. On failure the cache keeps ticking
    /// down whatever it already holds.
    pub async fn refresh_next_buses(&self, cache: &OnlineCache) {
        match self.fetch_next_buses().await {
            Ok(times) => {
                info!("next buses: {:?}", times);
                cache.set(CacheKey::NextBuses, CacheValue::Buses(times));
            }
            Err(e) => warn!("failed to refresh next buses: {}", e),
        }
    }

    pub async fn refresh_line_status(&self, cache: &OnlineCache) {
        match self.fetch_line_status().await {
            Ok(status) => {
                info!("{} status: {}", self.settings.line_id, status);
                cache.set(CacheKey::LineStatus, CacheValue::Text(status));
            }
            Err(e) => warn!("failed to refresh line status: {}", e),
        }
    }

    pub async fn refresh_custom_message(&self, cache: &OnlineCache) {
        match self.fetch_custom_message().await {
            Ok(text) => {
                info!("custom message: {}", text);
                cache.set(CacheKey::CustomMessage, CacheValue::Text(text));
            }
            Err(e) => warn!("failed to refresh custom message: {}", e),
        }
    }

    /// Refresh all three feeds concurrently. Used once at startup before
    /// the panel starts drawing.
    pub async fn update_all_cache(&self, cache: &OnlineCache) {
        tokio::join!(
            self.refresh_next_buses(cache),
            self.refresh_line_status(cache),
            self.refresh_custom_message(cache),
        );
    }

    /// Periodic refresh loop: every `interval`, refresh only the slots
    /// whose time-to-live has lapsed.
    pub async fn refresh_periodically(&self, cache: &OnlineCache, interval: Duration) {
        loop {
            tokio::time::sleep(interval).await;
            if cache.is_expired(CacheKey::NextBuses) {
                self.refresh_next_buses(cache).await;
            }
            if cache.is_expired(CacheKey::LineStatus) {
                self.refresh_line_status(cache).await;
            }
            if cache.is_expired(CacheKey::CustomMessage) {
                self.refresh_custom_message(cache).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::test_clock::TestClock;
    use crate::cache::CacheTtls;
    use std::sync::Arc;

    struct StaticFetcher(&'static str);

    impl JsonFetch for StaticFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String, TransitError> {
            Ok(self.0.to_owned())
        }
    }

    struct FailingFetcher;

    impl JsonFetch for FailingFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String, TransitError> {
            Err(TransitError::Offline)
        }
    }

    fn cache() -> OnlineCache {
        OnlineCache::new(CacheTtls::default(), Arc::new(TestClock::new()))
    }

    fn settings() -> TransitSettings {
        TransitSettings::default()
    }

    const ARRIVALS: &str = r#"[
        {"lineName": "141", "timeToStation": 540},
        {"lineName": "29", "timeToStation": 60},
        {"lineName": "141", "timeToStation": 45},
        {"lineName": "141", "timeToStation": 181}
    ]"#;

    #[test]
    fn arrivals_filter_convert_and_sort() {
        let payload: Value = serde_json::from_str(ARRIVALS).unwrap();
        assert_eq!(parse_arrivals(&payload, "141").unwrap(), vec![0, 3, 9]);
        assert_eq!(parse_arrivals(&payload, "29").unwrap(), vec![1]);
        assert!(parse_arrivals(&payload, "8").unwrap().is_empty());
        assert!(parse_arrivals(&Value::Null, "141").is_err());
    }

    #[test]
    fn line_status_finds_matching_id() {
        let payload: Value = serde_json::from_str(
            r#"[
                {"id": "victoria", "lineStatuses": [{"statusSeverityDescription": "Minor Delays"}]},
                {"id": "piccadilly", "lineStatuses": [{"statusSeverityDescription": "Good Service"}]}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            parse_line_status(&payload, "piccadilly").unwrap(),
            "Good Service"
        );
        assert!(parse_line_status(&payload, "bakerloo").is_err());
    }

    #[test]
    fn custom_message_both_shapes() {
        assert_eq!(
            parse_custom_message(r#"{"custom_message": "Hello"}"#).unwrap(),
            "Hello"
        );
        assert_eq!(parse_custom_message("Plain text\n").unwrap(), "Plain text");
        assert!(parse_custom_message("   ").is_err());
        assert!(parse_custom_message(r#"{"other": 1}"#).is_err());
    }

    #[test]
    fn bus_times_render_due_for_zero() {
        assert_eq!(
            format_bus_times("141", &[0, 3, 9]),
            "Next 141 in: due, 3, 9 mins"
        );
        assert_eq!(format_bus_times("141", &[4]), "Next 141 in: 4 mins");
    }

    #[test]
    fn line_status_label() {
        assert_eq!(
            format_line_status("Piccadilly", "Good Service"),
            "Piccadilly line: Good Service"
        );
    }

    #[tokio::test]
    async fn successful_refresh_stocks_the_cache() {
        let cache = cache();
        let client = TransitClient::new(StaticFetcher(ARRIVALS), settings());
        client.refresh_next_buses(&cache).await;
        assert_eq!(cache.next_buses(), Some(vec![0, 3, 9]));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_existing_entry() {
        let cache = cache();
        cache.set(CacheKey::NextBuses, CacheValue::Buses(vec![3, 7]));

        let client = TransitClient::new(FailingFetcher, settings());
        client.update_all_cache(&cache).await;

        assert_eq!(cache.next_buses(), Some(vec![3, 7]));
        assert!(cache.line_status().is_none());
    }
}
