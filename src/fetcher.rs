use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::{
    config::{self, Config},
    error::FetchError,
    model::{Coordinates, ForecastResponse, WeatherResponse},
    retry::RetryPolicy,
};

/// Forecast slots requested per day: the API reports one slot per 3-hour interval.
pub const SLOTS_PER_DAY: u32 = 8;

/// Fetches current weather and forecasts with bounded retries.
///
/// Stateless apart from its configuration: every call is independent, so a
/// single instance can be shared across tasks. The underlying HTTP client is
/// reused across calls.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    api_key: String,
    base_url: String,
    units: String,
    timeout: Duration,
    retry: RetryPolicy,
    http: Client,
}

impl WeatherFetcher {
    /// Build a fetcher with the documented defaults (30s timeout, 3 tries,
    /// metric units). Performs no I/O and cannot fail.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: config::DEFAULT_BASE_URL.to_string(),
            units: config::DEFAULT_UNITS.to_string(),
            timeout: Duration::from_secs(config::DEFAULT_TIMEOUT_SECS),
            retry: RetryPolicy::default(),
            http: Client::new(),
        }
    }

    /// Build a fetcher from process-wide configuration.
    ///
    /// An explicit `api_key` wins over the configured one; with neither
    /// present the credential problem surfaces here instead of on the first
    /// request.
    pub fn from_config(api_key: Option<String>, config: &Config) -> Result<Self, FetchError> {
        let api_key = api_key.or_else(|| config.api_key.clone()).ok_or_else(|| {
            FetchError::InvalidArgument(
                "no API credential supplied and none configured".to_string(),
            )
        })?;

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            units: config.units.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            retry: RetryPolicy::new(
                config.retry_attempts,
                Duration::from_secs(config.retry_delay_secs),
            ),
            http: Client::new(),
        })
    }

    /// Override the API base URL (mock servers, regional endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the per-attempt request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the retry budget.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the HTTP client (connection pool tuning, proxies).
    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// Fetch current weather for a location.
    ///
    /// `overrides` are merged into the query parameters and win on key
    /// collision (e.g. `[("units", "imperial"), ("lang", "fr")]`). The
    /// response is validated before it is returned: a 2xx body missing any
    /// of `main`, `weather` or `wind` surfaces as
    /// [`FetchError::MalformedResponse`].
    pub async fn fetch_current_weather(
        &self,
        location: &str,
        overrides: &[(&str, &str)],
    ) -> Result<WeatherResponse, FetchError> {
        let location = validated_location(location)?;
        let params = self.build_params(location, overrides, None);

        let response: WeatherResponse = self.get_json("weather", &params).await?;

        match response.missing_field() {
            None => Ok(response),
            Some(field) => Err(FetchError::MalformedResponse(format!(
                "current weather response is missing the `{field}` field"
            ))),
        }
    }

    /// Fetch a forecast covering `days` days, one slot per 3-hour interval.
    ///
    /// `days` must be at least 1; the request carries `cnt = days * 8`.
    /// Same override, retry and validation contract as
    /// [`fetch_current_weather`](Self::fetch_current_weather).
    pub async fn fetch_forecast(
        &self,
        location: &str,
        days: u32,
        overrides: &[(&str, &str)],
    ) -> Result<ForecastResponse, FetchError> {
        let location = validated_location(location)?;
        if days == 0 {
            return Err(FetchError::InvalidArgument(
                "days must be at least 1".to_string(),
            ));
        }

        let params = self.build_params(location, overrides, Some(days * SLOTS_PER_DAY));

        let forecast: ForecastResponse = self.get_json("forecast", &params).await?;

        match forecast.missing_field() {
            None => Ok(forecast),
            Some(field) => Err(FetchError::MalformedResponse(format!(
                "forecast response is missing the `{field}` field"
            ))),
        }
    }

    /// Resolve a location to coordinates via its current-weather response.
    ///
    /// A response without a `coord` field is malformed; no partial or
    /// default coordinates are ever returned.
    pub async fn get_coordinates(&self, location: &str) -> Result<Coordinates, FetchError> {
        let response = self.fetch_current_weather(location, &[]).await?;

        response.coord.ok_or_else(|| {
            FetchError::MalformedResponse(
                "current weather response is missing the `coord` field".to_string(),
            )
        })
    }

    /// Required parameters first, then overrides; overrides win on collision.
    fn build_params(
        &self,
        location: &str,
        overrides: &[(&str, &str)],
        slots: Option<u32>,
    ) -> Vec<(String, String)> {
        let mut params = vec![
            ("q".to_string(), location.to_string()),
            ("appid".to_string(), self.api_key.clone()),
            ("units".to_string(), self.units.clone()),
        ];
        if let Some(cnt) = slots {
            params.push(("cnt".to_string(), cnt.to_string()));
        }

        for (key, value) in overrides {
            match params.iter_mut().find(|(existing, _)| existing == key) {
                Some(entry) => entry.1 = (*value).to_string(),
                None => params.push(((*key).to_string(), (*value).to_string())),
            }
        }

        params
    }

    /// One GET with the retry loop applied; decodes the body on success.
    ///
    /// Transport and non-2xx failures are re-attempted until the budget runs
    /// out, then the last-seen error escalates. Decode failures are terminal.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);

        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(url = %url, attempt, "requesting weather API");

            match self.attempt_get(&url, params).await {
                Ok(body) => {
                    return serde_json::from_str(&body).map_err(|err| {
                        FetchError::MalformedResponse(format!(
                            "failed to decode weather API JSON: {err}"
                        ))
                    });
                }
                Err(err) if err.is_retryable() && self.retry.allows_another(attempt) => {
                    warn!(
                        url = %url,
                        attempt,
                        attempts = self.retry.attempts,
                        "weather API request failed, retrying: {err}"
                    );
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(err) => {
                    error!(url = %url, attempt, "weather API request failed: {err}");
                    return Err(err);
                }
            }
        }
    }

    async fn attempt_get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<String, FetchError> {
        let res = self
            .http
            .get(url)
            .query(params)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

fn validated_location(location: &str) -> Result<&str, FetchError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(FetchError::InvalidArgument(
            "location must not be empty".to_string(),
        ));
    }
    Ok(location)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        format!("{}...", &body[..MAX])
    } else {
        body.to_string()
    }
}
