//! Forecast providers.
//!
//! The controller only sees `ForecastProvider`; the HTTP implementation
//! talks to the public 24-hour forecast endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use shoreline_core::{NetworkError, ReqwestErrorExt, WeatherConfig, WeatherError};
use tracing::instrument;

use crate::retry::{with_backoff, RetryPolicy};

const USER_AGENT: &str = "Shoreline/0.1.0";

/// Source of raw forecast payloads.
///
/// A successful result only means the provider answered with a 2xx and a
/// JSON body; checking it actually holds forecast entries is the caller's job.
pub trait ForecastProvider: Send + Sync {
    fn fetch_forecast(&self) -> impl Future<Output = Result<Value, WeatherError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpForecastProvider {
    client: Client,
    url: String,
    retry: RetryPolicy,
}

impl HttpForecastProvider {
    pub fn new(config: &WeatherConfig) -> Result<Self, WeatherError> {
        Self::with_url(
            &config.api_url,
            Duration::from_secs(config.timeout_secs),
            RetryPolicy::from_config(config),
        )
    }

    pub fn with_url(url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            client,
            url: url.to_string(),
            retry,
        })
    }

    async fn fetch_once(&self) -> Result<Value, NetworkError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(ReqwestErrorExt::into_network_error)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(format!("JSON parse error: {}", e)))
    }
}

impl ForecastProvider for HttpForecastProvider {
    #[instrument(skip(self), fields(url = %self.url), level = "info")]
    async fn fetch_forecast(&self) -> Result<Value, WeatherError> {
        with_backoff(&self.retry, || self.fetch_once())
            .await
            .map_err(|e| {
                tracing::warn!("Forecast fetch failed: {}", e);
                WeatherError::from(e)
            })
    }
}
