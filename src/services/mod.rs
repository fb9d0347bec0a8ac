//! Clients for the third-party APIs the bot relays to.
//!
//! Every provider is exposed through an object-safe trait so handlers and the
//! scheduler can be exercised with in-memory fakes, and implemented over a
//! shared `reqwest::Client` with its own circuit breaker.

pub mod news;
pub mod rates;
pub mod search;
pub mod translate;
pub mod weather;

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::ProvidersConfig;
use crate::errors::{error_logging, AppError, AppResult};
use crate::observability;

pub use news::{NewsItem, NewsProvider, RssNewsClient};
pub use rates::{ExchangeRatesClient, RatesProvider, RatesSnapshot};
pub use search::{SearchProvider, WikipediaClient};
pub use translate::{MyMemoryClient, Translator};
pub use weather::{CurrentWeather, Forecast, ForecastEntry, OpenWeatherClient, WeatherProvider};

/// All external collaborators, shared by handlers and notifications
#[derive(Clone)]
pub struct Providers {
    pub weather: Arc<dyn WeatherProvider>,
    pub rates: Arc<dyn RatesProvider>,
    pub search: Arc<dyn SearchProvider>,
    pub translator: Arc<dyn Translator>,
    pub news: Arc<dyn NewsProvider>,
}

impl Providers {
    /// Build the HTTP-backed providers from configuration
    pub fn from_config(config: &ProvidersConfig, http: reqwest::Client) -> Self {
        Self {
            weather: Arc::new(OpenWeatherClient::new(http.clone(), config)),
            rates: Arc::new(ExchangeRatesClient::new(http.clone(), config)),
            search: Arc::new(WikipediaClient::new(http.clone(), config)),
            translator: Arc::new(MyMemoryClient::new(http.clone(), config)),
            news: Arc::new(RssNewsClient::new(http, config)),
        }
    }
}

/// Run one provider call behind its circuit breaker, recording metrics.
///
/// `NotFound` is a valid answer from the provider and does not count as a failure.
pub(crate) async fn guarded<T, F>(
    provider: &'static str,
    operation: &'static str,
    breaker: &CircuitBreaker,
    call: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    if breaker.is_open() {
        observability::record_error_metrics("circuit_open", provider);
        return Err(AppError::ExternalUnavailable(format!(
            "{} is temporarily disabled after repeated failures",
            provider
        )));
    }

    let start = Instant::now();
    let result = call.await;

    match &result {
        Ok(_) | Err(AppError::NotFound(_)) => breaker.record_success(),
        Err(e) => {
            breaker.record_failure();
            error_logging::log_external_error(e, provider, operation, None);
        }
    }
    observability::record_external_request(provider, result.is_ok(), start.elapsed());

    result
}

/// Success predicate for APIs that echo a status code in the body.
///
/// OpenWeather reports `"cod": 200` on one endpoint and `"cod": "200"` on
/// another; both forms are accepted everywhere.
pub fn is_success_code(code: &serde_json::Value) -> bool {
    code.as_u64() == Some(200) || code.as_str().map(str::trim) == Some("200")
}

/// Decode a JSON body, mapping malformed payloads to `ExternalUnavailable`
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> AppResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::ExternalUnavailable(format!("unexpected response body: {}", e)))
}
