//! OpenWeather client: current conditions, 24 h forecast and reverse geocoding.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{decode_json, guarded, is_success_code};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::ProvidersConfig;
use crate::errors::{AppError, AppResult};

/// Forecast entries are 3 h apart; eight of them cover the next 24 hours
pub const FORECAST_ENTRIES: usize = 8;

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub city: String,
    pub description: String,
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastEntry {
    /// Provider-formatted timestamp, e.g. `2024-03-01 12:00:00`
    pub time: String,
    pub temperature: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub entries: Vec<ForecastEntry>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions; `NotFound` for an unknown city
    async fn current(&self, city: &str) -> AppResult<CurrentWeather>;

    /// Next 24 hours; `NotFound` for an unknown city
    async fn forecast(&self, city: &str) -> AppResult<Forecast>;

    /// Name of the city at the coordinates, if any
    async fn city_at(&self, lat: f64, lon: f64) -> AppResult<Option<String>>;
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    #[serde(default)]
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct ForecastItem {
    dt_txt: String,
    main: MainReadings,
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastItem>,
}

#[derive(Debug, Deserialize)]
struct GeoPlace {
    #[serde(default)]
    name: Option<String>,
}

/// Uppercase the first character, as OpenWeather descriptions come lowercased
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn first_description(conditions: &[Condition]) -> String {
    conditions
        .first()
        .map(|c| capitalize_first(&c.description))
        .unwrap_or_default()
}

pub struct OpenWeatherClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    breaker: CircuitBreaker,
}

impl OpenWeatherClient {
    pub fn new(http: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            http,
            base_url: config.openweather_base_url.trim_end_matches('/').to_string(),
            api_key: config.openweather_api_key.clone(),
            breaker: CircuitBreaker::new(config.breaker.clone()),
        }
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::ExternalUnavailable("OPENWEATHER_API_KEY is not configured".to_string())
        })
    }

    /// Fetch a city endpoint and check the `cod` field of the body
    async fn fetch_city(&self, endpoint: &str, city: &str) -> AppResult<Value> {
        let response = self
            .http
            .get(format!("{}/data/2.5/{}", self.base_url, endpoint))
            .query(&[
                ("q", city),
                ("appid", self.api_key()?),
                ("units", "metric"),
                ("lang", "ru"),
            ])
            .send().await?;

        let body: Value = decode_json(response).await?;
        let code = &body["cod"];
        if is_success_code(code) {
            return Ok(body);
        }
        if code.as_u64() == Some(404) || code.as_str() == Some("404") {
            return Err(AppError::NotFound(city.to_string()));
        }
        Err(AppError::ExternalUnavailable(format!(
            "OpenWeather {} returned cod {}",
            endpoint, code
        )))
    }
}

fn malformed(err: serde_json::Error) -> AppError {
    AppError::ExternalUnavailable(format!("unexpected OpenWeather payload: {}", err))
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(&self, city: &str) -> AppResult<CurrentWeather> {
        guarded("openweather", "current", &self.breaker, async {
            let body = self.fetch_city("weather", city).await?;
            let parsed: CurrentResponse = serde_json::from_value(body).map_err(malformed)?;
            Ok(CurrentWeather {
                city: city.to_string(),
                description: first_description(&parsed.weather),
                temperature: parsed.main.temp,
                humidity: parsed.main.humidity,
            })
        })
        .await
    }

    async fn forecast(&self, city: &str) -> AppResult<Forecast> {
        guarded("openweather", "forecast", &self.breaker, async {
            let body = self.fetch_city("forecast", city).await?;
            let parsed: ForecastResponse = serde_json::from_value(body).map_err(malformed)?;
            let entries = parsed
                .list
                .into_iter()
                .take(FORECAST_ENTRIES)
                .map(|item| ForecastEntry {
                    time: item.dt_txt,
                    temperature: item.main.temp,
                    description: first_description(&item.weather),
                })
                .collect();
            Ok(Forecast {
                city: city.to_string(),
                entries,
            })
        })
        .await
    }

    async fn city_at(&self, lat: f64, lon: f64) -> AppResult<Option<String>> {
        guarded("openweather", "reverse_geocode", &self.breaker, async {
            let response = self
                .http
                .get(format!("{}/geo/1.0/reverse", self.base_url))
                .query(&[
                    ("lat", lat.to_string()),
                    ("lon", lon.to_string()),
                    ("limit", "1".to_string()),
                    ("appid", self.api_key()?.to_string()),
                ])
                .send()
                .await?
                .error_for_status()?;

            let places: Vec<GeoPlace> = decode_json(response).await?;
            Ok(places
                .into_iter()
                .next()
                .and_then(|place| place.name)
                .filter(|name| !name.trim().is_empty()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("ясно"), "Ясно");
        assert_eq!(capitalize_first("light rain"), "Light rain");
        assert_eq!(capitalize_first(""), "");
    }
}
