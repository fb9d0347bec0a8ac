//! Fiat exchange rates (exchangerate-api) and crypto prices (CoinGecko), both in RUB.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode_json, guarded};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::ProvidersConfig;
use crate::errors::AppResult;

pub const FIAT_CURRENCIES: [&str; 5] = ["USD", "EUR", "GBP", "JPY", "CNY"];

/// CoinGecko id and display name
pub const CRYPTO_ASSETS: [(&str, &str); 5] = [
    ("bitcoin", "Bitcoin (BTC)"),
    ("ethereum", "Ethereum (ETH)"),
    ("binancecoin", "Binance Coin (BNB)"),
    ("ripple", "Ripple (XRP)"),
    ("cardano", "Cardano (ADA)"),
];

/// Rates relative to RUB; entries the provider omitted are skipped
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatesSnapshot {
    /// Units of the currency per one RUB
    pub fiat: Vec<(&'static str, f64)>,
    /// Price of one coin in RUB, keyed by display name
    pub crypto: Vec<(&'static str, f64)>,
}

#[async_trait]
pub trait RatesProvider: Send + Sync {
    async fn snapshot(&self) -> AppResult<RatesSnapshot>;
}

#[derive(Debug, Deserialize)]
struct FiatResponse {
    rates: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct CoinPrice {
    rub: Option<f64>,
}

/// Format with `,` thousands separators; fractional part only when present
pub fn group_thousands(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let whole = rounded.trunc().abs() as u64;
    let digits = whole.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    let fraction = rounded.fract().abs();
    if fraction > 0.0 {
        let cents = format!("{:.2}", fraction);
        format!("{}{}{}", sign, grouped, cents.trim_start_matches('0').trim_end_matches('0'))
    } else {
        format!("{}{}", sign, grouped)
    }
}

pub struct ExchangeRatesClient {
    http: reqwest::Client,
    fiat_url: String,
    coingecko_base_url: String,
    breaker: CircuitBreaker,
}

impl ExchangeRatesClient {
    pub fn new(http: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            http,
            fiat_url: config.exchange_rates_url.clone(),
            coingecko_base_url: config.coingecko_base_url.trim_end_matches('/').to_string(),
            breaker: CircuitBreaker::new(config.breaker.clone()),
        }
    }

    async fn fiat(&self) -> AppResult<Vec<(&'static str, f64)>> {
        let response = self
            .http
            .get(&self.fiat_url)
            .send()
            .await?
            .error_for_status()?;
        let body: FiatResponse = decode_json(response).await?;

        Ok(FIAT_CURRENCIES
            .iter()
            .filter_map(|code| body.rates.get(*code).map(|rate| (*code, *rate)))
            .collect())
    }

    async fn crypto(&self) -> AppResult<Vec<(&'static str, f64)>> {
        let ids = CRYPTO_ASSETS
            .iter()
            .map(|(id, _)| *id)
            .collect::<Vec<_>>()
            .join(",");
        let response = self
            .http
            .get(format!("{}/simple/price", self.coingecko_base_url))
            .query(&[("ids", ids.as_str()), ("vs_currencies", "rub")])
            .send()
            .await?
            .error_for_status()?;
        let body: HashMap<String, CoinPrice> = decode_json(response).await?;

        Ok(CRYPTO_ASSETS
            .iter()
            .filter_map(|(id, name)| body.get(*id).and_then(|p| p.rub).map(|price| (*name, price)))
            .collect())
    }
}

#[async_trait]
impl RatesProvider for ExchangeRatesClient {
    async fn snapshot(&self) -> AppResult<RatesSnapshot> {
        guarded("rates", "snapshot", &self.breaker, async {
            Ok(RatesSnapshot {
                fiat: self.fiat().await?,
                crypto: self.crypto().await?,
            })
        })
        .await
    }
}
