//! Wikipedia opensearch.

use async_trait::async_trait;
use serde_json::Value;

use super::{decode_json, guarded};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::ProvidersConfig;
use crate::errors::AppResult;

pub const SEARCH_LIMIT: usize = 3;

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Article links for the query, best match first; empty when nothing matched
    async fn search(&self, query: &str) -> AppResult<Vec<String>>;
}

pub struct WikipediaClient {
    http: reqwest::Client,
    api_url: String,
    breaker: CircuitBreaker,
}

impl WikipediaClient {
    pub fn new(http: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            http,
            api_url: config.wikipedia_api_url.clone(),
            breaker: CircuitBreaker::new(config.breaker.clone()),
        }
    }
}

/// Links from an opensearch reply `[query, titles, descriptions, links]`
fn links_from_opensearch(body: &Value) -> Vec<String> {
    body.get(3)
        .and_then(Value::as_array)
        .map(|links| {
            links
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl SearchProvider for WikipediaClient {
    async fn search(&self, query: &str) -> AppResult<Vec<String>> {
        guarded("wikipedia", "opensearch", &self.breaker, async {
            let limit = SEARCH_LIMIT.to_string();
            let response = self
                .http
                .get(&self.api_url)
                .query(&[
                    ("action", "opensearch"),
                    ("search", query),
                    ("limit", limit.as_str()),
                    ("namespace", "0"),
                    ("format", "json"),
                ])
                .send()
                .await?
                .error_for_status()?;

            let body: Value = decode_json(response).await?;
            Ok(links_from_opensearch(&body))
        })
        .await
    }
}
