//! MyMemory translation API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::{decode_json, guarded, is_success_code};
use crate::circuit_breaker::CircuitBreaker;
use crate::config::ProvidersConfig;
use crate::errors::{AppError, AppResult};

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translated text; may be empty when the provider had no translation
    async fn translate(&self, text: &str, source: &str, target: &str) -> AppResult<String>;
}

#[derive(Debug, Default, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText", default)]
    translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslationResponse {
    #[serde(rename = "responseData", default)]
    response_data: Option<ResponseData>,
    #[serde(rename = "responseStatus", default)]
    response_status: Value,
}

pub struct MyMemoryClient {
    http: reqwest::Client,
    api_url: String,
    breaker: CircuitBreaker,
}

impl MyMemoryClient {
    pub fn new(http: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            http,
            api_url: config.translation_api_url.clone(),
            breaker: CircuitBreaker::new(config.breaker.clone()),
        }
    }
}

#[async_trait]
impl Translator for MyMemoryClient {
    async fn translate(&self, text: &str, source: &str, target: &str) -> AppResult<String> {
        guarded("mymemory", "translate", &self.breaker, async {
            let langpair = format!("{}|{}", source, target);
            let response = self
                .http
                .get(&self.api_url)
                .query(&[("q", text), ("langpair", langpair.as_str())])
                .send()
                .await?
                .error_for_status()?;

            let body: TranslationResponse = decode_json(response).await?;
            // Missing status is tolerated; an explicit non-200 one is not
            if !body.response_status.is_null() && !is_success_code(&body.response_status) {
                return Err(AppError::ExternalUnavailable(format!(
                    "translation rejected with status {}",
                    body.response_status
                )));
            }

            Ok(body
                .response_data
                .and_then(|data| data.translated_text)
                .unwrap_or_default())
        })
        .await
    }
}
