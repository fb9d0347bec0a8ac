//! # Unified Application Configuration
//!
//! This module consolidates all application settings into a single,
//! structured configuration object loaded from environment variables.

use crate::errors::{AppError, AppResult};
use crate::observability_config::ObservabilityConfig;
use std::env;

/// Bot-specific configuration settings
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token
    pub token: String,
    /// HTTP client timeout in seconds (applies to Telegram and providers)
    pub http_timeout_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            http_timeout_secs: 30,
        }
    }
}

impl BotConfig {
    /// Validate bot configuration
    pub fn validate(&self) -> AppResult<()> {
        if self.token.trim().is_empty() {
            return Err(AppError::Config("Bot token cannot be empty".to_string()));
        }

        let parts: Vec<&str> = self.token.split(':').collect();
        if parts.len() != 2 {
            return Err(AppError::Config(
                "Bot token format is invalid. Expected format: 'bot_id:bot_token'".to_string(),
            ));
        }

        if parts[0].parse::<u64>().is_err() {
            return Err(AppError::Config("Bot token bot ID must be numeric".to_string()));
        }

        if parts[1].len() < 20 {
            return Err(AppError::Config(
                "Bot token appears to be too short. Please verify it's a valid token".to_string(),
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(AppError::Config("HTTP timeout cannot be 0".to_string()));
        }

        if self.http_timeout_secs > 300 {
            return Err(AppError::Config(
                "HTTP timeout cannot be greater than 300 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// Failure policy shared by all external providers
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before a provider is short-circuited
    pub failure_threshold: u32,
    /// Seconds before a short-circuited provider is tried again
    pub reset_timeout_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 60,
        }
    }
}

/// Endpoints and credentials of the third-party APIs
#[derive(Debug, Clone)]
pub struct ProvidersConfig {
    /// OpenWeather API key; weather features report unavailability without it
    pub openweather_api_key: Option<String>,
    pub openweather_base_url: String,
    pub exchange_rates_url: String,
    pub coingecko_base_url: String,
    pub wikipedia_api_url: String,
    pub translation_api_url: String,
    pub news_feed_url: String,
    pub breaker: BreakerConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            openweather_base_url: "http://api.openweathermap.org".to_string(),
            exchange_rates_url: "https://api.exchangerate-api.com/v4/latest/RUB".to_string(),
            coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
            wikipedia_api_url: "https://ru.wikipedia.org/w/api.php".to_string(),
            translation_api_url: "https://api.mymemory.translated.net/get".to_string(),
            news_feed_url: "http://feeds.bbci.co.uk/russian/rss.xml".to_string(),
            breaker: BreakerConfig::default(),
        }
    }
}

impl ProvidersConfig {
    /// Validate provider configuration
    pub fn validate(&self) -> AppResult<()> {
        let urls = [
            ("OPENWEATHER_BASE_URL", &self.openweather_base_url),
            ("EXCHANGE_RATES_URL", &self.exchange_rates_url),
            ("COINGECKO_BASE_URL", &self.coingecko_base_url),
            ("WIKIPEDIA_API_URL", &self.wikipedia_api_url),
            ("TRANSLATION_API_URL", &self.translation_api_url),
            ("NEWS_FEED_URL", &self.news_feed_url),
        ];
        for (key, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(AppError::Config(format!(
                    "{} must start with 'http://' or 'https://'",
                    key
                )));
            }
        }

        if self.breaker.failure_threshold == 0 {
            return Err(AppError::Config(
                "Provider failure threshold cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Unified application configuration
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Bot configuration
    pub bot: BotConfig,
    /// Third-party API configuration
    pub providers: ProvidersConfig,
    /// Observability configuration
    pub observability: ObservabilityConfig,
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a valid number", key))),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        config.bot.token = env::var("TELEGRAM_BOT_TOKEN")
            .or_else(|_| env::var("BOT_TOKEN"))
            .map_err(|_| {
                AppError::Config(
                    "TELEGRAM_BOT_TOKEN (or BOT_TOKEN) environment variable is required"
                        .to_string(),
                )
            })?;
        config.bot.http_timeout_secs = parse_env("HTTP_CLIENT_TIMEOUT_SECS", 30)?;

        let defaults = ProvidersConfig::default();
        config.providers = ProvidersConfig {
            openweather_api_key: env::var("OPENWEATHER_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openweather_base_url: env_or("OPENWEATHER_BASE_URL", defaults.openweather_base_url),
            exchange_rates_url: env_or("EXCHANGE_RATES_URL", defaults.exchange_rates_url),
            coingecko_base_url: env_or("COINGECKO_BASE_URL", defaults.coingecko_base_url),
            wikipedia_api_url: env_or("WIKIPEDIA_API_URL", defaults.wikipedia_api_url),
            translation_api_url: env_or("TRANSLATION_API_URL", defaults.translation_api_url),
            news_feed_url: env_or("NEWS_FEED_URL", defaults.news_feed_url),
            breaker: BreakerConfig {
                failure_threshold: parse_env("PROVIDER_FAILURE_THRESHOLD", 5)?,
                reset_timeout_secs: parse_env("PROVIDER_RESET_TIMEOUT_SECS", 60)?,
            },
        };

        config.observability = ObservabilityConfig::from_env();

        Ok(config)
    }

    /// Validate all configuration sections
    pub fn validate(&self) -> AppResult<()> {
        self.bot.validate()?;
        self.providers.validate()?;
        self.observability.validate().map_err(AppError::Config)?;
        Ok(())
    }

    /// Get a summary of the current configuration for logging
    pub fn summary(&self) -> String {
        format!(
            "Configuration: bot_token=[REDACTED], openweather_key={}, http_timeout_secs={}, environment={}, metrics_export={}, metrics_port={}",
            if self.providers.openweather_api_key.is_some() { "[REDACTED]" } else { "<unset>" },
            self.bot.http_timeout_secs,
            self.observability.environment,
            self.observability.enable_metrics_export,
            self.observability.metrics_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_config_validation() {
        let mut config = BotConfig::default();

        // Invalid: empty token
        assert!(config.validate().is_err());

        // Invalid: malformed token
        config.token = "invalid-token".to_string();
        assert!(config.validate().is_err());

        // Invalid: short token
        config.token = "123:short".to_string();
        assert!(config.validate().is_err());

        // Valid token format
        config.token = "123456789:AAFakeTokenForTestingPurposes1234567890".to_string();
        assert!(config.validate().is_ok());

        // Invalid: zero timeout
        config.http_timeout_secs = 0;
        assert!(config.validate().is_err());
        config.http_timeout_secs = 301;
        assert!(config.validate().is_err());
        config.http_timeout_secs = 30;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_providers_config_validation() {
        let mut config = ProvidersConfig::default();
        assert!(config.validate().is_ok());

        config.news_feed_url = "feeds.bbci.co.uk/russian/rss.xml".to_string();
        assert!(config.validate().is_err());
        config.news_feed_url = ProvidersConfig::default().news_feed_url;

        config.breaker.failure_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_redacts_secrets() {
        let mut config = AppConfig::default();
        config.bot.token = "123456789:AAFakeTokenForTestingPurposes1234567890".to_string();
        config.providers.openweather_api_key = Some("secret-weather-key".to_string());

        let summary = config.summary();
        assert!(!summary.contains("AAFakeToken"));
        assert!(!summary.contains("secret-weather-key"));
        assert!(summary.contains("[REDACTED]"));
    }
}
