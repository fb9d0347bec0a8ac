//! RSS news feed.

use async_trait::async_trait;

use super::guarded;
use crate::circuit_breaker::CircuitBreaker;
use crate::config::ProvidersConfig;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Up to `limit` newest items in feed order
    async fn latest(&self, limit: usize) -> AppResult<Vec<NewsItem>>;
}

pub struct RssNewsClient {
    http: reqwest::Client,
    feed_url: String,
    breaker: CircuitBreaker,
}

impl RssNewsClient {
    pub fn new(http: reqwest::Client, config: &ProvidersConfig) -> Self {
        Self {
            http,
            feed_url: config.news_feed_url.clone(),
            breaker: CircuitBreaker::new(config.breaker.clone()),
        }
    }
}

/// Items carrying both a title and a link
fn parse_feed(bytes: &[u8], limit: usize) -> AppResult<Vec<NewsItem>> {
    let channel = rss::Channel::read_from(bytes)
        .map_err(|e| AppError::ExternalUnavailable(format!("unreadable news feed: {}", e)))?;

    Ok(channel
        .items()
        .iter()
        .filter_map(|item| {
            Some(NewsItem {
                title: item.title()?.trim().to_string(),
                link: item.link()?.trim().to_string(),
            })
        })
        .take(limit)
        .collect())
}

#[async_trait]
impl NewsProvider for RssNewsClient {
    async fn latest(&self, limit: usize) -> AppResult<Vec<NewsItem>> {
        guarded("news_feed", "latest", &self.breaker, async {
            let bytes = self
                .http
                .get(&self.feed_url)
                .send()
                .await?
                .error_for_status()?
                .bytes().await?;
            parse_feed(&bytes, limit)
        })
        .await
    }
}
