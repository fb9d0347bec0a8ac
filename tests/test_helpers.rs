//! # Test Helper Library
//!
//! Common fakes and setup shared by the integration tests: a recording
//! messenger, scripted providers and a wall clock that follows tokio's
//! (possibly paused) time.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use assistant_bot::bot::{AppContext, InboundEvent, InboundKind, Messenger, OutboundMessage};
use assistant_bot::dialogue::TranslationDialogue;
use assistant_bot::errors::{AppError, AppResult};
use assistant_bot::localization::{create_localization_manager, LocalizationManager};
use assistant_bot::notifier::Notifier;
use assistant_bot::scheduler::{Clock, TokioScheduler};
use assistant_bot::services::{
    CurrentWeather, Forecast, NewsItem, NewsProvider, Providers, RatesProvider, RatesSnapshot,
    SearchProvider, Translator, WeatherProvider,
};
use assistant_bot::session::SessionStore;
use assistant_bot::subscriptions::SubscriptionRegistry;
use assistant_bot::todo::TodoStore;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use teloxide::types::{ChatId, MessageId};

/// One messenger call
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub chat_id: ChatId,
    /// Set for edits
    pub edited: Option<MessageId>,
    pub message: OutboundMessage,
}

/// Messenger that records every call
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|s| s.message.text.clone()).collect()
    }

    pub fn last(&self) -> Option<Sent> {
        self.sent.lock().last().cloned()
    }

    pub fn last_text(&self) -> String {
        self.last().map(|s| s.message.text).unwrap_or_default()
    }

    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: ChatId, message: OutboundMessage) -> AppResult<()> {
        self.sent.lock().push(Sent {
            chat_id,
            edited: None,
            message,
        });
        Ok(())
    }

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        message: OutboundMessage,
    ) -> AppResult<()> {
        self.sent.lock().push(Sent {
            chat_id,
            edited: Some(message_id),
            message,
        });
        Ok(())
    }
}

/// Weather provider answering from a fixed city table
#[derive(Default)]
pub struct FakeWeather {
    pub cities: Mutex<HashMap<String, CurrentWeather>>,
    pub location_city: Mutex<Option<String>>,
    pub failing: Mutex<bool>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeWeather {
    pub fn with_city(city: &str, description: &str, temperature: f64) -> Self {
        let fake = Self::default();
        fake.cities.lock().insert(
            city.to_string(),
            CurrentWeather {
                city: city.to_string(),
                description: description.to_string(),
                temperature,
                humidity: 50.0,
            },
        );
        fake
    }

    fn check_available(&self) -> AppResult<()> {
        if *self.failing.lock() {
            return Err(AppError::ExternalUnavailable("weather down".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl WeatherProvider for FakeWeather {
    async fn current(&self, city: &str) -> AppResult<CurrentWeather> {
        self.calls.lock().push(city.to_string());
        self.check_available()?;
        self.cities
            .lock()
            .get(city)
            .cloned()
            .ok_or_else(|| AppError::NotFound(city.to_string()))
    }

    async fn forecast(&self, city: &str) -> AppResult<Forecast> {
        self.check_available()?;
        if !self.cities.lock().contains_key(city) {
            return Err(AppError::NotFound(city.to_string()));
        }
        Ok(Forecast {
            city: city.to_string(),
            entries: Vec::new(),
        })
    }

    async fn city_at(&self, _lat: f64, _lon: f64) -> AppResult<Option<String>> {
        self.check_available()?;
        Ok(self.location_city.lock().clone())
    }
}

/// Translator backed by a phrase table; unknown phrases fail
#[derive(Default)]
pub struct FakeTranslator {
    pub phrases: Mutex<HashMap<(String, String, String), String>>,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranslator {
    pub fn with_phrase(text: &str, source: &str, target: &str, translated: &str) -> Self {
        let fake = Self::default();
        fake.phrases.lock().insert(
            (text.to_string(), source.to_string(), target.to_string()),
            translated.to_string(),
        );
        fake
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, source: &str, target: &str) -> AppResult<String> {
        let key = (text.to_string(), source.to_string(), target.to_string());
        self.calls.lock().push(key.clone());
        self.phrases
            .lock()
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::ExternalUnavailable("no translation".to_string()))
    }
}

#[derive(Default)]
pub struct FakeRates {
    pub snapshot: RatesSnapshot,
}

#[async_trait]
impl RatesProvider for FakeRates {
    async fn snapshot(&self) -> AppResult<RatesSnapshot> {
        Ok(self.snapshot.clone())
    }
}

#[derive(Default)]
pub struct FakeSearch {
    pub links: Vec<String>,
}

#[async_trait]
impl SearchProvider for FakeSearch {
    async fn search(&self, _query: &str) -> AppResult<Vec<String>> {
        Ok(self.links.clone())
    }
}

#[derive(Default)]
pub struct FakeNews {
    pub items: Vec<NewsItem>,
}

#[async_trait]
impl NewsProvider for FakeNews {
    async fn latest(&self, limit: usize) -> AppResult<Vec<NewsItem>> {
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}

/// Wall clock that starts at `base` and advances with tokio time
pub struct TokioClock {
    base: NaiveDateTime,
    start: tokio::time::Instant,
}

impl TokioClock {
    pub fn starting_at(base: NaiveDateTime) -> Self {
        Self {
            base,
            start: tokio::time::Instant::now(),
        }
    }
}

impl Clock for TokioClock {
    fn now(&self) -> NaiveDateTime {
        let elapsed = chrono::Duration::from_std(self.start.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.base + elapsed
    }
}

/// 2024-03-01 at the given wall-clock time
pub fn march_first(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(hour, minute, second)
        .unwrap()
}

pub fn setup_localization() -> Arc<LocalizationManager> {
    create_localization_manager().expect("Failed to create localization manager")
}

/// Fakes for every provider, each reachable for assertions
pub struct FakeProviders {
    pub weather: Arc<FakeWeather>,
    pub translator: Arc<FakeTranslator>,
    pub rates: Arc<FakeRates>,
    pub search: Arc<FakeSearch>,
    pub news: Arc<FakeNews>,
}

impl Default for FakeProviders {
    fn default() -> Self {
        Self {
            weather: Arc::new(FakeWeather::default()),
            translator: Arc::new(FakeTranslator::default()),
            rates: Arc::new(FakeRates::default()),
            search: Arc::new(FakeSearch::default()),
            news: Arc::new(FakeNews::default()),
        }
    }
}

impl FakeProviders {
    pub fn providers(&self) -> Providers {
        Providers {
            weather: self.weather.clone(),
            rates: self.rates.clone(),
            search: self.search.clone(),
            translator: self.translator.clone(),
            news: self.news.clone(),
        }
    }
}

/// Fully wired application over fakes, with a real tokio scheduler
pub struct TestBot {
    pub app: AppContext,
    pub messenger: Arc<RecordingMessenger>,
    pub scheduler: Arc<TokioScheduler>,
    pub fakes: FakeProviders,
}

impl TestBot {
    pub fn new(fakes: FakeProviders, clock: Arc<dyn Clock>) -> Self {
        let messenger = Arc::new(RecordingMessenger::default());
        let localization = setup_localization();
        let sessions = SessionStore::new();
        let providers = fakes.providers();

        let notifier = Arc::new(Notifier::new(
            messenger.clone(),
            sessions.clone(),
            providers.weather.clone(),
            providers.news.clone(),
            localization.clone(),
        ));
        let scheduler = Arc::new(TokioScheduler::new(notifier, clock));

        let app = AppContext {
            messenger: messenger.clone(),
            localization,
            dialogue: TranslationDialogue::new(sessions.clone()),
            sessions,
            subscriptions: Arc::new(SubscriptionRegistry::new(scheduler.clone())),
            todos: TodoStore::new(),
            providers,
        };

        Self {
            app,
            messenger,
            scheduler,
            fakes,
        }
    }

    /// Deliver an event the way the Telegram adapter would
    pub async fn receive(&self, chat: i64, kind: InboundKind) {
        self.receive_with(chat, Some("ru"), None, kind).await;
    }

    pub async fn receive_with(
        &self,
        chat: i64,
        language_code: Option<&str>,
        message_id: Option<MessageId>,
        kind: InboundKind,
    ) {
        let event = InboundEvent {
            chat_id: ChatId(chat),
            language_code: language_code.map(str::to_string),
            message_id,
            kind,
        };
        assistant_bot::bot::handle_event(&self.app, event).await;
    }
}
