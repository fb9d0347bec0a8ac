//! Delivers fired jobs: reminders and daily notifications.
//!
//! Everything a notification shows is read at fire time, so a city changed
//! after subscribing is picked up by the next firing.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::types::ChatId;
use tracing::{debug, info};

use crate::bot::messenger::{Messenger, OutboundMessage};
use crate::bot::ui_builder::format_news;
use crate::errors::{error_logging, AppResult};
use crate::localization::{t_args_lang, t_lang, LocalizationManager};
use crate::observability;
use crate::scheduler::{JobPayload, JobRunner, ScheduledJob};
use crate::services::{NewsProvider, WeatherProvider};
use crate::session::SessionStore;
use crate::subscriptions::NotificationKind;

/// Number of headlines in the daily digest
pub const NEWS_DIGEST_SIZE: usize = 5;

/// [`JobRunner`] that turns fired jobs into chat messages
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
    sessions: SessionStore,
    weather: Arc<dyn WeatherProvider>,
    news: Arc<dyn NewsProvider>,
    localization: Arc<LocalizationManager>,
}

impl Notifier {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        sessions: SessionStore,
        weather: Arc<dyn WeatherProvider>,
        news: Arc<dyn NewsProvider>,
        localization: Arc<LocalizationManager>,
    ) -> Self {
        Self {
            messenger,
            sessions,
            weather,
            news,
            localization,
        }
    }

    async fn deliver(&self, chat_id: ChatId, payload: &JobPayload) -> AppResult<()> {
        let language_code = self.sessions.language_code(chat_id);
        let lang = language_code.as_deref();

        let message = match payload {
            JobPayload::Reminder { text } => OutboundMessage::plain(t_args_lang(
                &self.localization,
                "reminder-fired",
                &[("text", text)],
                lang,
            )),
            JobPayload::Notification(NotificationKind::Weather) => {
                self.weather_message(chat_id, lang).await
            }
            JobPayload::Notification(NotificationKind::News) => {
                self.news_message(chat_id, lang).await
            }
        };

        self.messenger.send(chat_id, message).await
    }

    async fn weather_message(&self, chat_id: ChatId, lang: Option<&str>) -> OutboundMessage {
        let Some(city) = self.sessions.default_city(chat_id) else {
            debug!(chat_id = %chat_id, "Weather notification without a default city");
            return OutboundMessage::plain(t_lang(
                &self.localization,
                "notify-weather-no-city",
                lang,
            ));
        };

        match self.weather.current(&city).await {
            Ok(weather) => {
                let temperature = format!("{:.1}", weather.temperature);
                OutboundMessage::plain(t_args_lang(
                    &self.localization,
                    "notify-weather",
                    &[
                        ("city", &city),
                        ("description", &weather.description),
                        ("temperature", &temperature),
                    ],
                    lang,
                ))
            }
            Err(e) => {
                error_logging::log_job_error(&e, "weather", chat_id.0);
                OutboundMessage::plain(t_args_lang(
                    &self.localization,
                    "notify-weather-error",
                    &[("city", &city)],
                    lang,
                ))
            }
        }
    }

    async fn news_message(&self, chat_id: ChatId, lang: Option<&str>) -> OutboundMessage {
        match self.news.latest(NEWS_DIGEST_SIZE).await {
            Ok(items) if !items.is_empty() => {
                OutboundMessage::html(format_news(&self.localization, &items, lang))
                    .without_link_preview()
            }
            Ok(_) => OutboundMessage::plain(t_lang(&self.localization, "notify-news-error", lang)),
            Err(e) => {
                error_logging::log_job_error(&e, "news", chat_id.0);
                OutboundMessage::plain(t_lang(&self.localization, "notify-news-error", lang))
            }
        }
    }
}

#[async_trait]
impl JobRunner for Notifier {
    async fn run(&self, job: ScheduledJob) {
        let kind = job.payload.kind();
        observability::record_scheduled_job(kind);
        info!(chat_id = %job.chat_id, job_kind = kind, "Scheduled job fired");

        if let Err(e) = self.deliver(job.chat_id, &job.payload).await {
            error_logging::log_job_error(&e, kind, job.chat_id.0);
            observability::record_error_metrics("job_delivery", "notifier");
        }
    }
}
