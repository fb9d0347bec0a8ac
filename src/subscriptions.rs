//! Registry of daily notification subscriptions and one-shot reminders.
//!
//! A chat has at most one subscription per [`NotificationKind`]. Replacing a
//! subscription cancels the previous job and installs the new one while the
//! registry lock is held, so no caller ever observes two live jobs under one
//! key.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveTime;
use parking_lot::Mutex;
use teloxide::types::ChatId;

use crate::errors::{AppError, AppResult, InvalidInput};
use crate::scheduler::{JobHandle, JobPayload, ScheduledJob, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Weather,
    News,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 2] = [NotificationKind::Weather, NotificationKind::News];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Weather => "weather",
            NotificationKind::News => "news",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weather" => Ok(NotificationKind::Weather),
            "news" => Ok(NotificationKind::News),
            _ => Err(InvalidInput::Kind(s.to_string())),
        }
    }
}

/// Parse `H:MM` / `HH:MM` with hour 0-23 and minute 0-59
pub fn parse_time_of_day(input: &str) -> AppResult<NaiveTime> {
    let invalid = || AppError::from(InvalidInput::TimeFormat(input.to_string()));

    let (hour, minute) = input.trim().split_once(':').ok_or_else(invalid)?;
    let digits = |s: &str| !s.is_empty() && s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit());
    if !digits(hour) || !digits(minute) {
        return Err(invalid());
    }

    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// An active daily subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub handle: JobHandle,
    pub time: NaiveTime,
}

pub struct SubscriptionRegistry {
    scheduler: Arc<dyn Scheduler>,
    entries: Mutex<HashMap<(ChatId, NotificationKind), Subscription>>,
}

impl SubscriptionRegistry {
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe from raw command arguments; the time is checked before the kind
    pub fn subscribe(&self, chat_id: ChatId, kind: &str, time: &str) -> AppResult<Subscription> {
        let time = parse_time_of_day(time)?;
        let kind: NotificationKind = kind.parse()?;
        Ok(self.subscribe_kind(chat_id, kind, time))
    }

    /// Install a daily job for (chat, kind), replacing any existing one
    pub fn subscribe_kind(
        &self,
        chat_id: ChatId,
        kind: NotificationKind,
        time: NaiveTime,
    ) -> Subscription {
        let mut entries = self.entries.lock();

        if let Some(previous) = entries.remove(&(chat_id, kind)) {
            self.scheduler.cancel(previous.handle);
            tracing::debug!(
                chat_id = %chat_id,
                kind = %kind,
                previous = %previous.time,
                "Replacing subscription"
            );
        }

        let handle = self.scheduler.schedule_daily(
            time,
            ScheduledJob {
                chat_id,
                payload: JobPayload::Notification(kind),
            },
        );
        let subscription = Subscription { handle, time };
        entries.insert((chat_id, kind), subscription);

        tracing::info!(chat_id = %chat_id, kind = %kind, time = %time, "Subscription installed");
        subscription
    }

    /// Remove and cancel a subscription; `NotFound` when there is none
    pub fn unsubscribe(&self, chat_id: ChatId, kind: &str) -> AppResult<NotificationKind> {
        let kind: NotificationKind = kind.parse()?;

        let removed = self.entries.lock().remove(&(chat_id, kind));
        match removed {
            Some(subscription) => {
                self.scheduler.cancel(subscription.handle);
                tracing::info!(chat_id = %chat_id, kind = %kind, "Subscription cancelled");
                Ok(kind)
            }
            None => Err(AppError::NotFound(format!("{} subscription", kind))),
        }
    }

    pub fn get(&self, chat_id: ChatId, kind: NotificationKind) -> Option<Subscription> {
        self.entries.lock().get(&(chat_id, kind)).copied()
    }

    /// Active subscriptions of a chat in a stable order
    pub fn for_chat(&self, chat_id: ChatId) -> Vec<(NotificationKind, Subscription)> {
        let entries = self.entries.lock();
        NotificationKind::ALL
            .iter()
            .filter_map(|kind| entries.get(&(chat_id, *kind)).map(|sub| (*kind, *sub)))
            .collect()
    }

    /// Register a one-shot reminder; reminders are not tracked and cannot be cancelled
    pub fn schedule_reminder(
        &self,
        chat_id: ChatId,
        delay_seconds: i64,
        text: &str,
    ) -> AppResult<JobHandle> {
        if delay_seconds <= 0 {
            return Err(InvalidInput::Duration(delay_seconds).into());
        }

        let handle = self.scheduler.schedule_once(
            Duration::from_secs(delay_seconds.unsigned_abs()),
            ScheduledJob {
                chat_id,
                payload: JobPayload::Reminder {
                    text: text.to_string(),
                },
            },
        );
        tracing::info!(chat_id = %chat_id, delay_seconds, "Reminder scheduled");
        Ok(handle)
    }
}

impl fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("subscriptions", &self.entries.lock().len())
            .finish()
    }
}
