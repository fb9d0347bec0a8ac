//! # Assistant Telegram Bot
//!
//! A multi-purpose Telegram assistant: reminders, weather and forecasts,
//! exchange rates, Wikipedia search, unit conversion, an interactive
//! translator, a to-do list, a quiz and daily weather/news subscriptions.

pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod convert;
pub mod dialogue;
pub mod errors;
pub mod languages;
pub mod localization;
pub mod notifier;
pub mod observability;
pub mod observability_config;
pub mod quiz;
pub mod scheduler;
pub mod services;
pub mod session;
pub mod subscriptions;
pub mod todo;

// Re-export types for easier access
pub use errors::{AppError, AppResult};
pub use scheduler::{Scheduler, TokioScheduler};
pub use subscriptions::{NotificationKind, SubscriptionRegistry};
