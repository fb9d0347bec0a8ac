//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `callbacks`: Typed inline-button actions and their handler
//! - `command_handlers`: One handler per bot command
//! - `message_handler`: Free text (dialogue first) and shared locations
//! - `dispatcher`: Routes an [`InboundEvent`] to its handler
//! - `telegram`: teloxide adapter (update conversion, `Messenger` over `Bot`)
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callbacks;
pub mod command_handlers;
pub mod commands;
pub mod dispatcher;
pub mod message_handler;
pub mod messenger;
pub mod telegram;
pub mod ui_builder;

use std::sync::Arc;

use teloxide::types::{ChatId, MessageId};

use crate::dialogue::TranslationDialogue;
use crate::errors::{AppError, AppResult, InvalidInput};
use crate::localization::{t_args_lang, t_lang, LocalizationManager};
use crate::services::Providers;
use crate::session::SessionStore;
use crate::subscriptions::SubscriptionRegistry;
use crate::todo::TodoStore;

pub use callbacks::CallbackAction;
pub use commands::Command;
pub use dispatcher::handle_event;
pub use messenger::{InlineButton, Keyboard, Messenger, OutboundMessage, TextFormat};

/// What arrived from the chat, already decoded
#[derive(Debug, Clone, PartialEq)]
pub enum InboundKind {
    Command(Command),
    /// Slash-prefixed text that is not a known command
    UnknownCommand(String),
    /// `None` when the callback data was not produced by this bot
    ButtonPress(Option<CallbackAction>),
    FreeText(String),
    Location { lat: f64, lon: f64 },
}

impl InboundKind {
    /// Metric label
    pub fn label(&self) -> &'static str {
        match self {
            InboundKind::Command(_) | InboundKind::UnknownCommand(_) => "command",
            InboundKind::ButtonPress(_) => "button",
            InboundKind::FreeText(_) => "text",
            InboundKind::Location { .. } => "location",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InboundEvent {
    pub chat_id: ChatId,
    /// Telegram UI language of the sender
    pub language_code: Option<String>,
    /// Message carrying the pressed keyboard, for button presses
    pub message_id: Option<MessageId>,
    pub kind: InboundKind,
}

/// Process-wide dependencies, built once in `main`
#[derive(Clone)]
pub struct AppContext {
    pub messenger: Arc<dyn Messenger>,
    pub localization: Arc<LocalizationManager>,
    pub sessions: SessionStore,
    pub dialogue: TranslationDialogue,
    pub subscriptions: Arc<SubscriptionRegistry>,
    pub todos: TodoStore,
    pub providers: Providers,
}

/// Common context for bot handlers: shared dependencies plus the originating chat
pub struct HandlerContext<'a> {
    pub app: &'a AppContext,
    pub chat_id: ChatId,
    pub language_code: Option<&'a str>,
    pub message_id: Option<MessageId>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(app: &'a AppContext, event: &'a InboundEvent) -> Self {
        Self {
            app,
            chat_id: event.chat_id,
            language_code: event.language_code.as_deref(),
            message_id: event.message_id,
        }
    }

    pub fn t(&self, key: &str) -> String {
        t_lang(&self.app.localization, key, self.language_code)
    }

    pub fn t_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        t_args_lang(&self.app.localization, key, args, self.language_code)
    }

    /// User-facing text for an error that has no more specific message
    pub fn error_text(&self, error: &AppError) -> String {
        let key = match error {
            AppError::InvalidInput(InvalidInput::TimeFormat(_)) => "error-time-format",
            AppError::InvalidInput(InvalidInput::Duration(_)) => "error-duration",
            AppError::InvalidInput(InvalidInput::Kind(_)) => "error-kind",
            AppError::InvalidInput(InvalidInput::Language(_)) => "error-language",
            AppError::InvalidInput(InvalidInput::Number(_)) => "error-number",
            AppError::NotFound(_) => "error-not-found",
            AppError::ExternalUnavailable(_) => "error-try-later",
            AppError::Config(_) | AppError::Internal(_) => "error-internal",
        };
        self.t(key)
    }

    /// Send a new message to the chat
    pub async fn reply(&self, message: OutboundMessage) -> AppResult<()> {
        self.app.messenger.send(self.chat_id, message).await
    }

    /// Answer in place: edit the pressed message when there is one, else send
    pub async fn respond(&self, message: OutboundMessage) -> AppResult<()> {
        match self.message_id {
            Some(message_id) => self.app.messenger.edit(self.chat_id, message_id, message).await,
            None => self.reply(message).await,
        }
    }
}
