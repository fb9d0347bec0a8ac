//! Outbound message model and the `Messenger` seam.
//!
//! Handlers and scheduled notifications describe what to send with
//! [`OutboundMessage`]; the Telegram adapter turns that into Bot API calls
//! and tests record it.

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};

use crate::bot::callbacks::CallbackAction;
use crate::errors::AppResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: CallbackAction,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    Inline(Vec<Vec<InlineButton>>),
    /// One-time reply keyboard with a single "share location" button
    RequestLocation { label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub text: String,
    pub format: TextFormat,
    pub keyboard: Option<Keyboard>,
    pub disable_link_preview: bool,
}

impl OutboundMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            keyboard: None,
            disable_link_preview: false,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Html,
            ..Self::plain(text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn without_link_preview(mut self) -> Self {
        self.disable_link_preview = true;
        self
    }
}

/// Delivery of messages to chats
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: ChatId, message: OutboundMessage) -> AppResult<()>;

    /// Replace the text (and inline keyboard) of an earlier bot message
    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        message: OutboundMessage,
    ) -> AppResult<()>;
}
