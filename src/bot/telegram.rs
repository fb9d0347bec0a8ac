//! teloxide adapter: Bot API updates in, [`Messenger`] calls out.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    LinkPreviewOptions, MaybeInaccessibleMessage, MessageId, ParseMode,
};
use teloxide::utils::command::{BotCommands, ParseError};
use tracing::{debug, info, warn};

use super::callbacks::CallbackAction;
use super::commands::Command;
use super::dispatcher::handle_event;
use super::messenger::{InlineButton, Keyboard, Messenger, OutboundMessage, TextFormat};
use super::{AppContext, InboundEvent, InboundKind};
use crate::errors::{AppError, AppResult};

/// Sends and edits messages through the Bot API
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn inline_markup(rows: &[Vec<InlineButton>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|button| {
                InlineKeyboardButton::callback(button.label.clone(), button.action.encode())
            })
            .collect::<Vec<_>>()
    }))
}

fn location_markup(label: &str) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(label).request(ButtonRequest::Location)
    ]])
    .one_time_keyboard()
    .resize_keyboard()
}

fn disabled_link_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

fn api_error(operation: &str, error: teloxide::RequestError) -> AppError {
    AppError::ExternalUnavailable(format!("telegram {}: {}", operation, error))
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat_id: ChatId, message: OutboundMessage) -> AppResult<()> {
        let mut request = self.bot.send_message(chat_id, message.text);
        if message.format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if message.disable_link_preview {
            request = request.link_preview_options(disabled_link_preview());
        }
        request = match &message.keyboard {
            Some(Keyboard::Inline(rows)) => request.reply_markup(inline_markup(rows)),
            Some(Keyboard::RequestLocation { label }) => {
                request.reply_markup(location_markup(label))
            }
            None => request,
        };

        request.await.map_err(|e| api_error("send_message", e))?;
        Ok(())
    }

    async fn edit(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        message: OutboundMessage,
    ) -> AppResult<()> {
        // Only inline keyboards can be attached to an edited message
        if matches!(message.keyboard, Some(Keyboard::RequestLocation { .. })) {
            return self.send(chat_id, message).await;
        }

        let mut request = self.bot.edit_message_text(chat_id, message_id, message.text);
        if message.format == TextFormat::Html {
            request = request.parse_mode(ParseMode::Html);
        }
        if message.disable_link_preview {
            request = request.link_preview_options(disabled_link_preview());
        }
        if let Some(Keyboard::Inline(rows)) = &message.keyboard {
            request = request.reply_markup(inline_markup(rows));
        }

        request.await.map_err(|e| api_error("edit_message_text", e))?;
        Ok(())
    }
}

/// Decode message text: a known command, an unknown `/command`, or free text.
///
/// `None` for commands addressed to another bot (`/start@other_bot`), which
/// group chats deliver to every member bot.
pub fn classify_text(text: &str, bot_name: &str) -> Option<InboundKind> {
    match Command::parse(text, bot_name) {
        Ok(command) => Some(InboundKind::Command(command)),
        Err(ParseError::WrongBotName(addressee)) => {
            debug!(addressee = %addressee, "Command for another bot ignored");
            None
        }
        Err(_) if text.starts_with('/') => {
            let word = text
                .split_whitespace()
                .next()
                .unwrap_or(text)
                .trim_start_matches('/');
            let (name, addressee) = match word.split_once('@') {
                Some((name, addressee)) => (name, Some(addressee)),
                None => (word, None),
            };
            match addressee {
                Some(addressee) if !addressee.eq_ignore_ascii_case(bot_name) => None,
                _ => Some(InboundKind::UnknownCommand(name.to_string())),
            }
        }
        Err(_) => Some(InboundKind::FreeText(text.to_string())),
    }
}

/// Convert a message update; `None` for content the bot does not handle
pub fn message_event(msg: &Message, bot_name: &str) -> Option<InboundEvent> {
    let kind = if let Some(text) = msg.text() {
        classify_text(text, bot_name)?
    } else if let Some(location) = msg.location() {
        InboundKind::Location {
            lat: location.latitude,
            lon: location.longitude,
        }
    } else {
        return None;
    };

    Some(InboundEvent {
        chat_id: msg.chat.id,
        language_code: msg.from.as_ref().and_then(|user| user.language_code.clone()),
        message_id: None,
        kind,
    })
}

/// Convert a button press, keyed by the chat of the message carrying the keyboard
pub fn callback_event(q: &CallbackQuery) -> InboundEvent {
    let (chat_id, message_id) = match &q.message {
        Some(MaybeInaccessibleMessage::Regular(msg)) => (msg.chat.id, Some(msg.id)),
        Some(MaybeInaccessibleMessage::Inaccessible(msg)) => (msg.chat.id, None),
        None => (ChatId::from(q.from.id), None),
    };

    InboundEvent {
        chat_id,
        language_code: q.from.language_code.clone(),
        message_id,
        kind: InboundKind::ButtonPress(q.data.as_deref().and_then(CallbackAction::decode)),
    }
}

/// Register the command list shown by Telegram clients
pub async fn register_commands(bot: &Bot) -> anyhow::Result<()> {
    bot.set_my_commands(Command::bot_commands()).await?;
    info!("Bot commands registered");
    Ok(())
}

/// Long-poll updates until Ctrl-C
pub async fn run_dispatcher(bot: Bot, app: Arc<AppContext>, bot_name: String) {
    let bot_name = Arc::new(bot_name);

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let app = Arc::clone(&app);
            let bot_name = Arc::clone(&bot_name);
            move |msg: Message| {
                let app = Arc::clone(&app);
                let bot_name = Arc::clone(&bot_name);
                async move {
                    match message_event(&msg, &bot_name) {
                        Some(event) => handle_event(&app, event).await,
                        None => {
                            debug!(chat_id = %msg.chat.id, "Unsupported message content ignored")
                        }
                    }
                    Ok::<(), anyhow::Error>(())
                }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let app = Arc::clone(&app);
            move |bot: Bot, q: CallbackQuery| {
                let app = Arc::clone(&app);
                async move {
                    // Stop the client spinner before doing any work
                    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                        warn!(error = %e, "Failed to answer callback query");
                    }
                    handle_event(&app, callback_event(&q)).await;
                    Ok::<(), anyhow::Error>(())
                }
            }
        }));

    info!("Starting dispatcher");
    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
