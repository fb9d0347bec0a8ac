//! Routes every inbound event to its handler.
//!
//! Handler failures end here: they are logged, counted and turned into a
//! generic apology so one bad update never takes the bot down.

use tracing::{debug, Instrument};

use super::callbacks::handle_callback;
use super::command_handlers::{
    begin_translation, handle_convert_command, handle_forecast_command, handle_help_command,
    handle_menu_command, handle_reminder_command, handle_search_command, handle_settings_command,
    handle_start_command, handle_subscribe_command, handle_todo_command,
    handle_unsubscribe_command, handle_weather_command, show_quiz, show_rates, show_top_quiz,
};
use super::commands::Command;
use super::message_handler::{handle_location, handle_text_message};
use super::messenger::OutboundMessage;
use super::{AppContext, HandlerContext, InboundEvent, InboundKind};
use crate::errors::error_logging;
use crate::observability;

/// Handle one inbound event; never fails
pub async fn handle_event(app: &AppContext, event: InboundEvent) {
    let span = observability::telegram_span(event.kind.label(), Some(event.chat_id.0));
    async {
        app.sessions
            .remember_language(event.chat_id, event.language_code.as_deref());
        observability::record_bot_event(event.kind.label());

        let ctx = HandlerContext::new(app, &event);
        if let Err(e) = route(&ctx, &event.kind).await {
            error_logging::log_internal_error(
                &e,
                "dispatcher",
                event.kind.label(),
                Some(event.chat_id.0),
            );
            observability::record_error_metrics("handler", "dispatcher");

            let apology = OutboundMessage::plain(ctx.t("error-internal"));
            if let Err(send_error) = ctx.reply(apology).await {
                error_logging::log_internal_error(
                    &send_error,
                    "dispatcher",
                    "error_reply",
                    Some(event.chat_id.0),
                );
            }
        }
    }
    .instrument(span)
    .await
}

async fn route(ctx: &HandlerContext<'_>, kind: &InboundKind) -> anyhow::Result<()> {
    match kind {
        InboundKind::Command(command) => {
            observability::record_command(command.name());
            handle_command(ctx, command).await
        }
        InboundKind::UnknownCommand(name) => {
            debug!(chat_id = %ctx.chat_id, command = %name, "Unknown command");
            ctx.reply(OutboundMessage::plain(ctx.t("unknown-command")))
                .await?;
            Ok(())
        }
        InboundKind::ButtonPress(action) => handle_callback(ctx, action.as_ref()).await,
        InboundKind::FreeText(text) => handle_text_message(ctx, text).await,
        InboundKind::Location { lat, lon } => handle_location(ctx, *lat, *lon).await,
    }
}

async fn handle_command(ctx: &HandlerContext<'_>, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Start => handle_start_command(ctx).await,
        Command::Help => handle_help_command(ctx).await,
        Command::Menu => handle_menu_command(ctx).await,
        Command::Reminder(args) => handle_reminder_command(ctx, args).await,
        Command::Weather(args) => handle_weather_command(ctx, args).await,
        Command::Forecast(args) => handle_forecast_command(ctx, args).await,
        Command::Rates => show_rates(ctx).await,
        Command::Search(args) => handle_search_command(ctx, args).await,
        Command::Convert(args) => handle_convert_command(ctx, args).await,
        Command::TranslateInteractive => begin_translation(ctx).await,
        Command::Todo(args) => handle_todo_command(ctx, args).await,
        Command::Quiz => show_quiz(ctx).await,
        Command::Settings(args) => handle_settings_command(ctx, args).await,
        Command::Subscribe(args) => handle_subscribe_command(ctx, args).await,
        Command::Unsubscribe(args) => handle_unsubscribe_command(ctx, args).await,
        Command::TopQuiz => show_top_quiz(ctx).await,
    }
}
