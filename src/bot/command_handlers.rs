//! Command Handlers module for processing bot commands
//!
//! The `show_*` helpers answer through [`HandlerContext::respond`], so the
//! same code serves a typed command (new message) and a menu button (edits
//! the pressed message).

use anyhow::Result;
use tracing::debug;

use super::messenger::OutboundMessage;
use super::ui_builder::{
    format_conversion, format_forecast, format_rates, format_search_results, format_settings,
    format_todo_list, format_weather, language_keyboard, main_menu_keyboard, quiz_keyboard,
    settings_keyboard, todo_keyboard,
};
use super::HandlerContext;
use crate::convert::{convert_args, ConvertOutcome};
use crate::dialogue::LanguageStep;
use crate::errors::{error_logging, AppError, InvalidInput};
use crate::quiz;
use crate::subscriptions::NotificationKind;

/// Welcome text listing every command (HTML)
fn welcome_message(ctx: &HandlerContext<'_>) -> String {
    let commands = [
        "help-reminder",
        "help-weather",
        "help-forecast",
        "help-rates",
        "help-search",
        "help-convert",
        "help-translate",
        "help-todo",
        "help-quiz",
        "help-settings",
        "help-subscribe",
        "help-top-quiz",
    ]
    .iter()
    .map(|key| format!("• {}", ctx.t(key)))
    .collect::<Vec<_>>()
    .join("\n");

    format!(
        "<b>{}</b>\n\n{}\n\n{}\n\n{}",
        ctx.t("welcome-title"),
        ctx.t("welcome-description"),
        commands,
        ctx.t("welcome-choose")
    )
}

/// Handle the /start command
pub async fn handle_start_command(ctx: &HandlerContext<'_>) -> Result<()> {
    let keyboard = main_menu_keyboard(&ctx.app.localization, ctx.language_code);
    ctx.reply(OutboundMessage::html(welcome_message(ctx)).with_keyboard(keyboard))
        .await?;
    Ok(())
}

/// Handle the /help command
pub async fn handle_help_command(ctx: &HandlerContext<'_>) -> Result<()> {
    ctx.reply(OutboundMessage::html(welcome_message(ctx)))
        .await?;
    Ok(())
}

/// Handle the /menu command
pub async fn handle_menu_command(ctx: &HandlerContext<'_>) -> Result<()> {
    let keyboard = main_menu_keyboard(&ctx.app.localization, ctx.language_code);
    ctx.reply(OutboundMessage::plain(ctx.t("menu-title")).with_keyboard(keyboard))
        .await?;
    Ok(())
}

/// Handle `/reminder <seconds> <text>`
pub async fn handle_reminder_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    let Some((seconds, text)) = args.trim().split_once(char::is_whitespace) else {
        ctx.reply(OutboundMessage::plain(ctx.t("reminder-usage")))
            .await?;
        return Ok(());
    };
    let text = text.trim();
    if text.is_empty() {
        ctx.reply(OutboundMessage::plain(ctx.t("reminder-usage")))
            .await?;
        return Ok(());
    }

    let Ok(seconds) = seconds.parse::<i64>() else {
        let error = InvalidInput::Number(seconds.to_string());
        error_logging::log_validation_error(&error, "reminder", Some(ctx.chat_id.0), Some(seconds));
        ctx.reply(OutboundMessage::plain(ctx.t("reminder-invalid-number")))
            .await?;
        return Ok(());
    };

    let reply = match ctx
        .app
        .subscriptions
        .schedule_reminder(ctx.chat_id, seconds, text)
    {
        Ok(_) => ctx.t_args("reminder-set", &[("seconds", &seconds.to_string())]),
        Err(e @ AppError::InvalidInput(InvalidInput::Duration(_))) => {
            error_logging::log_validation_error(&e, "reminder", Some(ctx.chat_id.0), Some(args));
            ctx.t("reminder-positive")
        }
        Err(e) => ctx.error_text(&e),
    };
    ctx.reply(OutboundMessage::plain(reply)).await?;
    Ok(())
}

/// City from the arguments, else the chat's default city
fn resolve_city(ctx: &HandlerContext<'_>, args: &str) -> Option<String> {
    let city = args.trim();
    if city.is_empty() {
        ctx.app.sessions.default_city(ctx.chat_id)
    } else {
        Some(city.to_string())
    }
}

pub async fn show_weather(ctx: &HandlerContext<'_>, city: &str) -> Result<()> {
    let message = match ctx.app.providers.weather.current(city).await {
        Ok(weather) => OutboundMessage::html(format_weather(
            &ctx.app.localization,
            &weather,
            ctx.language_code,
        )),
        Err(AppError::NotFound(_)) => {
            OutboundMessage::plain(ctx.t_args("weather-city-not-found", &[("city", city)]))
        }
        Err(_) => OutboundMessage::plain(ctx.t("weather-error")),
    };
    ctx.respond(message).await?;
    Ok(())
}

pub async fn show_forecast(ctx: &HandlerContext<'_>, city: &str) -> Result<()> {
    let message = match ctx.app.providers.weather.forecast(city).await {
        Ok(forecast) => OutboundMessage::html(format_forecast(
            &ctx.app.localization,
            &forecast,
            ctx.language_code,
        )),
        Err(AppError::NotFound(_)) => {
            OutboundMessage::plain(ctx.t_args("forecast-city-not-found", &[("city", city)]))
        }
        Err(_) => OutboundMessage::plain(ctx.t("forecast-error")),
    };
    ctx.respond(message).await?;
    Ok(())
}

/// Handle `/weather [city]`
pub async fn handle_weather_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    match resolve_city(ctx, args) {
        Some(city) => show_weather(ctx, &city).await,
        None => {
            ctx.reply(OutboundMessage::plain(ctx.t("weather-usage")))
                .await?;
            Ok(())
        }
    }
}

/// Handle `/forecast [city]`
pub async fn handle_forecast_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    match resolve_city(ctx, args) {
        Some(city) => show_forecast(ctx, &city).await,
        None => {
            ctx.reply(OutboundMessage::plain(ctx.t("forecast-usage")))
                .await?;
            Ok(())
        }
    }
}

/// Handle /rates, also used by the menu button
pub async fn show_rates(ctx: &HandlerContext<'_>) -> Result<()> {
    let message = match ctx.app.providers.rates.snapshot().await {
        Ok(rates) => {
            OutboundMessage::html(format_rates(&ctx.app.localization, &rates, ctx.language_code))
        }
        Err(_) => OutboundMessage::plain(ctx.t("rates-error")),
    };
    ctx.respond(message).await?;
    Ok(())
}

/// Handle `/search <query>`
pub async fn handle_search_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    let query = args.trim();
    if query.is_empty() {
        ctx.reply(OutboundMessage::plain(ctx.t("search-usage")))
            .await?;
        return Ok(());
    }

    let message = match ctx.app.providers.search.search(query).await {
        Ok(links) => OutboundMessage::html(format_search_results(
            &ctx.app.localization,
            query,
            &links,
            ctx.language_code,
        )),
        Err(_) => OutboundMessage::plain(ctx.t("search-error")),
    };
    ctx.reply(message).await?;
    Ok(())
}

/// Handle `/convert <value> <from> to <to>`
pub async fn handle_convert_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    let reply = match convert_args(args) {
        Ok(ConvertOutcome::Converted(conversion)) => {
            format_conversion(&ctx.app.localization, &conversion, ctx.language_code)
        }
        Ok(ConvertOutcome::Unsupported) => ctx.t("convert-unsupported"),
        Ok(ConvertOutcome::Usage) => ctx.t("convert-usage"),
        Err(e) => {
            error_logging::log_validation_error(&e, "convert", Some(ctx.chat_id.0), Some(args));
            ctx.t("convert-invalid-number")
        }
    };
    ctx.reply(OutboundMessage::plain(reply)).await?;
    Ok(())
}

/// Start (or restart) the translation dialogue
pub async fn begin_translation(ctx: &HandlerContext<'_>) -> Result<()> {
    ctx.app.dialogue.begin(ctx.chat_id);
    debug!(chat_id = %ctx.chat_id, "Translation dialogue started");

    let keyboard = language_keyboard(
        &ctx.app.localization,
        LanguageStep::Source,
        ctx.language_code,
    );
    ctx.respond(OutboundMessage::plain(ctx.t("translate-choose-source")).with_keyboard(keyboard))
        .await?;
    Ok(())
}

pub async fn show_todo_list(ctx: &HandlerContext<'_>, empty_key: &str) -> Result<()> {
    let tasks = ctx.app.todos.list(ctx.chat_id);
    let message = if tasks.is_empty() {
        OutboundMessage::plain(ctx.t(empty_key))
    } else {
        OutboundMessage::html(format_todo_list(&ctx.app.localization, &tasks, ctx.language_code))
    };
    ctx.respond(message).await?;
    Ok(())
}

/// Handle `/todo [add <text> | list | remove <n>]`
pub async fn handle_todo_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    let args = args.trim();
    if args.is_empty() {
        let keyboard = todo_keyboard(&ctx.app.localization, ctx.language_code);
        ctx.reply(OutboundMessage::plain(ctx.t("todo-choose")).with_keyboard(keyboard))
            .await?;
        return Ok(());
    }

    let (subcommand, rest) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    let rest = rest.trim();

    let reply = match subcommand.to_lowercase().as_str() {
        "add" if rest.is_empty() => ctx.t("todo-add-usage"),
        "add" => {
            ctx.app.todos.add(ctx.chat_id, rest);
            ctx.t_args("todo-added", &[("task", rest)])
        }
        "list" => return show_todo_list(ctx, "todo-empty").await,
        "remove" => match rest.parse::<usize>() {
            Ok(position) => match ctx.app.todos.remove(ctx.chat_id, position) {
                Ok(task) => ctx.t_args("todo-removed", &[("task", &task)]),
                Err(_) => ctx.t("todo-invalid-number"),
            },
            Err(_) => ctx.t("todo-remove-usage"),
        },
        _ => ctx.t("todo-unknown-subcommand"),
    };
    ctx.reply(OutboundMessage::plain(reply)).await?;
    Ok(())
}

/// Ask a random quiz question
pub async fn show_quiz(ctx: &HandlerContext<'_>) -> Result<()> {
    let (index, question) = quiz::random_question();
    let text = format!(
        "<b>{}</b> {}",
        ctx.t("quiz-question-label"),
        teloxide::utils::html::escape(question.question)
    );
    ctx.respond(OutboundMessage::html(text).with_keyboard(quiz_keyboard(index, question)))
        .await?;
    Ok(())
}

/// Handle `/settings [show | city <name>]`
pub async fn handle_settings_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    let args = args.trim();
    if args.is_empty() {
        let keyboard = settings_keyboard(&ctx.app.localization, ctx.language_code);
        ctx.reply(OutboundMessage::plain(ctx.t("settings-choose")).with_keyboard(keyboard))
            .await?;
        return Ok(());
    }

    let (subcommand, rest) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
    let city = rest.trim();

    let reply = match subcommand.to_lowercase().as_str() {
        "show" => format_settings(
            &ctx.app.localization,
            ctx.app.sessions.default_city(ctx.chat_id).as_deref(),
            ctx.language_code,
        ),
        "city" if city.is_empty() => ctx.t("settings-city-usage"),
        "city" => {
            ctx.app.sessions.set_default_city(ctx.chat_id, city);
            ctx.t_args("city-set", &[("city", city)])
        }
        _ => ctx.t("settings-unknown"),
    };
    ctx.reply(OutboundMessage::plain(reply)).await?;
    Ok(())
}

/// Handle `/subscribe <weather|news> <HH:MM>`
pub async fn handle_subscribe_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let &[kind, time, ..] = tokens.as_slice() else {
        ctx.reply(OutboundMessage::plain(ctx.t("subscribe-usage")))
            .await?;
        return Ok(());
    };

    let reply = match ctx.app.subscriptions.subscribe(ctx.chat_id, kind, time) {
        Ok(subscription) => {
            let time = subscription.time.format("%H:%M").to_string();
            let key = match kind.parse() {
                Ok(NotificationKind::News) => "subscribe-news-set",
                _ => "subscribe-weather-set",
            };
            ctx.t_args(key, &[("time", &time)])
        }
        Err(e @ AppError::InvalidInput(InvalidInput::TimeFormat(_))) => {
            error_logging::log_validation_error(&e, "subscribe", Some(ctx.chat_id.0), Some(time));
            ctx.t("subscribe-time-format")
        }
        Err(e @ AppError::InvalidInput(InvalidInput::Kind(_))) => {
            error_logging::log_validation_error(&e, "subscribe", Some(ctx.chat_id.0), Some(kind));
            ctx.t("subscribe-kind")
        }
        Err(e) => ctx.error_text(&e),
    };
    ctx.reply(OutboundMessage::plain(reply)).await?;
    Ok(())
}

/// Handle `/unsubscribe <weather|news>`
pub async fn handle_unsubscribe_command(ctx: &HandlerContext<'_>, args: &str) -> Result<()> {
    let Some(kind) = args.split_whitespace().next() else {
        ctx.reply(OutboundMessage::plain(ctx.t("unsubscribe-usage")))
            .await?;
        return Ok(());
    };

    let reply = match ctx.app.subscriptions.unsubscribe(ctx.chat_id, kind) {
        Ok(kind) => ctx.t_args("unsubscribe-done", &[("kind", kind.as_str())]),
        Err(AppError::NotFound(_)) => {
            ctx.t_args("unsubscribe-not-found", &[("kind", &kind.to_lowercase())])
        }
        Err(e @ AppError::InvalidInput(InvalidInput::Kind(_))) => {
            error_logging::log_validation_error(&e, "unsubscribe", Some(ctx.chat_id.0), Some(kind));
            ctx.t("subscribe-kind")
        }
        Err(e) => ctx.error_text(&e),
    };
    ctx.reply(OutboundMessage::plain(reply)).await?;
    Ok(())
}

/// /top_quiz has no leaderboard yet
pub async fn show_top_quiz(ctx: &HandlerContext<'_>) -> Result<()> {
    ctx.respond(OutboundMessage::plain(ctx.t("top-quiz-in-development")))
        .await?;
    Ok(())
}
