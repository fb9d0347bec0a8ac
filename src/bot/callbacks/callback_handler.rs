//! Main routing handler for inline button presses.
//!
//! Presses are acknowledged by the Telegram layer before they get here; every
//! answer edits the message that carried the keyboard.

use anyhow::Result;
use tracing::debug;

use super::callback_types::{CallbackAction, MenuOption, SettingsAction, TodoAction};
use crate::bot::command_handlers::{
    begin_translation, show_forecast, show_quiz, show_rates, show_todo_list, show_top_quiz,
    show_weather,
};
use crate::bot::messenger::OutboundMessage;
use crate::bot::ui_builder::{
    format_settings, language_keyboard, location_request_keyboard, settings_keyboard,
    subscription_keyboard,
};
use crate::bot::HandlerContext;
use crate::dialogue::{LanguageStep, SelectionOutcome};
use crate::errors::{error_logging, AppError};
use crate::quiz::{check_answer, QuizVerdict};
use crate::subscriptions::NotificationKind;

/// Handle one button press
pub async fn handle_callback(
    ctx: &HandlerContext<'_>,
    action: Option<&CallbackAction>,
) -> Result<()> {
    let Some(action) = action else {
        debug!(chat_id = %ctx.chat_id, "Ignoring button press with unknown data");
        return Ok(());
    };

    match action {
        CallbackAction::Menu(option) => handle_menu_option(ctx, *option).await,
        CallbackAction::SelectSourceLanguage(code) => {
            handle_language_selection(ctx, LanguageStep::Source, code).await
        }
        CallbackAction::SelectTargetLanguage(code) => {
            handle_language_selection(ctx, LanguageStep::Target, code).await
        }
        CallbackAction::QuizAnswer { question, choice } => {
            handle_quiz_answer(ctx, *question, *choice).await
        }
        CallbackAction::Settings(action) => handle_settings_action(ctx, *action).await,
        CallbackAction::Todo(action) => handle_todo_action(ctx, *action).await,
        CallbackAction::Subscribe(kind) => {
            let key = match kind {
                NotificationKind::Weather => "subscribe-weather-hint",
                NotificationKind::News => "subscribe-news-hint",
            };
            ctx.respond(OutboundMessage::plain(ctx.t(key))).await?;
            Ok(())
        }
    }
}

async fn handle_menu_option(ctx: &HandlerContext<'_>, option: MenuOption) -> Result<()> {
    let hint = |key: &str| OutboundMessage::plain(ctx.t(key));

    match option {
        MenuOption::Reminder => ctx.respond(hint("menu-reminder-hint")).await?,
        MenuOption::Search => ctx.respond(hint("menu-search-hint")).await?,
        MenuOption::Convert => ctx.respond(hint("menu-convert-hint")).await?,
        MenuOption::Weather => match ctx.app.sessions.default_city(ctx.chat_id) {
            Some(city) => show_weather(ctx, &city).await?,
            None => ctx.respond(hint("menu-weather-no-city")).await?,
        },
        MenuOption::Forecast => match ctx.app.sessions.default_city(ctx.chat_id) {
            Some(city) => show_forecast(ctx, &city).await?,
            None => ctx.respond(hint("menu-forecast-no-city")).await?,
        },
        MenuOption::Rates => show_rates(ctx).await?,
        MenuOption::Translate => begin_translation(ctx).await?,
        MenuOption::Todo => show_todo_list(ctx, "todo-empty-hint").await?,
        MenuOption::Quiz => show_quiz(ctx).await?,
        MenuOption::Settings => {
            let summary = format_settings(
                &ctx.app.localization,
                ctx.app.sessions.default_city(ctx.chat_id).as_deref(),
                ctx.language_code,
            );
            let keyboard = settings_keyboard(&ctx.app.localization, ctx.language_code);
            ctx.respond(
                OutboundMessage::plain(format!("{}\n{}", summary, ctx.t("settings-choose")))
                    .with_keyboard(keyboard),
            )
            .await?
        }
        MenuOption::Subscriptions => {
            let keyboard = subscription_keyboard(&ctx.app.localization, ctx.language_code);
            ctx.respond(hint("subscribe-choose").with_keyboard(keyboard))
                .await?
        }
        MenuOption::TopQuiz => show_top_quiz(ctx).await?,
    }
    Ok(())
}

async fn handle_language_selection(
    ctx: &HandlerContext<'_>,
    step: LanguageStep,
    code: &str,
) -> Result<()> {
    match ctx.app.dialogue.select(ctx.chat_id, step, code) {
        Ok(SelectionOutcome::SourceSelected(source)) => {
            debug!(chat_id = %ctx.chat_id, source = source.code, "Source language selected");
            let keyboard =
                language_keyboard(&ctx.app.localization, LanguageStep::Target, ctx.language_code);
            let prompt = OutboundMessage::plain(ctx.t("translate-choose-target"));
            ctx.respond(prompt.with_keyboard(keyboard)).await?;
        }
        Ok(SelectionOutcome::TargetSelected(target)) => {
            debug!(chat_id = %ctx.chat_id, target = target.code, "Target language selected");
            ctx.respond(OutboundMessage::plain(ctx.t("translate-enter-text")))
                .await?;
        }
        Ok(SelectionOutcome::Ignored) => {
            debug!(
                chat_id = %ctx.chat_id,
                code = %code,
                ?step,
                "Language press outside its step ignored"
            );
        }
        Err(e @ AppError::InvalidInput(_)) => {
            error_logging::log_validation_error(
                &e,
                "language_selection",
                Some(ctx.chat_id.0),
                Some(code),
            );
            ctx.respond(OutboundMessage::plain(ctx.t("translate-unknown-language")))
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn handle_quiz_answer(
    ctx: &HandlerContext<'_>,
    question: usize,
    choice: usize,
) -> Result<()> {
    let text = match check_answer(question, choice) {
        Some(QuizVerdict::Correct) => ctx.t("quiz-correct"),
        Some(QuizVerdict::Wrong { correct }) => ctx.t_args("quiz-wrong", &[("answer", correct)]),
        None => {
            debug!(chat_id = %ctx.chat_id, question, choice, "Quiz answer for unknown question");
            return Ok(());
        }
    };
    ctx.respond(OutboundMessage::plain(text)).await?;
    Ok(())
}

async fn handle_settings_action(ctx: &HandlerContext<'_>, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {
            let summary = format_settings(
                &ctx.app.localization,
                ctx.app.sessions.default_city(ctx.chat_id).as_deref(),
                ctx.language_code,
            );
            ctx.respond(OutboundMessage::plain(summary)).await?;
        }
        SettingsAction::City => {
            ctx.respond(OutboundMessage::plain(ctx.t("settings-city-hint")))
                .await?;
        }
        SettingsAction::Geolocation => {
            // Reply keyboards cannot be attached by editing, so the request goes out separately
            ctx.respond(OutboundMessage::plain(ctx.t("settings-geoloc-prompt")))
                .await?;
            let keyboard = location_request_keyboard(&ctx.app.localization, ctx.language_code);
            ctx.reply(OutboundMessage::plain(ctx.t("location-send-prompt")).with_keyboard(keyboard))
                .await?;
        }
    }
    Ok(())
}

async fn handle_todo_action(ctx: &HandlerContext<'_>, action: TodoAction) -> Result<()> {
    match action {
        TodoAction::List => show_todo_list(ctx, "todo-empty-hint").await,
        TodoAction::Add => {
            ctx.respond(OutboundMessage::plain(ctx.t("todo-add-hint")))
                .await?;
            Ok(())
        }
        TodoAction::Remove => {
            ctx.respond(OutboundMessage::plain(ctx.t("todo-remove-hint")))
                .await?;
            Ok(())
        }
    }
}
