//! Message Handler module for free text and shared locations

use anyhow::Result;
use tracing::{debug, info};

use super::messenger::OutboundMessage;
use super::ui_builder::format_translation;
use super::HandlerContext;
use crate::dialogue::TextOutcome;
use crate::errors::error_logging;

/// Free text goes to the translation dialogue first; anything else is ignored
pub async fn handle_text_message(ctx: &HandlerContext<'_>, text: &str) -> Result<()> {
    let outcome = ctx
        .app
        .dialogue
        .handle_text(ctx.chat_id, text, ctx.app.providers.translator.as_ref())
        .await;

    match outcome {
        TextOutcome::Translated { text } => {
            let formatted = format_translation(&ctx.app.localization, &text, ctx.language_code);
            ctx.reply(OutboundMessage::html(formatted)).await?;
        }
        TextOutcome::Unavailable => {
            ctx.reply(OutboundMessage::plain(ctx.t("translate-unavailable")))
                .await?;
        }
        TextOutcome::PassThrough => {
            debug!(chat_id = %ctx.chat_id, "Free text outside any dialogue ignored");
        }
    }
    Ok(())
}

/// A shared location sets the default city via reverse geocoding
pub async fn handle_location(ctx: &HandlerContext<'_>, lat: f64, lon: f64) -> Result<()> {
    let reply = match ctx.app.providers.weather.city_at(lat, lon).await {
        Ok(Some(city)) => {
            info!(chat_id = %ctx.chat_id, city = %city, "Default city set from location");
            ctx.app.sessions.set_default_city(ctx.chat_id, city.as_str());
            ctx.t_args("city-set", &[("city", &city)])
        }
        Ok(None) => ctx.t("location-city-unknown"),
        Err(e) => {
            error_logging::log_external_error(&e, "weather", "city_at", Some(ctx.chat_id.0));
            ctx.t("error-try-later")
        }
    };
    ctx.reply(OutboundMessage::plain(reply)).await?;
    Ok(())
}
