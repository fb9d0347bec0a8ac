use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use assistant_bot::bot::telegram::{register_commands, run_dispatcher, TelegramMessenger};
use assistant_bot::bot::{AppContext, Messenger};
use assistant_bot::config::AppConfig;
use assistant_bot::dialogue::TranslationDialogue;
use assistant_bot::errors::error_logging;
use assistant_bot::localization;
use assistant_bot::notifier::Notifier;
use assistant_bot::observability;
use assistant_bot::scheduler::TokioScheduler;
use assistant_bot::services::Providers;
use assistant_bot::session::SessionStore;
use assistant_bot::subscriptions::SubscriptionRegistry;
use assistant_bot::todo::TodoStore;
use teloxide::prelude::*;
use tracing::info;

/// Load and validate configuration from the environment
fn load_config() -> Result<AppConfig> {
    let config = AppConfig::from_env().inspect_err(|e| {
        error_logging::log_config_error(e, "environment", "load_config");
    })?;
    config.validate().inspect_err(|e| {
        error_logging::log_config_error(e, "environment", "validate_config");
    })?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();

    let config = load_config()?;

    // Initialize logging, metrics and health endpoints
    observability::init_observability(&config.observability)
        .await?;
    info!("{}", config.summary());

    let localization_manager = localization::create_localization_manager()?;

    // One HTTP client for Telegram and every provider
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.bot.http_timeout_secs))
        .build()?;

    let bot = Bot::with_client(config.bot.token.clone(), client.clone());
    let me = bot.get_me().await?;
    let bot_name = me.username().to_string();
    info!(bot_name = %bot_name, timeout_secs = config.bot.http_timeout_secs, "Bot initialized");

    register_commands(&bot).await?;

    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(bot.clone()));
    let sessions = SessionStore::new();
    let providers = Providers::from_config(&config.providers, client);

    let notifier = Arc::new(Notifier::new(
        Arc::clone(&messenger),
        sessions.clone(),
        Arc::clone(&providers.weather),
        Arc::clone(&providers.news),
        Arc::clone(&localization_manager),
    ));
    let scheduler = Arc::new(TokioScheduler::with_system_clock(notifier));
    let subscriptions = Arc::new(SubscriptionRegistry::new(scheduler));

    let app = Arc::new(AppContext {
        messenger,
        localization: localization_manager,
        dialogue: TranslationDialogue::new(sessions.clone()),
        sessions,
        subscriptions,
        todos: TodoStore::new(),
        providers,
    });

    run_dispatcher(bot, app, bot_name).await;

    info!("Dispatcher stopped, shutting down");
    Ok(())
}
