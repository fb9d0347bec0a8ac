//! Bot commands.

use teloxide::utils::command::BotCommands;

/// Commands understood by the bot; arguments are kept raw and parsed by handlers
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "приветствие и главное меню")]
    Start,
    #[command(description = "список команд")]
    Help,
    #[command(description = "меню с кнопками")]
    Menu,
    #[command(description = "напоминание: /reminder <секунды> <текст>")]
    Reminder(String),
    #[command(description = "текущая погода: /weather [город]")]
    Weather(String),
    #[command(description = "прогноз на 24 часа: /forecast [город]")]
    Forecast(String),
    #[command(description = "курсы валют и криптовалют")]
    Rates,
    #[command(description = "поиск в Wikipedia: /search <запрос>")]
    Search(String),
    #[command(description = "конвертер: /convert <значение> <из> to <в>")]
    Convert(String),
    #[command(description = "интерактивный переводчик")]
    TranslateInteractive,
    #[command(description = "задачи: /todo add|list|remove")]
    Todo(String),
    #[command(description = "викторина")]
    Quiz,
    #[command(description = "настройки: /settings show|city <город>")]
    Settings(String),
    #[command(description = "подписка: /subscribe <weather|news> <HH:MM>")]
    Subscribe(String),
    #[command(description = "отмена подписки: /unsubscribe <weather|news>")]
    Unsubscribe(String),
    #[command(description = "таблица лидеров викторины")]
    TopQuiz,
}

impl Command {
    /// Stable metric label
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Menu => "menu",
            Command::Reminder(_) => "reminder",
            Command::Weather(_) => "weather",
            Command::Forecast(_) => "forecast",
            Command::Rates => "rates",
            Command::Search(_) => "search",
            Command::Convert(_) => "convert",
            Command::TranslateInteractive => "translate_interactive",
            Command::Todo(_) => "todo",
            Command::Quiz => "quiz",
            Command::Settings(_) => "settings",
            Command::Subscribe(_) => "subscribe",
            Command::Unsubscribe(_) => "unsubscribe",
            Command::TopQuiz => "top_quiz",
        }
    }
}
