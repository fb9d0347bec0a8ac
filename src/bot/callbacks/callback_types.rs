//! Typed inline-button payloads.
//!
//! Telegram limits callback data to 64 bytes, so actions travel as short
//! `tag:arg` strings and are decoded exactly once, at the update boundary.

use crate::subscriptions::NotificationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Reminder,
    Weather,
    Forecast,
    Rates,
    Search,
    Convert,
    Translate,
    Todo,
    Quiz,
    Settings,
    Subscriptions,
    TopQuiz,
}

impl MenuOption {
    const ALL: [MenuOption; 12] = [
        MenuOption::Reminder,
        MenuOption::Weather,
        MenuOption::Forecast,
        MenuOption::Rates,
        MenuOption::Search,
        MenuOption::Convert,
        MenuOption::Translate,
        MenuOption::Todo,
        MenuOption::Quiz,
        MenuOption::Settings,
        MenuOption::Subscriptions,
        MenuOption::TopQuiz,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MenuOption::Reminder => "reminder",
            MenuOption::Weather => "weather",
            MenuOption::Forecast => "forecast",
            MenuOption::Rates => "rates",
            MenuOption::Search => "search",
            MenuOption::Convert => "convert",
            MenuOption::Translate => "translate",
            MenuOption::Todo => "todo",
            MenuOption::Quiz => "quiz",
            MenuOption::Settings => "settings",
            MenuOption::Subscriptions => "subscribe",
            MenuOption::TopQuiz => "top_quiz",
        }
    }

    fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.as_str() == token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    Show,
    City,
    Geolocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoAction {
    Add,
    List,
    Remove,
}

/// Every action an inline button can carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Menu(MenuOption),
    SelectSourceLanguage(String),
    SelectTargetLanguage(String),
    QuizAnswer { question: usize, choice: usize },
    Settings(SettingsAction),
    Todo(TodoAction),
    Subscribe(NotificationKind),
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Menu(option) => format!("menu:{}", option.as_str()),
            CallbackAction::SelectSourceLanguage(code) => format!("src:{}", code),
            CallbackAction::SelectTargetLanguage(code) => format!("tgt:{}", code),
            CallbackAction::QuizAnswer { question, choice } => {
                format!("quiz:{}:{}", question, choice)
            }
            CallbackAction::Settings(action) => format!(
                "settings:{}",
                match action {
                    SettingsAction::Show => "show",
                    SettingsAction::City => "city",
                    SettingsAction::Geolocation => "geoloc",
                }
            ),
            CallbackAction::Todo(action) => format!(
                "todo:{}",
                match action {
                    TodoAction::Add => "add",
                    TodoAction::List => "list",
                    TodoAction::Remove => "remove",
                }
            ),
            CallbackAction::Subscribe(kind) => format!("sub:{}", kind.as_str()),
        }
    }

    /// Decode callback data; `None` for anything this bot did not produce
    pub fn decode(data: &str) -> Option<Self> {
        let (tag, rest) = data.split_once(':')?;
        match tag {
            "menu" => MenuOption::parse(rest).map(CallbackAction::Menu),
            "src" if !rest.is_empty() => {
                Some(CallbackAction::SelectSourceLanguage(rest.to_string()))
            }
            "tgt" if !rest.is_empty() => {
                Some(CallbackAction::SelectTargetLanguage(rest.to_string()))
            }
            "quiz" => {
                let (question, choice) = rest.split_once(':')?;
                Some(CallbackAction::QuizAnswer {
                    question: question.parse().ok()?,
                    choice: choice.parse().ok()?,
                })
            }
            "settings" => match rest {
                "show" => Some(CallbackAction::Settings(SettingsAction::Show)),
                "city" => Some(CallbackAction::Settings(SettingsAction::City)),
                "geoloc" => Some(CallbackAction::Settings(SettingsAction::Geolocation)),
                _ => None,
            },
            "todo" => match rest {
                "add" => Some(CallbackAction::Todo(TodoAction::Add)),
                "list" => Some(CallbackAction::Todo(TodoAction::List)),
                "remove" => Some(CallbackAction::Todo(TodoAction::Remove)),
                _ => None,
            },
            "sub" => rest.parse().ok().map(CallbackAction::Subscribe),
            _ => None,
        }
    }
}
