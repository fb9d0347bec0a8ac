//! UI Builder module for creating keyboards and formatting messages

use teloxide::utils::html::escape;

use crate::bot::callbacks::{CallbackAction, MenuOption, SettingsAction, TodoAction};
use crate::bot::messenger::{InlineButton, Keyboard};
use crate::convert::{Conversion, Unit};
use crate::dialogue::LanguageStep;
use crate::languages::LANGUAGES;
use crate::localization::{t_args_lang, t_lang, LocalizationManager};
use crate::quiz::QuizQuestion;
use crate::services::{CurrentWeather, Forecast, NewsItem, RatesSnapshot};
use crate::services::rates::group_thousands;
use crate::subscriptions::NotificationKind;

const LANGUAGES_PER_ROW: usize = 3;

fn button(
    localization: &LocalizationManager,
    key: &str,
    action: CallbackAction,
    language_code: Option<&str>,
) -> InlineButton {
    InlineButton::new(t_lang(localization, key, language_code), action)
}

/// Main menu with every feature
pub fn main_menu_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> Keyboard {
    let item = |key: &str, option: MenuOption| {
        button(localization, key, CallbackAction::Menu(option), language_code)
    };

    Keyboard::Inline(vec![
        vec![item("menu-reminder", MenuOption::Reminder)],
        vec![
            item("menu-weather", MenuOption::Weather),
            item("menu-forecast", MenuOption::Forecast),
        ],
        vec![
            item("menu-rates", MenuOption::Rates),
            item("menu-search", MenuOption::Search),
        ],
        vec![
            item("menu-convert", MenuOption::Convert),
            item("menu-translate", MenuOption::Translate),
        ],
        vec![
            item("menu-todo", MenuOption::Todo),
            item("menu-quiz", MenuOption::Quiz),
        ],
        vec![
            item("menu-settings", MenuOption::Settings),
            item("menu-subscriptions", MenuOption::Subscriptions),
        ],
        vec![item("menu-top-quiz", MenuOption::TopQuiz)],
    ])
}

/// All supported languages, three per row
pub fn language_keyboard(
    localization: &LocalizationManager,
    step: LanguageStep,
    language_code: Option<&str>,
) -> Keyboard {
    let buttons: Vec<InlineButton> = LANGUAGES
        .iter()
        .map(|lang| {
            let code = lang.code.to_string();
            let action = match step {
                LanguageStep::Source => CallbackAction::SelectSourceLanguage(code),
                LanguageStep::Target => CallbackAction::SelectTargetLanguage(code),
            };
            let label = format!(
                "{} {}",
                t_lang(localization, lang.name_key, language_code),
                lang.flag
            );
            InlineButton::new(label, action)
        })
        .collect();

    Keyboard::Inline(
        buttons
            .chunks(LANGUAGES_PER_ROW)
            .map(|row| row.to_vec())
            .collect(),
    )
}

pub fn settings_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> Keyboard {
    let item = |key: &str, action: SettingsAction| {
        vec![button(localization, key, CallbackAction::Settings(action), language_code)]
    };
    Keyboard::Inline(vec![
        item("settings-show-button", SettingsAction::Show),
        item("settings-city-button", SettingsAction::City),
        item("settings-geoloc-button", SettingsAction::Geolocation),
    ])
}

pub fn subscription_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> Keyboard {
    Keyboard::Inline(vec![vec![
        button(
            localization,
            "subscribe-weather-button",
            CallbackAction::Subscribe(NotificationKind::Weather),
            language_code,
        ),
        button(
            localization,
            "subscribe-news-button",
            CallbackAction::Subscribe(NotificationKind::News),
            language_code,
        ),
    ]])
}

pub fn todo_keyboard(localization: &LocalizationManager, language_code: Option<&str>) -> Keyboard {
    let item = |key: &str, action: TodoAction| {
        vec![button(localization, key, CallbackAction::Todo(action), language_code)]
    };
    Keyboard::Inline(vec![
        item("todo-add-button", TodoAction::Add),
        item("todo-list-button", TodoAction::List),
        item("todo-remove-button", TodoAction::Remove),
    ])
}

/// One answer button per row
pub fn quiz_keyboard(question_index: usize, question: &QuizQuestion) -> Keyboard {
    Keyboard::Inline(
        question
            .options
            .iter()
            .enumerate()
            .map(|(choice, option)| {
                vec![InlineButton::new(
                    *option,
                    CallbackAction::QuizAnswer {
                        question: question_index,
                        choice,
                    },
                )]
            })
            .collect(),
    )
}

pub fn location_request_keyboard(
    localization: &LocalizationManager,
    language_code: Option<&str>,
) -> Keyboard {
    Keyboard::RequestLocation {
        label: t_lang(localization, "location-button", language_code),
    }
}

/// Current weather (HTML)
pub fn format_weather(
    localization: &LocalizationManager,
    weather: &CurrentWeather,
    language_code: Option<&str>,
) -> String {
    let temperature = format!("{:.1}", weather.temperature);
    let humidity = format!("{:.0}", weather.humidity);
    [
        t_args_lang(
            localization,
            "weather-title",
            &[("city", &escape(&weather.city))],
            language_code,
        ),
        t_args_lang(
            localization,
            "weather-conditions",
            &[("description", &escape(&weather.description))],
            language_code,
        ),
        t_args_lang(
            localization,
            "weather-temperature",
            &[("temperature", &temperature)],
            language_code,
        ),
        t_args_lang(
            localization,
            "weather-humidity",
            &[("humidity", &humidity)],
            language_code,
        ),
    ]
    .join("\n")
}

/// 24 h forecast (HTML), one line per entry
pub fn format_forecast(
    localization: &LocalizationManager,
    forecast: &Forecast,
    language_code: Option<&str>,
) -> String {
    let title = t_args_lang(
        localization,
        "forecast-title",
        &[("city", &escape(&forecast.city))],
        language_code,
    );
    let mut message = format!("<b>{}</b>\n", title);
    for entry in &forecast.entries {
        message.push_str(&format!(
            "{}: {:.1}°C, {}\n",
            escape(&entry.time),
            entry.temperature,
            escape(&entry.description)
        ));
    }
    message
}

/// Fiat and crypto rates (HTML)
pub fn format_rates(
    localization: &LocalizationManager,
    rates: &RatesSnapshot,
    language_code: Option<&str>,
) -> String {
    let fiat_title = t_lang(localization, "rates-fiat-title", language_code);
    let mut message = format!("<b>{}</b>\n", fiat_title);
    for (code, rate) in &rates.fiat {
        message.push_str(&format!("{}: {:.2}\n", code, rate));
    }

    let crypto_title = t_lang(localization, "rates-crypto-title", language_code);
    message.push_str(&format!("\n<b>{}</b>\n", crypto_title));
    for (name, price) in &rates.crypto {
        message.push_str(&format!("{}: {} RUB\n", name, group_thousands(*price)));
    }
    message
}

/// Search links (HTML) or a "nothing found" notice
pub fn format_search_results(
    localization: &LocalizationManager,
    query: &str,
    links: &[String],
    language_code: Option<&str>,
) -> String {
    let query = escape(query);
    if links.is_empty() {
        return t_args_lang(
            localization,
            "search-nothing-found",
            &[("query", &query)],
            language_code,
        );
    }

    let links: Vec<String> = links.iter().map(|link| escape(link)).collect();
    format!(
        "<b>{}</b>\n{}",
        t_args_lang(localization, "search-results-title", &[("query", &query)], language_code),
        links.join("\n")
    )
}

fn format_amount(
    localization: &LocalizationManager,
    amount: &str,
    unit: Unit,
    language_code: Option<&str>,
) -> String {
    let label = t_lang(localization, unit.label_key(), language_code);
    match unit {
        Unit::Celsius | Unit::Fahrenheit => format!("{}{}", amount, label),
        _ => format!("{} {}", amount, label),
    }
}

/// `100 kg = 220.46 lb` (plain text)
pub fn format_conversion(
    localization: &LocalizationManager,
    conversion: &Conversion,
    language_code: Option<&str>,
) -> String {
    format!(
        "{} = {}",
        format_amount(localization, &conversion.value.to_string(), conversion.from, language_code),
        format_amount(
            localization,
            &format!("{:.2}", conversion.result),
            conversion.to,
            language_code
        )
    )
}

/// Numbered task list (HTML)
pub fn format_todo_list(
    localization: &LocalizationManager,
    tasks: &[String],
    language_code: Option<&str>,
) -> String {
    let title = t_lang(localization, "todo-list-title", language_code);
    let mut message = format!("<b>{}</b>\n", title);
    for (i, task) in tasks.iter().enumerate() {
        message.push_str(&format!("{}. {}\n", i + 1, escape(task)));
    }
    message
}

/// Translation result as a preformatted block (HTML)
pub fn format_translation(
    localization: &LocalizationManager,
    translated: &str,
    language_code: Option<&str>,
) -> String {
    format!(
        "{}\n<pre>{}</pre>",
        t_lang(localization, "translate-result-title", language_code),
        escape(translated)
    )
}

/// Settings summary (plain text)
pub fn format_settings(
    localization: &LocalizationManager,
    city: Option<&str>,
    language_code: Option<&str>,
) -> String {
    let unset = t_lang(localization, "settings-city-unset", language_code);
    t_args_lang(
        localization,
        "settings-current",
        &[("city", city.unwrap_or(&unset))],
        language_code,
    )
}

/// Daily news digest (HTML links)
pub fn format_news(
    localization: &LocalizationManager,
    items: &[NewsItem],
    language_code: Option<&str>,
) -> String {
    let mut message = format!("<b>{}</b>\n", t_lang(localization, "news-title", language_code));
    for item in items {
        message.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            escape(&item.link),
            escape(&item.title)
        ));
    }
    message
}
