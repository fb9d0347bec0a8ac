//! # Scheduling Scenario Tests
//!
//! Reminders and daily subscriptions driven end to end through the
//! dispatcher, with tokio time paused and a wall clock that follows it.

mod test_helpers;

use std::sync::Arc;
use std::time::Duration;

use assistant_bot::bot::{Command, InboundKind};
use assistant_bot::services::NewsItem;
use assistant_bot::subscriptions::NotificationKind;
use teloxide::types::ChatId;
use test_helpers::{march_first, FakeNews, FakeProviders, FakeWeather, TestBot, TokioClock};

const MINUTE: Duration = Duration::from_secs(60);

fn bot_at(hour: u32, minute: u32, fakes: FakeProviders) -> TestBot {
    let clock = Arc::new(TokioClock::starting_at(march_first(hour, minute, 0)));
    TestBot::new(fakes, clock)
}

fn command(command: Command) -> InboundKind {
    InboundKind::Command(command)
}

#[tokio::test(start_paused = true)]
async fn test_reminder_fires_after_delay() {
    let bot = bot_at(12, 0, FakeProviders::default());

    bot.receive(5, command(Command::Reminder("30 Выпить воды".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Напоминание установлено через 30 секунд."
    );
    bot.messenger.clear();

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert!(bot.messenger.sent().is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    let sent = bot.messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, ChatId(5));
    assert_eq!(sent[0].message.text, "⏰ Напоминание: Выпить воды");
    assert_eq!(bot.scheduler.active_jobs(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reminder_rejects_non_positive_delay() {
    let bot = bot_at(12, 0, FakeProviders::default());

    bot.receive(5, command(Command::Reminder("0 test".to_string())))
        .await;
    assert_eq!(bot.messenger.last_text(), "Укажите число секунд больше 0.");

    bot.receive(5, command(Command::Reminder("abc test".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Пожалуйста, укажите корректное число секунд."
    );
    assert_eq!(bot.scheduler.active_jobs(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resubscribe_replaces_previous_time() {
    let fakes = FakeProviders {
        weather: Arc::new(FakeWeather::with_city("Москва", "Ясно", 5.0)),
        ..Default::default()
    };
    let bot = bot_at(8, 0, fakes);
    let chat = 42;

    bot.receive(chat, command(Command::Settings("city Москва".to_string())))
        .await;
    bot.receive(chat, command(Command::Subscribe("weather 08:30".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Подписка на погоду установлена на 08:30."
    );
    bot.receive(chat, command(Command::Subscribe("weather 09:00".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Подписка на погоду установлена на 09:00."
    );
    bot.messenger.clear();

    let subscriptions = bot.app.subscriptions.for_chat(ChatId(chat));
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].0, NotificationKind::Weather);
    assert_eq!(bot.scheduler.active_jobs(), 1);

    // 08:35: the replaced 08:30 job must stay silent
    tokio::time::sleep(35 * MINUTE).await;
    assert!(bot.messenger.sent().is_empty());

    // 09:05: exactly one notification, built from the current default city
    tokio::time::sleep(30 * MINUTE).await;
    let sent = bot.messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat_id, ChatId(chat));
    assert_eq!(
        sent[0].message.text,
        "📬 Подписка: погода в Москва:\nЯсно, 5.0°C"
    );
}

#[tokio::test(start_paused = true)]
async fn test_daily_subscription_fires_every_day() {
    let fakes = FakeProviders {
        weather: Arc::new(FakeWeather::with_city("Казань", "Снег", -3.0)),
        ..Default::default()
    };
    let bot = bot_at(8, 0, fakes);

    bot.receive(1, command(Command::Settings("city Казань".to_string())))
        .await;
    bot.receive(1, command(Command::Subscribe("weather 08:30".to_string())))
        .await;
    bot.messenger.clear();

    tokio::time::sleep(24 * 60 * MINUTE + 31 * MINUTE).await;
    assert_eq!(bot.messenger.sent().len(), 2);
    assert_eq!(bot.fakes.weather.calls.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_weather_notification_without_city() {
    let bot = bot_at(8, 0, FakeProviders::default());

    bot.receive(3, command(Command::Subscribe("weather 08:10".to_string())))
        .await;
    bot.messenger.clear();

    tokio::time::sleep(11 * MINUTE).await;
    assert_eq!(
        bot.messenger.last_text(),
        "📬 Подписка: город по умолчанию не установлен. Используйте /settings для установки."
    );
    assert!(bot.fakes.weather.calls.lock().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_news_digest_is_html_without_preview() {
    let items = (1..=7)
        .map(|i| NewsItem {
            title: format!("Новость {}", i),
            link: format!("https://example.com/{}", i),
        })
        .collect();
    let fakes = FakeProviders {
        news: Arc::new(FakeNews { items }),
        ..Default::default()
    };
    let bot = bot_at(6, 0, fakes);

    bot.receive(9, command(Command::Subscribe("NEWS 07:00".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Подписка на новости установлена на 07:00."
    );
    bot.messenger.clear();

    tokio::time::sleep(61 * MINUTE).await;
    let sent = bot.messenger.sent();
    assert_eq!(sent.len(), 1);
    let digest = &sent[0].message;
    assert!(digest.disable_link_preview);
    assert_eq!(digest.text.matches("<a href=").count(), 5);
    assert!(digest.text.contains("<a href=\"https://example.com/1\">Новость 1</a>"));
    assert!(!digest.text.contains("Новость 6"));
}

#[tokio::test(start_paused = true)]
async fn test_unsubscribe_stops_notifications() {
    let bot = bot_at(8, 0, FakeProviders::default());

    bot.receive(4, command(Command::Subscribe("news 08:30".to_string())))
        .await;
    bot.receive(4, command(Command::Unsubscribe("news".to_string())))
        .await;
    assert_eq!(bot.messenger.last_text(), "Подписка на news отменена.");
    assert_eq!(bot.scheduler.active_jobs(), 0);
    bot.messenger.clear();

    tokio::time::sleep(24 * 60 * MINUTE).await;
    assert!(bot.messenger.sent().is_empty());

    bot.receive(4, command(Command::Unsubscribe("news".to_string())))
        .await;
    assert_eq!(bot.messenger.last_text(), "Подписка на news не найдена.");
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_validation_messages() {
    let bot = bot_at(8, 0, FakeProviders::default());

    // Time is checked before the kind
    bot.receive(2, command(Command::Subscribe("weather 25:00".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Неверный формат времени. Используйте HH:MM (например, 08:30)"
    );

    bot.receive(2, command(Command::Subscribe("stocks 08:00".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Тип подписки должен быть weather или news."
    );

    bot.receive(2, command(Command::Subscribe("weather".to_string())))
        .await;
    assert_eq!(
        bot.messenger.last_text(),
        "Использование: /subscribe <weather|news> <HH:MM>"
    );
    assert_eq!(bot.scheduler.active_jobs(), 0);
}
