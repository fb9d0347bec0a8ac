//! # Provider Tests
//!
//! HTTP-backed providers against a local wiremock server.

use assistant_bot::config::{BreakerConfig, ProvidersConfig};
use assistant_bot::errors::AppError;
use assistant_bot::services::{
    ExchangeRatesClient, MyMemoryClient, NewsProvider, OpenWeatherClient, RatesProvider,
    RssNewsClient, SearchProvider, Translator, WeatherProvider, WikipediaClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ProvidersConfig {
    ProvidersConfig {
        openweather_api_key: Some("test-key".to_string()),
        openweather_base_url: server.uri(),
        exchange_rates_url: format!("{}/v4/latest/RUB", server.uri()),
        coingecko_base_url: server.uri(),
        wikipedia_api_url: format!("{}/w/api.php", server.uri()),
        translation_api_url: format!("{}/get", server.uri()),
        news_feed_url: format!("{}/rss.xml", server.uri()),
        breaker: BreakerConfig::default(),
    }
}

#[tokio::test]
async fn test_current_weather_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Москва"))
        .and(query_param("appid", "test-key"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cod": 200,
            "weather": [{"description": "ясно"}],
            "main": {"temp": -2.5, "humidity": 81}
        })))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(reqwest::Client::new(), &config_for(&server));
    let weather = client.current("Москва").await.unwrap();

    assert_eq!(weather.city, "Москва");
    assert_eq!(weather.description, "Ясно");
    assert_eq!(weather.temperature, -2.5);
    assert_eq!(weather.humidity, 81.0);
}

#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(reqwest::Client::new(), &config_for(&server));
    assert!(matches!(
        client.forecast("Atlantis").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_forecast_takes_first_eight_entries() {
    let entries: Vec<_> = (0..10)
        .map(|i| {
            json!({
                "dt_txt": format!("2024-03-01 {:02}:00:00", i * 3 % 24),
                "main": {"temp": i as f64},
                "weather": [{"description": "облачно"}]
            })
        })
        .collect();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": "200", "list": entries})))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(reqwest::Client::new(), &config_for(&server));
    let forecast = client.forecast("Казань").await.unwrap();

    assert_eq!(forecast.entries.len(), 8);
    assert_eq!(forecast.entries[0].time, "2024-03-01 00:00:00");
    assert_eq!(forecast.entries[0].description, "Облачно");
}

#[tokio::test]
async fn test_missing_api_key_is_unavailable() {
    let server = MockServer::start().await;
    let config = ProvidersConfig {
        openweather_api_key: None,
        ..config_for(&server)
    };

    let client = OpenWeatherClient::new(reqwest::Client::new(), &config);
    assert!(matches!(
        client.current("Москва").await,
        Err(AppError::ExternalUnavailable(_))
    ));
}

#[tokio::test]
async fn test_reverse_geocoding() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geo/1.0/reverse"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "Berlin"}])))
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new(reqwest::Client::new(), &config_for(&server));
    assert_eq!(
        client.city_at(52.52, 13.4).await.unwrap(),
        Some("Berlin".to_string())
    );
}

#[tokio::test]
async fn test_rates_skip_missing_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/latest/RUB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rates": {"USD": 0.011, "EUR": 0.0102, "CNY": 0.079}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("vs_currencies", "rub"))
        .and(query_param("ids", "bitcoin,ethereum,binancecoin,ripple,cardano"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bitcoin": {"rub": 5234567.0},
            "ripple": {}
        })))
        .mount(&server)
        .await;

    let client = ExchangeRatesClient::new(reqwest::Client::new(), &config_for(&server));
    let snapshot = client.snapshot().await.unwrap();

    assert_eq!(
        snapshot.fiat,
        vec![("USD", 0.011), ("EUR", 0.0102), ("CNY", 0.079)]
    );
    assert_eq!(snapshot.crypto, vec![("Bitcoin (BTC)", 5234567.0)]);
}

#[tokio::test]
async fn test_wikipedia_opensearch_links() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("action", "opensearch"))
        .and(query_param("search", "Rust"))
        .and(query_param("limit", "3"))
        .and(query_param("namespace", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "Rust",
            ["Rust", "Rust (язык программирования)"],
            ["", ""],
            [
                "https://ru.wikipedia.org/wiki/Rust",
                "https://ru.wikipedia.org/wiki/Rust_(язык_программирования)"
            ]
        ])))
        .mount(&server)
        .await;

    let client = WikipediaClient::new(reqwest::Client::new(), &config_for(&server));
    let links = client.search("Rust").await.unwrap();
    assert_eq!(links.len(), 2);
    assert_eq!(links[0], "https://ru.wikipedia.org/wiki/Rust");
}

#[tokio::test]
async fn test_translation_request_and_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("q", "hello"))
        .and(query_param("langpair", "en|ru"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseData": {"translatedText": "привет"},
            "responseStatus": 200
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get"))
        .and(query_param("q", "quota"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseData": {"translatedText": "MYMEMORY WARNING"},
            "responseStatus": "403"
        })))
        .mount(&server)
        .await;

    let client = MyMemoryClient::new(reqwest::Client::new(), &config_for(&server));
    assert_eq!(client.translate("hello", "en", "ru").await.unwrap(), "привет");
    assert!(matches!(
        client.translate("quota", "en", "ru").await,
        Err(AppError::ExternalUnavailable(_))
    ));
}

#[tokio::test]
async fn test_news_feed_is_limited() {
    let items: String = (1..=7)
        .map(|i| format!("<item><title>Item {i}</title><link>https://example.com/{i}</link></item>"))
        .collect();
    let feed = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0"><channel><title>t</title><link>https://example.com</link><description>d</description>{}</channel></rss>"#,
        items
    );

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rss.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(feed))
        .mount(&server)
        .await;

    let client = RssNewsClient::new(reqwest::Client::new(), &config_for(&server));
    let news = client.latest(5).await.unwrap();
    assert_eq!(news.len(), 5);
    assert_eq!(news[4].title, "Item 5");
}

#[tokio::test]
async fn test_repeated_failures_open_the_breaker() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    let config = ProvidersConfig {
        breaker: BreakerConfig {
            failure_threshold: 2,
            reset_timeout_secs: 60,
        },
        ..config_for(&server)
    };
    let client = WikipediaClient::new(reqwest::Client::new(), &config);

    for _ in 0..3 {
        assert!(matches!(
            client.search("anything").await,
            Err(AppError::ExternalUnavailable(_))
        ));
    }
    // The third call never reached the server; `expect(2)` is verified on drop
}
