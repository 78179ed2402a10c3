//! End-to-end tests of the integrations over real HTTP, against a mock server.

use briefing_core::{
    CurrencyConfig, CurrencyService, HttpTransport, JokesConfig, JokesService, NewsConfig,
    NewsService, WeatherConfig, WeatherService,
};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn transport() -> HttpTransport {
    HttpTransport::with_timeout(Duration::from_secs(5)).expect("Failed to create transport")
}

fn output(buf: Vec<u8>) -> String {
    String::from_utf8(buf).expect("output must be UTF-8")
}

// ============================================================================
// Weather
// ============================================================================

#[tokio::test]
async fn weather_current_conditions() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("key", "WEATHER_KEY"))
        .and(query_param("q", "Amsterdam"))
        .and(query_param("aqi", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "location": {"name": "Amsterdam", "region": "North Holland", "country": "Netherlands"},
            "current": {
                "temp_c": 12.0, "feelslike_c": 10.5, "wind_kph": 18.0, "wind_dir": "SW",
                "pressure_mb": 1012.0, "humidity": 81, "uv": 2.0,
                "condition": {"text": "Sunny", "code": 1000}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport();
    let service = WeatherService::new(&transport, format!("{}/v1", mock_server.uri()), None);
    let config = WeatherConfig { city: "Amsterdam".into(), token: "WEATHER_KEY".into() };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    assert_eq!(
        output(out),
        "Amsterdam: :sunny: Sunny, t 12.0C (feels like 10.5C), wind SW 18.00 km/h (5.0 m/s), \
         pressure 1012.0 mb, humidity 81, UV 2.0\n"
    );
}

#[tokio::test]
async fn weather_provider_error_is_printed_verbatim() {
    let mock_server = MockServer::start().await;
    let body = r#"{"error":{"code":2006,"message":"API key is invalid."}}"#;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(401).set_body_string(body))
        .mount(&mock_server)
        .await;

    let transport = transport();
    let service = WeatherService::new(&transport, format!("{}/v1", mock_server.uri()), None);
    let config = WeatherConfig { city: "Amsterdam".into(), token: "bad".into() };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    assert_eq!(output(out), format!("Error: {body}\n"));
}

#[tokio::test]
async fn weather_malformed_body_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"location\": "))
        .mount(&mock_server)
        .await;

    let transport = transport();
    let service = WeatherService::new(&transport, format!("{}/v1", mock_server.uri()), None);
    let config = WeatherConfig { city: "Amsterdam".into(), token: "KEY".into() };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    assert!(output(out).starts_with("Error: Reading weather response body failed: "));
}

// ============================================================================
// Currency
// ============================================================================

#[tokio::test]
async fn currency_conversion_with_bundled_symbols() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/latest"))
        .and(query_param("apikey", "CUR_KEY"))
        .and(query_param("base_currency", "EUR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "meta": {"last_updated_at": "2023-06-23T10:15:59Z"},
            "data": {
                "USD": {"code": "USD", "value": 1.25},
                "GBP": {"code": "GBP", "value": 0.5}
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport();
    let service = CurrencyService::new(&transport, format!("{}/v3", mock_server.uri()), None);
    let config =
        CurrencyConfig { from: "eur".into(), to: "usd,gbp".into(), token: "CUR_KEY".into() };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    assert_eq!(output(out), "1 € = 1.250000 $ = 0.500000 £\n");
}

#[tokio::test]
async fn currency_validation_failure_never_hits_the_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let transport = transport();
    let service = CurrencyService::new(&transport, mock_server.uri(), None);
    let config = CurrencyConfig { from: "EUR".into(), to: "QQQ".into(), token: "K".into() };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    assert_eq!(output(out), "Value \"QQQ\" is not recognized as supported currency\n\n");
}

// ============================================================================
// Jokes
// ============================================================================

#[tokio::test]
async fn jokes_sends_rapidapi_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/joke/Any"))
        .and(query_param("format", "json"))
        .and(query_param("type", "single"))
        .and(query_param("blacklistFlags", "nsfw,racist"))
        .and(header("x-rapidapi-host", "jokeapi-v2.p.rapidapi.com"))
        .and(header("x-rapidapi-key", "JOKE_KEY"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"type": "single", "joke": "Ha-ha!"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport();
    let service = JokesService::new(&transport, format!("{}/joke", mock_server.uri()));
    let config = JokesConfig { emoji: true, token: "JOKE_KEY".into() };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    assert_eq!(output(out), ":rolling_on_the_floor_laughing: Ha-ha!\n");
}

// ============================================================================
// News
// ============================================================================

#[tokio::test]
async fn news_truncates_to_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/top-headlines"))
        .and(query_param("language", "en"))
        .and(query_param("sources", "google-news-en"))
        .and(query_param("pageSize", "1"))
        .and(query_param("apiKey", "NEWS_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "A"}, "title": "First", "description": "One", "url": "https://a/1"},
                {"source": {"id": null, "name": "B"}, "title": "Second", "description": "Two", "url": "https://b/2"}
            ]
        })))
        .mount(&mock_server)
        .await;

    let transport = transport();
    let service = NewsService::new(&transport, format!("{}/v2", mock_server.uri()));
    let config = NewsConfig {
        date: String::new(),
        language: "en".into(),
        source: "google-news-en".into(),
        limit: 1,
        markup: false,
        token: "NEWS_KEY".into(),
    };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    assert_eq!(output(out), "First\nOne\nMore at https://a/1\n\n");
}

// ============================================================================
// Transport failures
// ============================================================================

#[tokio::test]
async fn connection_failure_does_not_leak_token() {
    // bind and drop a listener to get a port nothing listens on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let base = format!("http://127.0.0.1:{port}/v2");

    let transport = transport();
    let service = NewsService::new(&transport, base.clone());
    let config = NewsConfig {
        date: String::new(),
        language: "en".into(),
        source: String::new(),
        limit: 5,
        markup: false,
        token: "TOP_SECRET".into(),
    };

    let mut out = Vec::new();
    service.run(&mut out, &config).await.expect("write");

    let text = output(out);
    assert!(text.starts_with(&format!("Error: News request failed: {base}/...: ")), "got {text:?}");
    assert!(!text.contains("TOP_SECRET"));
    assert!(text.ends_with('\n'));
}
