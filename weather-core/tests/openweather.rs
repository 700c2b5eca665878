//! Integration tests for OpenWeatherProvider using wiremock.
//!
//! These tests verify request building, error mapping and aggregation
//! against a mock OpenWeatherMap server.

use chrono::{NaiveDate, NaiveTime};
use voice_weather_core::{
    Coordinates, Location, LocationQuery, OpenWeatherProvider, ProviderError, WeatherProvider,
    WeatherRequest,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create one 3-hourly forecast entry
fn entry(dt: i64, temp: f64, id: u16, main: &str, description: &str) -> serde_json::Value {
    serde_json::json!({
        "dt": dt,
        "main": { "temp": temp, "feels_like": temp - 1.0, "pressure": 1012, "humidity": 81 },
        "weather": [{ "id": id, "main": main, "description": description, "icon": "10d" }],
        "wind": { "speed": 4.1, "deg": 250 },
        "dt_txt": "ignored"
    })
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "cod": "200",
        "cnt": 5,
        "list": [
            entry(1_792_400_400, 8.4, 803, "Clouds", "Überwiegend bewölkt"),
            entry(1_792_411_200, 11.9, 500, "Rain", "Leichter Regen"),
            entry(1_792_443_600, 7.0, 804, "Clouds", "Bedeckt"),
            entry(1_792_454_400, 6.1, 800, "Clear", "Klarer Himmel"),
            entry(1_792_465_200, 5.2, 800, "Clear", "Klarer Himmel"),
        ],
        "city": {
            "id": 2950159,
            "name": "Berlin",
            "coord": { "lat": 52.5244, "lon": 13.4105 },
            "country": "DE",
            "timezone": 7200,
            "sunrise": 1_792_390_320,
            "sunset": 1_792_425_900
        }
    })
}

fn request_for(location: Option<Location>) -> WeatherRequest {
    let mut request = WeatherRequest::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), None);
    request.location = location;
    request
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("KEY".to_string())
        .with_base_url(server.uri())
        .with_timezone(chrono_tz::UTC)
}

#[tokio::test]
async fn test_forecast_by_name_is_aggregated_per_day() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Berlin"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let forecast = provider(&mock_server)
        .get_forecast(&request_for(Some(Location::named("Berlin"))))
        .await
        .unwrap();

    assert_eq!(forecast.days.len(), 2);
    assert_eq!(forecast.days[0].date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
    assert_eq!(forecast.days[0].samples.len(), 3);
    assert_eq!(forecast.days[1].samples.len(), 2);

    let rain = &forecast.days[0].samples[1];
    assert_eq!(rain.time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    assert_eq!(rain.condition.rank, 0);
    assert_eq!(rain.condition.family, "Rain");
    assert_eq!(rain.condition.description, "Leichter Regen");
    assert_eq!(rain.humidity, 81);
    assert_eq!(rain.wind_direction, 250);

    assert_eq!(
        forecast.coordinates,
        Coordinates {
            lat: 52.5244,
            lon: 13.4105,
        }
    );
    assert_eq!(forecast.sunrise, NaiveTime::from_hms_opt(6, 12, 0));
    assert_eq!(forecast.sunset, NaiveTime::from_hms_opt(16, 5, 0));
}

#[tokio::test]
async fn test_forecast_by_coordinates_keeps_request_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "52.5"))
        .and(query_param("lon", "13.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let location = Location::new(LocationQuery::Coordinates {
        lat: 52.5,
        lon: 13.4,
    });
    let forecast = provider(&mock_server)
        .get_forecast(&request_for(Some(location)))
        .await
        .unwrap();

    assert_eq!(
        forecast.coordinates,
        Coordinates {
            lat: 52.5,
            lon: 13.4,
        }
    );
}

#[tokio::test]
async fn test_default_location_is_used() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("zip", "10115,de"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let forecast = provider(&mock_server)
        .with_default_location(LocationQuery::Zip {
            zipcode: "10115".into(),
            country: "de".into(),
        })
        .get_forecast(&request_for(None))
        .await;

    assert!(forecast.is_ok());
}

#[tokio::test]
async fn test_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server)
        .get_forecast(&request_for(Some(Location::named("Berlin"))))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Unauthorized));
}

#[tokio::test]
async fn test_location_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "cod": "404",
            "message": "city not found"
        })))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server)
        .get_forecast(&request_for(Some(Location::named("Atlantis"))))
        .await
        .unwrap_err();

    match err {
        ProviderError::LocationNotFound(name) => assert_eq!(name, "Atlantis"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rate_limited() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let err = provider(&mock_server)
        .get_forecast(&request_for(Some(Location::named("Berlin"))))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn test_server_error_and_garbage_are_connectivity_problems() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Berlin"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("q", "Bonn"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let provider = provider(&mock_server);

    let err = provider
        .get_forecast(&request_for(Some(Location::named("Berlin"))))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NoConnectivity(ref msg) if msg.contains("503")));

    let err = provider
        .get_forecast(&request_for(Some(Location::named("Bonn"))))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NoConnectivity(_)));
}

#[tokio::test]
async fn test_unreachable_server() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let err = OpenWeatherProvider::new("KEY".to_string())
        .with_base_url(uri)
        .get_forecast(&request_for(Some(Location::named("Berlin"))))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::NoConnectivity(_)));
}

#[tokio::test]
async fn test_no_location_at_all() {
    let mock_server = MockServer::start().await;

    let err = provider(&mock_server)
        .get_forecast(&request_for(None))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::LocationNotFound(_)));
}
