use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    Config,
    aggregate::{ForecastSample, aggregate},
    error::ProviderError,
    model::{Coordinates, Location, LocationQuery, Units, WeatherForecast, WeatherRequest},
};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeatherMap 5 day / 3 hour forecast.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
    units: Units,
    language: String,
    timezone: Tz,
    default_location: Option<LocationQuery>,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            units: Units::default(),
            language: "de".to_string(),
            timezone: chrono_tz::Europe::Berlin,
            default_location: None,
        }
    }

    pub fn from_config(api_key: String, config: &Config) -> Self {
        Self {
            units: config.units,
            language: config.language.clone(),
            timezone: config.timezone,
            default_location: config.default_location.clone(),
            ..Self::new(api_key)
        }
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_default_location(mut self, location: LocationQuery) -> Self {
        self.default_location = Some(location);
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    fn location_for(&self, request: &WeatherRequest) -> Result<Location, ProviderError> {
        request
            .location
            .clone()
            .or_else(|| self.default_location.clone().map(Location::new))
            .ok_or_else(|| {
                ProviderError::LocationNotFound(
                    "no location given and no default configured".into(),
                )
            })
    }

    fn query_for(&self, location: &Location) -> Vec<(&'static str, String)> {
        let mut query = match (location.coordinates(), &location.query) {
            (Some(Coordinates { lat, lon }), _) => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
            (None, LocationQuery::Zip { zipcode, country }) => {
                vec![("zip", format!("{zipcode},{country}"))]
            }
            (None, LocationQuery::Name(name)) => vec![("q", name.clone())],
            (None, LocationQuery::Coordinates { lat, lon }) => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };

        query.push(("appid", self.api_key.clone()));
        query.push(("units", self.units.as_str().to_string()));
        query.push(("lang", self.language.clone()));
        query
    }

    fn local_time(&self, ts: i64) -> Option<NaiveDateTime> {
        DateTime::from_timestamp(ts, 0)
            .map(|utc| utc.with_timezone(&self.timezone).naive_local())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    pressure: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize, Default)]
struct OwWeather {
    id: u16,
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: u16,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    #[serde(default)]
    name: String,
    coord: OwCoord,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn get_forecast(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherForecast, ProviderError> {
        let location = self.location_for(request)?;
        let url = format!("{}/data/2.5/forecast", self.base_url.trim_end_matches('/'));
        info!(location = %location.query.label(), "Requesting OpenWeatherMap forecast");

        let res = self
            .http
            .get(&url)
            .query(&self.query_for(&location))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        match status {
            StatusCode::UNAUTHORIZED => return Err(ProviderError::Unauthorized),
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::LocationNotFound(location.query.label()));
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(ProviderError::RateLimited),
            s if !s.is_success() => {
                return Err(ProviderError::NoConnectivity(format!(
                    "OpenWeatherMap forecast request failed with status {}: {}",
                    s,
                    truncate_body(&body),
                )));
            }
            _ => {}
        }

        let parsed: OwForecastResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::NoConnectivity(format!(
                "Failed to parse OpenWeatherMap forecast JSON: {e}"
            ))
        })?;

        debug!(city = %parsed.city.name, entries = parsed.list.len(), "forecast received");

        let samples: Vec<ForecastSample> = parsed
            .list
            .into_iter()
            .filter_map(|entry| {
                let Some(timestamp) = self.local_time(entry.dt) else {
                    warn!(dt = entry.dt, "skipping forecast entry with invalid timestamp");
                    return None;
                };
                let weather = entry.weather.into_iter().next().unwrap_or_default();
                Some(ForecastSample {
                    timestamp,
                    temperature: entry.main.temp,
                    condition_code: weather.id,
                    description: weather.description,
                    family: weather.main,
                    pressure: entry.main.pressure,
                    humidity: entry.main.humidity,
                    wind_speed: entry.wind.speed,
                    wind_direction: entry.wind.deg,
                })
            })
            .collect();

        let coordinates = location.coordinates().unwrap_or(Coordinates {
            lat: parsed.city.coord.lat,
            lon: parsed.city.coord.lon,
        });
        let to_time = |ts: Option<i64>| -> Option<NaiveTime> {
            ts.and_then(|ts| self.local_time(ts)).map(|dt| dt.time())
        };

        Ok(WeatherForecast {
            days: aggregate(samples),
            coordinates,
            units: self.units,
            sunrise: to_time(parsed.city.sunrise),
            sunset: to_time(parsed.city.sunset),
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_query_uses_q() {
        let provider = OpenWeatherProvider::new("KEY".into());
        let query = provider.query_for(&Location::named("Berlin"));
        assert!(query.contains(&("q", "Berlin".to_string())));
        assert!(query.contains(&("appid", "KEY".to_string())));
        assert!(query.contains(&("units", "metric".to_string())));
        assert!(query.contains(&("lang", "de".to_string())));
    }

    #[test]
    fn resolved_coordinates_win_over_name() {
        let provider = OpenWeatherProvider::new("KEY".into());
        let mut location = Location::named("Berlin");
        location.backfill(Coordinates {
            lat: 52.5,
            lon: 13.4,
        });

        let query = provider.query_for(&location);
        assert!(query.contains(&("lat", "52.5".to_string())));
        assert!(!query.iter().any(|(k, _)| *k == "q"));
    }

    #[test]
    fn zip_query() {
        let provider = OpenWeatherProvider::new("KEY".into());
        let location = Location::new(LocationQuery::Zip {
            zipcode: "10115".into(),
            country: "de".into(),
        });
        let query = provider.query_for(&location);
        assert!(query.contains(&("zip", "10115,de".to_string())));
    }

    #[test]
    fn missing_location_without_default_is_not_found() {
        let provider = OpenWeatherProvider::new("KEY".into());
        let request =
            WeatherRequest::new(chrono::NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(), None);
        assert!(matches!(
            provider.location_for(&request),
            Err(ProviderError::LocationNotFound(_))
        ));

        let provider = provider.with_default_location(LocationQuery::Name("Hamburg".into()));
        let location = provider.location_for(&request).expect("default applies");
        assert_eq!(location, Location::named("Hamburg"));
    }

    #[test]
    fn timestamps_convert_to_configured_zone() {
        let provider = OpenWeatherProvider::new("KEY".into());
        // 2026-10-18 22:30 UTC is already the 19th in Berlin (CEST, +2).
        let local = provider.local_time(1_792_362_600).unwrap();
        assert_eq!(local.to_string(), "2026-10-19 00:30:00");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "ü".repeat(300);
        let truncated = truncate_body(&body);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
