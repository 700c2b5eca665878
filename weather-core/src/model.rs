use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{error::RequestError, severity::ConditionSeverity};

/// Which aspect of the weather the user asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastType {
    Full,
    Condition,
    Item,
    Temperature,
}

impl ForecastType {
    /// Maps a recognized intent name onto a forecast type.
    pub fn from_intent(name: &str) -> Option<Self> {
        match name {
            "GetWeatherForecastCondition" => Some(Self::Condition),
            "GetWeatherForecastItem" => Some(Self::Item),
            "GetWeatherForecastTemperature" => Some(Self::Temperature),
            "GetWeatherForecast" => Some(Self::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastType::Full => "full",
            ForecastType::Condition => "condition",
            ForecastType::Item => "item",
            ForecastType::Temperature => "temperature",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateType {
    #[default]
    Fixed,
    Interval,
}

impl DateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateType::Fixed => "fixed",
            DateType::Interval => "interval",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Grain {
    #[default]
    Day,
    Hour,
}

impl Grain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grain::Day => "day",
            Grain::Hour => "hour",
        }
    }
}

/// Measurement system passed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }

    pub fn speed_symbol(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// How a location was given. Exactly one representation is used.
///
/// In TOML: `{ lat = 52.5, lon = 13.4 }`, `{ zipcode = "10115", country = "de" }`
/// or just `"Berlin"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationQuery {
    Coordinates { lat: f64, lon: f64 },
    Zip { zipcode: String, country: String },
    Name(String),
}

impl LocationQuery {
    /// Short human-readable form for reports.
    pub fn label(&self) -> String {
        match self {
            LocationQuery::Coordinates { lat, lon } => format!("{lat:.2}, {lon:.2}"),
            LocationQuery::Zip { zipcode, country } => {
                format!("{zipcode} {}", country.to_uppercase())
            }
            LocationQuery::Name(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub query: LocationQuery,
    /// Filled in from the provider response for name or zip queries.
    pub resolved: Option<Coordinates>,
}

impl Location {
    pub fn new(query: LocationQuery) -> Self {
        Self {
            query,
            resolved: None,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new(LocationQuery::Name(name.into()))
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        match self.query {
            LocationQuery::Coordinates { lat, lon } => Some(Coordinates { lat, lon }),
            _ => self.resolved,
        }
    }

    /// Records the coordinates the provider resolved this location to.
    /// A no-op when coordinates are already known.
    pub fn backfill(&mut self, coordinates: Coordinates) {
        if self.coordinates().is_none() {
            self.resolved = Some(coordinates);
        }
    }
}

/// The normalized form of a recognized weather intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRequest {
    /// `None` when the intent name was not a weather intent.
    pub forecast_type: Option<ForecastType>,
    pub date_type: DateType,
    pub grain: Grain,
    pub request_date: NaiveDate,
    /// How the date was given, e.g. "morgen" or "on Montag". Empty for today.
    pub date_specified: String,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub time_specified: String,
    pub requested: Option<String>,
    /// `None` means the configured default location.
    pub location: Option<Location>,
    pub status: Option<RequestError>,
}

impl WeatherRequest {
    /// Default request: the whole of `today`.
    pub fn new(today: NaiveDate, forecast_type: Option<ForecastType>) -> Self {
        Self {
            forecast_type,
            date_type: DateType::Fixed,
            grain: Grain::Day,
            request_date: today,
            date_specified: String::new(),
            start_time: None,
            end_time: None,
            time_specified: String::new(),
            requested: None,
            location: None,
            status: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_none()
    }

    /// Records `error` unless an earlier step already failed.
    pub fn fail(&mut self, error: RequestError) {
        if self.status.is_none() {
            self.status = Some(error);
        }
    }
}

/// One forecast sample of a day, with its condition classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSample {
    pub time: NaiveTime,
    pub temperature: f64,
    pub condition: ConditionSeverity,
    pub pressure: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction: u16,
}

/// All samples of one calendar day, ascending by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAtDate {
    pub date: NaiveDate,
    pub samples: Vec<WeatherSample>,
}

impl WeatherAtDate {
    /// Samples with `start <= time <= end`.
    pub fn between(&self, start: NaiveTime, end: NaiveTime) -> Vec<&WeatherSample> {
        self.samples
            .iter()
            .filter(|s| s.time >= start && s.time <= end)
            .collect()
    }

    pub fn closest_to(&self, time: NaiveTime) -> Option<&WeatherSample> {
        self.samples
            .iter()
            .min_by_key(|s| (s.time - time).num_seconds().abs())
    }
}

/// Aggregated provider response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherForecast {
    pub days: Vec<WeatherAtDate>,
    pub coordinates: Coordinates,
    pub units: Units,
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
}

impl WeatherForecast {
    pub fn day(&self, date: NaiveDate) -> Option<&WeatherAtDate> {
        self.days.iter().find(|d| d.date == date)
    }
}
