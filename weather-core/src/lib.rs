//! Core library for the `voice-weather` CLI.
//!
//! This crate defines:
//! - Normalization of recognized voice intents into weather requests
//! - Locale lexicons for named days, weekdays, months and times of day
//! - Condition severity classification and per-day forecast aggregation
//! - The OpenWeatherMap provider, reports and output templates
//! - Configuration handling
//!
//! It is used by `voice-weather-cli`, but can also be embedded in other
//! voice assistant front ends.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod intent;
pub mod lexicon;
pub mod model;
pub mod provider;
pub mod report;
pub mod service;
pub mod severity;
pub mod template;

pub use aggregate::{ForecastSample, aggregate};
pub use config::Config;
pub use error::{ProviderError, RequestError};
pub use intent::{RawIntent, SlotNames, SlotValue, normalize};
pub use lexicon::Lexicon;
pub use model::{
    Coordinates, DateType, ForecastType, Grain, Location, LocationQuery, Units, WeatherAtDate,
    WeatherForecast, WeatherRequest, WeatherSample,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use report::WeatherReport;
pub use service::{Answer, WeatherService};
pub use severity::{ConditionFamily, ConditionSeverity, classify};
