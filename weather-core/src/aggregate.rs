//! Groups flat provider samples into per-day forecasts.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{
    model::{WeatherAtDate, WeatherSample},
    severity::ConditionSeverity,
};

/// One raw forecast entry, already converted to local time.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub condition_code: u16,
    pub description: String,
    pub family: String,
    pub pressure: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction: u16,
}

impl ForecastSample {
    fn into_weather_sample(self) -> WeatherSample {
        WeatherSample {
            time: self.timestamp.time(),
            temperature: self.temperature,
            condition: ConditionSeverity::from_vendor(
                self.condition_code,
                self.description,
                self.family,
            ),
            pressure: self.pressure,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            wind_direction: self.wind_direction,
        }
    }
}

/// Buckets samples by calendar date.
///
/// Days appear in the order they are first seen and samples keep their
/// relative input order. Days missing from the input are simply absent.
pub fn aggregate(samples: impl IntoIterator<Item = ForecastSample>) -> Vec<WeatherAtDate> {
    let mut days: Vec<WeatherAtDate> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for sample in samples {
        let date = sample.timestamp.date();
        let slot = *index.entry(date).or_insert_with(|| {
            days.push(WeatherAtDate {
                date,
                samples: Vec::new(),
            });
            days.len() - 1
        });
        days[slot].samples.push(sample.into_weather_sample());
    }

    days
}
