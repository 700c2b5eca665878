//! Spoken answer for a normalized request and its forecast.

use crate::{
    error::RequestError,
    model::{
        DateType, ForecastType, Grain, WeatherAtDate, WeatherForecast, WeatherRequest,
        WeatherSample,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherReport {
    pub text: String,
}

impl WeatherReport {
    pub fn new(request: &WeatherRequest, forecast: &WeatherForecast) -> Self {
        if let Some(status) = request.status {
            return Self::apology(status);
        }

        let when = when_phrase(request);
        let place = request
            .location
            .as_ref()
            .map(|l| format!(" in {}", l.query.label()))
            .unwrap_or_default();

        let samples = match forecast.day(request.request_date) {
            Some(day) => period(request, day),
            None => Vec::new(),
        };
        let Some(dominant) = samples.iter().max_by_key(|s| s.condition.dominance()) else {
            return Self {
                text: format!("Sorry, I have no forecast for {when}{place}."),
            };
        };

        let symbol = forecast.units.temperature_symbol();
        let temperature = temperature_range(&samples, symbol);
        let condition = &dominant.condition.description;

        let text = match request.forecast_type.unwrap_or(ForecastType::Full) {
            ForecastType::Full => {
                let wind = samples.iter().map(|s| s.wind_speed).fold(0.0, f64::max);
                format!(
                    "{}{place}: {condition}, {temperature}, wind up to {:.0} {}.",
                    capitalize(&when),
                    wind,
                    forecast.units.speed_symbol(),
                )
            }
            ForecastType::Temperature => {
                format!("{}{place} it will be {temperature}.", capitalize(&when))
            }
            ForecastType::Condition => match &request.requested {
                Some(requested) => {
                    let needle = requested.to_lowercase();
                    let hit = samples.iter().find(|s| {
                        s.condition.description.to_lowercase().contains(&needle)
                            || s.condition.family.to_lowercase().contains(&needle)
                    });
                    match hit {
                        Some(s) => {
                            format!("Yes, {when}{place} expect {}.", s.condition.description)
                        }
                        None => format!(
                            "No, {when}{place} no {requested} is expected, rather {condition}."
                        ),
                    }
                }
                None => format!("{}{place}: {condition}.", capitalize(&when)),
            },
            ForecastType::Item => {
                let lead = request
                    .requested
                    .as_ref()
                    .map(|item| format!("Thinking about the {item}? "))
                    .unwrap_or_default();
                format!("{lead}{}{place}: {condition}, {temperature}.", capitalize(&when))
            }
        };

        Self { text }
    }

    pub fn apology(status: RequestError) -> Self {
        Self {
            text: status.user_message().to_string(),
        }
    }
}

/// Samples covering the requested part of the day.
fn period<'a>(request: &WeatherRequest, day: &'a WeatherAtDate) -> Vec<&'a WeatherSample> {
    match (request.grain, request.date_type, request.start_time, request.end_time) {
        (Grain::Hour, DateType::Interval, Some(start), Some(end)) => {
            let inside = day.between(start, end);
            if inside.is_empty() {
                // 3-hourly data can miss a short interval entirely
                day.closest_to(start).into_iter().collect()
            } else {
                inside
            }
        }
        (Grain::Hour, _, Some(start), _) => {
            day.closest_to(start).into_iter().collect()
        }
        _ => day.samples.iter().collect(),
    }
}

fn when_phrase(request: &WeatherRequest) -> String {
    let day = if request.date_specified.is_empty() { "today" } else { &request.date_specified };
    if request.time_specified.is_empty() {
        day.to_string()
    } else {
        format!("{day} {}", request.time_specified)
    }
}

fn temperature_range(samples: &[&WeatherSample], symbol: &str) -> String {
    let min = samples
        .iter()
        .map(|s| s.temperature)
        .fold(f64::INFINITY, f64::min);
    let max = samples
        .iter()
        .map(|s| s.temperature)
        .fold(f64::NEG_INFINITY, f64::max);
    let (min, max) = (round(min), round(max));
    if min == max {
        format!("{min:.0}{symbol}")
    } else {
        format!("between {min:.0} and {max:.0}{symbol}")
    }
}

// avoids "-0"
fn round(value: f64) -> f64 {
    value.round() + 0.0
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Coordinates, Location, Units},
        severity::ConditionSeverity,
    };
    use chrono::{NaiveDate, NaiveTime};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn time(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn sample(
        h: u32,
        temperature: f64,
        code: u16,
        description: &str,
        family: &str,
    ) -> WeatherSample {
        WeatherSample {
            time: time(h),
            temperature,
            condition: ConditionSeverity::from_vendor(code, description, family),
            pressure: 1010.0,
            humidity: 70,
            wind_speed: h as f64 / 3.0,
            wind_direction: 200,
        }
    }

    fn forecast() -> WeatherForecast {
        WeatherForecast {
            days: vec![WeatherAtDate {
                date: date(),
                samples: vec![
                    sample(6, 3.6, 804, "Bedeckt", "Clouds"),
                    sample(9, 6.2, 804, "Bedeckt", "Clouds"),
                    sample(12, 9.8, 500, "Leichter Regen", "Rain"),
                    sample(15, 10.4, 803, "Überwiegend bewölkt", "Clouds"),
                ],
            }],
            coordinates: Coordinates {
                lat: 52.52,
                lon: 13.41,
            },
            units: Units::Metric,
            sunrise: Some(time(7)),
            sunset: Some(time(18)),
        }
    }

    fn request(forecast_type: ForecastType) -> WeatherRequest {
        let mut request = WeatherRequest::new(date(), Some(forecast_type));
        request.date_specified = "morgen".into();
        request
    }

    #[test]
    fn full_day_report_picks_most_noteworthy_condition() {
        let report = WeatherReport::new(&request(ForecastType::Full), &forecast());
        assert_eq!(report.text, "Morgen: Leichter Regen, between 4 and 10°C, wind up to 5 m/s.");
    }

    #[test]
    fn interval_limits_the_samples() {
        let mut req = request(ForecastType::Temperature);
        req.grain = Grain::Hour;
        req.date_type = DateType::Interval;
        req.start_time = Some(time(5));
        req.end_time = Some(time(10));
        req.time_specified = "morgens".into();
        req.location = Some(Location::named("Berlin"));

        let report = WeatherReport::new(&req, &forecast());
        assert_eq!(report.text, "Morgen morgens in Berlin it will be between 4 and 6°C.");
    }

    #[test]
    fn fixed_hour_uses_closest_sample() {
        let mut req = request(ForecastType::Temperature);
        req.grain = Grain::Hour;
        req.start_time = Some(time(14));
        req.time_specified = "at 14 o'clock".into();

        let report = WeatherReport::new(&req, &forecast());
        assert_eq!(report.text, "Morgen at 14 o'clock it will be 10°C.");
    }

    #[test]
    fn condition_question_yes_and_no() {
        let mut req = request(ForecastType::Condition);
        req.requested = Some("Regen".into());
        let yes = WeatherReport::new(&req, &forecast());
        assert_eq!(yes.text, "Yes, morgen expect Leichter Regen.");

        req.requested = Some("Schnee".into());
        let no = WeatherReport::new(&req, &forecast());
        assert!(no.text.starts_with("No, morgen no Schnee is expected"));
    }

    #[test]
    fn item_question_mentions_item() {
        let mut req = request(ForecastType::Item);
        req.requested = Some("Regenschirm".into());
        let report = WeatherReport::new(&req, &forecast());
        assert!(report.text.starts_with("Thinking about the Regenschirm? Morgen: Leichter Regen"));
    }

    #[test]
    fn missing_day_is_reported() {
        let mut req = request(ForecastType::Full);
        req.request_date = NaiveDate::from_ymd_opt(2026, 10, 30).unwrap();
        req.date_specified = "on 30. Oktober".into();
        let report = WeatherReport::new(&req, &forecast());
        assert_eq!(report.text, "Sorry, I have no forecast for on 30. Oktober.");
    }

    #[test]
    fn status_turns_into_apology() {
        let mut req = request(ForecastType::Full);
        req.status = Some(RequestError::DateError);
        let report = WeatherReport::new(&req, &forecast());
        assert_eq!(report.text, RequestError::DateError.user_message());
    }

    #[test]
    fn negative_zero_is_printed_as_zero() {
        let s = sample(6, -0.3, 800, "Klarer Himmel", "Clear");
        assert_eq!(temperature_range(&[&s], "°C"), "0°C");
    }
}
