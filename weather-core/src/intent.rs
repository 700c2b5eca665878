//! Recognized intents and their normalization into a [`WeatherRequest`].
//!
//! The input is the JSON a voice assistant emits after recognition:
//!
//! ```json
//! { "intent": { "name": "GetWeatherForecast" },
//!   "slots": { "when_day": "morgen", "when_time": "mittags", "location": "Berlin" } }
//! ```
//!
//! Normalization never fails. Dates that do not exist and lexicon
//! entries it cannot handle are recorded in `WeatherRequest::status`.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::RequestError,
    lexicon::{DayValue, Lexicon, TimeValue},
    model::{DateType, ForecastType, Grain, Location, WeatherRequest},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentName {
    pub name: String,
    /// Recognizer extras such as `confidence`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A slot value as delivered by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Integer(i64),
    Text(String),
}

impl SlotValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SlotValue::Text(text) => Some(text),
            SlotValue::Integer(_) => None,
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, SlotValue::Text(text) if text.trim().is_empty())
    }
}

impl std::fmt::Display for SlotValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotValue::Integer(n) => write!(f, "{n}"),
            SlotValue::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIntent {
    pub intent: IntentName,
    /// `null` values are treated like missing slots.
    #[serde(default)]
    pub slots: BTreeMap<String, Option<SlotValue>>,
    /// Other top-level fields of the message, e.g. `siteId` or `text`.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RawIntent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            intent: IntentName {
                name: name.into(),
                extra: BTreeMap::new(),
            },
            slots: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: SlotValue) -> Self {
        self.slots.insert(name.into(), Some(value));
        self
    }

    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_slot(name, SlotValue::Text(value.into()))
    }

    pub fn with_field(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// A slot that is present, non-null and not blank.
    pub fn slot(&self, name: &str) -> Option<&SlotValue> {
        self.slots
            .get(name)
            .and_then(Option::as_ref)
            .filter(|value| !value.is_empty())
    }
}

/// Names of the intent slots, as configured in the voice assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotNames {
    pub day: String,
    pub time: String,
    pub location: String,
    pub item: String,
    pub condition: String,
    pub temperature: String,
}

impl Default for SlotNames {
    fn default() -> Self {
        Self {
            day: "when_day".to_string(),
            time: "when_time".to_string(),
            location: "location".to_string(),
            item: "item".to_string(),
            condition: "condition".to_string(),
            temperature: "temperature".to_string(),
        }
    }
}

/// Turns a recognized intent into a normalized weather request for `today`.
pub fn normalize(
    intent: &RawIntent,
    today: NaiveDate,
    lexicon: &Lexicon,
    slots: &SlotNames,
) -> WeatherRequest {
    let forecast_type = ForecastType::from_intent(&intent.intent.name);
    let mut request = WeatherRequest::new(today, forecast_type);

    match intent.slot(&slots.day) {
        Some(day) => {
            debug!(value = %day, "day specified");
            match day.as_text() {
                Some(text) => resolve_day(&mut request, text, today, lexicon),
                None => debug!("day slot is not text, keeping today"),
            }

            match intent.slot(&slots.time) {
                Some(time) => {
                    debug!(value = %time, "time specified");
                    resolve_time(&mut request, time, lexicon);
                }
                None => debug!("no time specified, using the whole day"),
            }
        }
        None => debug!("no day specified, using today"),
    }

    let requested_slot = match forecast_type {
        Some(ForecastType::Condition) => Some(&slots.condition),
        Some(ForecastType::Item) => Some(&slots.item),
        Some(ForecastType::Temperature) => Some(&slots.temperature),
        Some(ForecastType::Full) | None => None,
    };
    if let Some(value) = requested_slot.and_then(|name| intent.slot(name)) {
        debug!(value = %value, "specific attribute requested");
        request.requested = Some(lexicon.noun_case.apply(&value.to_string()));
    }

    if let Some(location) = intent.slot(&slots.location) {
        debug!(value = %location, "location specified");
        request.location = Some(Location::named(location.to_string()));
    }

    request
}

fn resolve_day(request: &mut WeatherRequest, value: &str, today: NaiveDate, lexicon: &Lexicon) {
    let value = value.trim();

    if let Some(named) = lexicon.named_day(value) {
        debug!(label = %named.label, "named day");
        match named.value {
            DayValue::Offset(offset) => {
                let date =
                    TimeDelta::try_days(offset).and_then(|delta| today.checked_add_signed(delta));
                match date {
                    Some(date) => {
                        request.request_date = date;
                        request.date_specified = named.label.clone();
                    }
                    None => {
                        debug!(offset, "offset out of range");
                        request.fail(RequestError::DateError);
                    }
                }
            }
            DayValue::Date(_) => {
                debug!("named day is a literal date");
                request.fail(RequestError::NotImplemented);
            }
        }
        return;
    }

    if let Some(index) = lexicon.weekday_index(value) {
        let name = &lexicon.weekday_names[index];
        debug!(weekday = %name, "weekday");
        let date = (0..7)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .find(|date| date.weekday().num_days_from_monday() as usize == index);
        if let Some(date) = date {
            request.request_date = date;
            request.date_specified = format!("on {name}");
        }
        return;
    }

    if let Some((day, month)) = value.split_once(char::is_whitespace) {
        let (day, month) = (day.trim(), month.trim());
        match lexicon.month_index(month) {
            Some(index) => {
                let name = &lexicon.month_names[index];
                debug!(day, month = %name, "explicit date");
                request.date_specified = format!("on {day}. {name}");
                // Always the current year, even when the date has already passed.
                let date = day.parse::<u32>().ok().and_then(|day| {
                    NaiveDate::from_ymd_opt(today.year(), index as u32 + 1, day)
                });
                match date {
                    Some(date) => request.request_date = date,
                    None => request.fail(RequestError::DateError),
                }
            }
            None => debug!(month, "unknown month name, keeping today"),
        }
        return;
    }

    debug!(value, "unrecognized day, keeping today");
}

fn resolve_time(request: &mut WeatherRequest, value: &SlotValue, lexicon: &Lexicon) {
    request.grain = Grain::Hour;

    match value {
        SlotValue::Text(text) => {
            if let Some(named) = lexicon.resolve_time(text.trim()) {
                debug!(label = %named.label, "named time");
                match named.value {
                    TimeValue::Interval { start, end } => {
                        request.date_type = DateType::Interval;
                        request.start_time = Some(start);
                        request.end_time = Some(end);
                        request.time_specified = named.label.clone();
                    }
                    TimeValue::At(_) => {
                        debug!("named time is a literal time of day");
                        request.fail(RequestError::NotImplemented);
                        request.grain = Grain::Day;
                    }
                }
            } else if text.trim().contains(' ') {
                match parse_hour_minute(text) {
                    Some(time) => {
                        debug!(%time, "hour and minute");
                        request.start_time = Some(time);
                        request.time_specified =
                            format!("at {}:{:02}", time.hour(), time.minute());
                    }
                    None => {
                        debug!(%text, "unparseable hour and minute, using the whole day");
                        request.grain = Grain::Day;
                    }
                }
            } else {
                debug!(%text, "unrecognized time, using the whole day");
                request.grain = Grain::Day;
            }
        }
        SlotValue::Integer(hour) => {
            let time = u32::try_from(*hour)
                .ok()
                .and_then(|h| NaiveTime::from_hms_opt(h, 0, 0));
            match time {
                Some(time) => {
                    debug!(%time, "hour only");
                    request.start_time = Some(time);
                    request.time_specified = format!("at {} o'clock", time.hour());
                }
                None => {
                    debug!(%hour, "hour out of range, using the whole day");
                    request.grain = Grain::Day;
                }
            }
        }
    }
}

/// Parses "HH MM" in 24h notation.
fn parse_hour_minute(text: &str) -> Option<NaiveTime> {
    let mut parts = text.split_whitespace();
    let hour = parts.next()?.parse().ok()?;
    let minute = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}
