//! Output templates with `$name` / `${name}` placeholders.
//!
//! Available values: `intent_name`, `intent_<key>` for every other field of
//! the intent message (`intent_siteId`, `intent_confidence`, ...),
//! `slot_<slot>`, `weather_text` and one `request_<field>` per request field
//! (`request_location_*` for the location). Unknown placeholders are left as
//! they are.

use std::{collections::BTreeMap, sync::LazyLock};

use regex::{Captures, Regex};

use crate::{intent::RawIntent, model::WeatherRequest};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(?:\{(\w+)\}|(\w+))").unwrap());

pub type TemplateValues = BTreeMap<String, String>;

pub fn template_values(
    intent: &RawIntent,
    request: &WeatherRequest,
    weather_text: &str,
) -> TemplateValues {
    let mut values = TemplateValues::new();

    for (key, value) in intent.extra.iter().chain(&intent.intent.extra) {
        if let Some(value) = json_text(value) {
            values.insert(format!("intent_{key}"), value);
        }
    }
    values.insert("intent_name".into(), intent.intent.name.clone());
    for (name, value) in &intent.slots {
        if let Some(value) = value {
            values.insert(format!("slot_{name}"), value.to_string());
        }
    }

    values.insert("weather_text".into(), weather_text.to_string());

    let mut put = |key: &str, value: String| {
        if !value.is_empty() {
            values.insert(format!("request_{key}"), value);
        }
    };
    put(
        "forecast_type",
        request
            .forecast_type
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
    );
    put("date_type", request.date_type.as_str().to_string());
    put("grain", request.grain.as_str().to_string());
    put("request_date", request.request_date.to_string());
    put("date_specified", request.date_specified.clone());
    put(
        "start_time",
        request.start_time.map(|t| t.to_string()).unwrap_or_default(),
    );
    put("end_time", request.end_time.map(|t| t.to_string()).unwrap_or_default());
    put("time_specified", request.time_specified.clone());
    put("requested", request.requested.clone().unwrap_or_default());
    put(
        "status",
        request
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
    );
    if let Some(location) = &request.location {
        put("location_name", location.query.label());
        if let Some(coords) = location.coordinates() {
            put("location_lat", coords.lat.to_string());
            put("location_lon", coords.lon.to_string());
        }
    }

    values
}

/// Strings without quotes, other scalars and structures as JSON. `None` for `null`.
fn json_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Substitutes known placeholders, leaving unknown ones untouched.
pub fn fill_template(template: &str, values: &TemplateValues) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            match values.get(name) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        intent::SlotValue,
        model::{ForecastType, Location},
    };
    use chrono::NaiveDate;

    fn request() -> WeatherRequest {
        let mut request = WeatherRequest::new(
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            Some(ForecastType::Full),
        );
        request.date_specified = "morgen".into();
        request.location = Some(Location::named("Berlin"));
        request
    }

    fn intent() -> RawIntent {
        RawIntent::new("GetWeatherForecast")
            .with_text("when_day", "morgen")
            .with_slot("when_time", SlotValue::Integer(9))
    }

    #[test]
    fn collects_intent_request_and_text() {
        let values = template_values(&intent(), &request(), "Sunny.");
        assert_eq!(values["intent_name"], "GetWeatherForecast");
        assert_eq!(values["slot_when_day"], "morgen");
        assert_eq!(values["slot_when_time"], "9");
        assert_eq!(values["weather_text"], "Sunny.");
        assert_eq!(values["request_forecast_type"], "full");
        assert_eq!(values["request_request_date"], "2026-10-19");
        assert_eq!(values["request_grain"], "day");
        assert_eq!(values["request_location_name"], "Berlin");
        assert!(!values.contains_key("request_start_time"));
        assert!(!values.contains_key("request_status"));
    }

    #[test]
    fn fills_both_placeholder_forms() {
        let values = template_values(&intent(), &request(), "Sunny.");
        let out = fill_template(
            r#"{"text": "$weather_text", "day": "${request_date_specified}"}"#,
            &values,
        );
        assert_eq!(out, r#"{"text": "Sunny.", "day": "morgen"}"#);
    }

    #[test]
    fn intent_message_fields_are_exposed() {
        let json = r#"{
            "intent": { "name": "GetWeatherForecast", "confidence": 0.87 },
            "slots": { "when_day": "morgen" },
            "siteId": "kitchen",
            "sessionId": null,
            "text": "wie wird das wetter"
        }"#;
        let intent: RawIntent = serde_json::from_str(json).unwrap();
        let values = template_values(&intent, &request(), "Sunny.");
        assert_eq!(values["intent_confidence"], "0.87");
        assert!(!values.contains_key("intent_sessionId"));
        assert!(!values.contains_key("intent_slots"));

        let out = fill_template("$intent_siteId|$intent_text|$intent_name", &values);
        assert_eq!(out, "kitchen|wie wird das wetter|GetWeatherForecast");
    }

    #[test]
    fn unknown_placeholders_survive() {
        let values = TemplateValues::new();
        assert_eq!(fill_template("cost: $price ${unit}", &values), "cost: $price ${unit}");
    }
}
