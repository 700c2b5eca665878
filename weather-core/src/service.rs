//! End-to-end answering: intent → request → forecast → report.

use anyhow::{Result, bail};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    Config,
    error::RequestError,
    intent::{RawIntent, SlotNames, normalize},
    lexicon::Lexicon,
    model::{WeatherForecast, WeatherRequest},
    provider::{WeatherProvider, provider_from_config},
    report::WeatherReport,
    template::{fill_template, template_values},
};

/// Terminal outcome of one intent: always carries renderable text.
#[derive(Debug, Clone)]
pub struct Answer {
    pub request: WeatherRequest,
    pub forecast: Option<WeatherForecast>,
    pub text: String,
}

impl Answer {
    fn apology(mut request: WeatherRequest, status: RequestError) -> Self {
        request.status = Some(status);
        Self {
            request,
            forecast: None,
            text: WeatherReport::apology(status).text,
        }
    }

    /// Fills `template` with the intent, the request and the answer text.
    pub fn render(&self, intent: &RawIntent, template: &str) -> String {
        fill_template(template, &template_values(intent, &self.request, &self.text))
    }
}

#[derive(Debug)]
pub struct WeatherService {
    provider: Box<dyn WeatherProvider>,
    lexicon: Lexicon,
    slots: SlotNames,
}

impl WeatherService {
    pub fn new(provider: Box<dyn WeatherProvider>, lexicon: Lexicon, slots: SlotNames) -> Self {
        Self {
            provider,
            lexicon,
            slots,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(provider_from_config(config)?, config.lexicon()?, config.slots.clone()))
    }

    /// Normalizes `intent` without contacting the provider.
    pub fn request(&self, intent: &RawIntent, today: NaiveDate) -> WeatherRequest {
        normalize(intent, today, &self.lexicon, &self.slots)
    }

    /// Answers `intent` as of `today`.
    ///
    /// Recoverable problems (bad dates, provider failures) come back as an
    /// apology. Only an intent that is not a weather intent is an error.
    pub async fn answer(&self, intent: &RawIntent, today: NaiveDate) -> Result<Answer> {
        info!(intent = %intent.intent.name, "Parsing intent");
        let mut request = self.request(intent, today);

        if request.forecast_type.is_none() {
            bail!("Unsupported intent '{}': not a weather forecast intent", intent.intent.name);
        }

        if let Some(status) = request.status {
            info!(status = status.as_str(), "Request cannot be answered");
            return Ok(Answer::apology(request, status));
        }

        info!(date = %request.request_date, grain = request.grain.as_str(), "Requesting weather");
        let forecast = match self.provider.get_forecast(&request).await {
            Ok(forecast) => forecast,
            Err(err) => {
                warn!(error = %err, "Forecast retrieval failed");
                return Ok(Answer::apology(request, RequestError::from(&err)));
            }
        };

        if let Some(location) = request.location.as_mut() {
            location.backfill(forecast.coordinates);
        }

        info!("Formulating answer");
        let text = WeatherReport::new(&request, &forecast).text;
        Ok(Answer {
            request,
            forecast: Some(forecast),
            text,
        })
    }
}
