use crate::{
    Config, WeatherForecast, WeatherRequest, error::ProviderError,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of multi-day forecasts for a normalized request.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_forecast(
        &self,
        request: &WeatherRequest,
    ) -> Result<WeatherForecast, ProviderError>;
}

/// Construct the forecast provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeatherMap API key configured.\n\
                 Hint: run `voice-weather configure` and enter your API key."
        )
    })?;

    Ok(Box::new(OpenWeatherProvider::from_config(api_key.to_owned(), config)))
}
