use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use voice_weather_core::{Config, LocationQuery, RawIntent, Units, WeatherService};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "voice-weather", version, about = "Answers recognized weather intents")]
pub struct Cli {
    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set API key, units, timezone and default location.
    Configure,

    /// Normalize an intent and print the resulting request as JSON.
    Parse {
        /// Intent JSON file; reads stdin when absent.
        file: Option<PathBuf>,
    },

    /// Answer an intent with the current forecast.
    Ask {
        /// Intent JSON file; reads stdin when absent.
        file: Option<PathBuf>,

        /// Output template, overriding the configured one.
        #[arg(long)]
        template: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = match &self.config {
            // `configure` may create the file
            Some(path) if !path.exists() && matches!(self.command, Command::Configure) => {
                Config::default()
            }
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command {
            Command::Configure => configure(config, self.config.as_deref()),
            Command::Parse { file } => {
                let intent = read_intent(file.as_deref())?;
                let lexicon = config.lexicon()?;
                let request =
                    voice_weather_core::normalize(&intent, config.today(), &lexicon, &config.slots);
                println!("{}", serde_json::to_string_pretty(&request)?);
                Ok(())
            }
            Command::Ask { file, template } => {
                let intent = read_intent(file.as_deref())?;
                let service = WeatherService::from_config(&config)?;
                let answer = service.answer(&intent, config.today()).await?;
                let template = template.as_deref().unwrap_or_else(|| config.template());
                println!("{}", answer.render(&intent, template));
                Ok(())
            }
        }
    }
}

fn read_intent(file: Option<&Path>) -> Result<RawIntent> {
    let json = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read intent file: {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read intent from stdin")?;
            buf
        }
    };

    serde_json::from_str(&json).context("Failed to parse intent JSON")
}

fn configure(mut config: Config, path: Option<&Path>) -> Result<()> {
    let api_key = Text::new("OpenWeatherMap API key:")
        .with_initial_value(config.api_key.as_deref().unwrap_or_default())
        .prompt()?;
    config.api_key = Some(api_key.trim().to_string()).filter(|key| !key.is_empty());

    let start = Units::all()
        .iter()
        .position(|u| *u == config.units)
        .unwrap_or(0);
    config.units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()?;

    let timezone = Text::new("Timezone (IANA name):")
        .with_initial_value(config.timezone.name())
        .prompt()?;
    config.timezone = timezone
        .trim()
        .parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("Unknown timezone '{timezone}': {e}"))?;

    let current = config
        .default_location
        .as_ref()
        .map(LocationQuery::label)
        .unwrap_or_default();
    let location = Text::new("Default location (place name, empty for none):")
        .with_initial_value(&current)
        .prompt()?;
    let location = location.trim();
    if location != current {
        config.default_location =
            Some(LocationQuery::Name(location.to_string())).filter(|_| !location.is_empty());
    }

    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    println!("Configuration saved.");

    Ok(())
}
