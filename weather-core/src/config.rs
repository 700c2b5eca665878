use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    intent::SlotNames,
    lexicon::Lexicon,
    model::{LocationQuery, Units},
};

/// Top-level configuration stored on disk.
///
/// Example TOML:
///
/// ```toml
/// api_key = "..."
/// units = "metric"
/// timezone = "Europe/Berlin"
/// default_location = "Berlin"
///
/// [slots]
/// day = "when_day"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// OpenWeatherMap API key.
    pub api_key: Option<String>,

    #[serde(default)]
    pub units: Units,

    #[serde(default = "default_timezone")]
    pub timezone: Tz,

    /// Language of the provider's condition descriptions.
    #[serde(default = "default_language")]
    pub language: String,

    /// Path to a TOML lexicon; the built-in German one when unset.
    pub lexicon: Option<PathBuf>,

    /// Output template, e.g. `"$weather_text"`.
    pub template: Option<String>,

    /// Used when the intent names no location.
    pub default_location: Option<LocationQuery>,

    #[serde(default)]
    pub slots: SlotNames,
}

fn default_timezone() -> Tz {
    chrono_tz::Europe::Berlin
}

fn default_language() -> String {
    "de".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            units: Units::default(),
            timezone: default_timezone(),
            language: default_language(),
            lexicon: None,
            template: None,
            default_location: None,
            slots: SlotNames::default(),
        }
    }
}

impl Config {
    pub const DEFAULT_TEMPLATE: &'static str = "$weather_text";

    /// Load config from the platform config dir, or return an empty default
    /// if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load config from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config dir.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "voice-weather", "voice-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Returns the API key, if present and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Today's date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// The configured lexicon, or the built-in German one.
    pub fn lexicon(&self) -> Result<Lexicon> {
        match &self.lexicon {
            Some(path) => Lexicon::load(path),
            None => Ok(Lexicon::german()),
        }
    }

    pub fn template(&self) -> &str {
        self.template.as_deref().unwrap_or(Self::DEFAULT_TEMPLATE)
    }
}
