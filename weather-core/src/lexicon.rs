//! Locale tables used to interpret day and time slots.
//!
//! A lexicon is plain data: it can be built in code ([`Lexicon::german`])
//! or loaded from TOML, so another locale can be swapped in without
//! touching the normalizer.
//!
//! Example TOML:
//!
//! ```toml
//! weekday_names = ["Montag", "Dienstag", "Mittwoch", "Donnerstag",
//!                  "Freitag", "Samstag", "Sonntag"]
//! month_names = ["Januar", "Februar", "März", "April", "Mai", "Juni",
//!                "Juli", "August", "September", "Oktober", "November", "Dezember"]
//! noun_case = "capitalized"
//!
//! [[named_days]]
//! label = "morgen"
//! value = { offset = 1 }
//!
//! [[named_times]]
//! label = "mittags"
//! value = { interval = { start = "11:00:00", end = "13:00:00" } }
//!
//! [[time_synonyms]]
//! synonym = "mittag"
//! canonical = "mittags"
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayValue {
    /// Days relative to today.
    Offset(i64),
    /// A fixed calendar date. Not supported by the normalizer yet.
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedDay {
    pub label: String,
    pub value: DayValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeValue {
    /// A single time of day. Not supported by the normalizer yet.
    At(NaiveTime),
    Interval { start: NaiveTime, end: NaiveTime },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedTime {
    pub label: String,
    pub value: TimeValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSynonym {
    pub synonym: String,
    pub canonical: String,
}

/// How the requested-attribute slot is cased before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NounCase {
    /// First letter upper case, rest lower case (German nouns).
    #[default]
    Capitalized,
    AsIs,
}

impl NounCase {
    pub fn apply(&self, value: &str) -> String {
        match self {
            NounCase::AsIs => value.to_string(),
            NounCase::Capitalized => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    pub named_days: Vec<NamedDay>,
    /// Monday first, aligned with `Weekday::num_days_from_monday`.
    pub weekday_names: Vec<String>,
    /// January first.
    pub month_names: Vec<String>,
    #[serde(default)]
    pub named_times: Vec<NamedTime>,
    #[serde(default)]
    pub time_synonyms: Vec<TimeSynonym>,
    #[serde(default)]
    pub noun_case: NounCase,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::german()
    }
}

impl Lexicon {
    /// Built-in German tables.
    pub fn german() -> Self {
        fn day(label: &str, offset: i64) -> NamedDay {
            NamedDay {
                label: label.to_string(),
                value: DayValue::Offset(offset),
            }
        }
        fn interval(label: &str, start: u32, end: u32) -> NamedTime {
            NamedTime {
                label: label.to_string(),
                value: TimeValue::Interval {
                    start: hour(start),
                    end: hour(end),
                },
            }
        }
        fn hour(h: u32) -> NaiveTime {
            NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN)
        }
        fn synonym(synonym: &str, canonical: &str) -> TimeSynonym {
            TimeSynonym {
                synonym: synonym.to_string(),
                canonical: canonical.to_string(),
            }
        }
        fn names(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            named_days: vec![day("heute", 0), day("morgen", 1), day("übermorgen", 2)],
            weekday_names: names(&[
                "Montag",
                "Dienstag",
                "Mittwoch",
                "Donnerstag",
                "Freitag",
                "Samstag",
                "Sonntag",
            ]),
            month_names: names(&[
                "Januar",
                "Februar",
                "März",
                "April",
                "Mai",
                "Juni",
                "Juli",
                "August",
                "September",
                "Oktober",
                "November",
                "Dezember",
            ]),
            named_times: vec![
                interval("morgens", 6, 10),
                interval("vormittags", 9, 12),
                interval("mittags", 11, 13),
                interval("nachmittags", 13, 18),
                interval("abends", 18, 22),
                interval("nachts", 0, 5),
                NamedTime {
                    label: "mitternacht".to_string(),
                    value: TimeValue::At(NaiveTime::MIN),
                },
            ],
            time_synonyms: vec![
                synonym("früh", "morgens"),
                synonym("morgen früh", "morgens"),
                synonym("vormittag", "vormittags"),
                synonym("mittag", "mittags"),
                synonym("nachmittag", "nachmittags"),
                synonym("abend", "abends"),
                synonym("nacht", "nachts"),
            ],
            noun_case: NounCase::Capitalized,
        }
    }

    /// Load a lexicon from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read lexicon file: {}", path.display()))?;

        let lexicon: Lexicon = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse lexicon file: {}", path.display()))?;

        lexicon
            .validate()
            .with_context(|| format!("Invalid lexicon file: {}", path.display()))?;

        Ok(lexicon)
    }

    /// Check the shape invariants the normalizer relies on.
    pub fn validate(&self) -> Result<()> {
        if self.weekday_names.len() != 7 {
            bail!("expected 7 weekday names, found {}", self.weekday_names.len());
        }
        if self.month_names.len() != 12 {
            bail!("expected 12 month names, found {}", self.month_names.len());
        }
        for named in &self.named_times {
            if let TimeValue::Interval { start, end } = named.value {
                if start >= end {
                    bail!("named time '{}' has start {start} not before end {end}", named.label);
                }
            }
        }
        for syn in &self.time_synonyms {
            if self.named_time(&syn.canonical).is_none() {
                bail!(
                    "time synonym '{}' points to unknown named time '{}'",
                    syn.synonym,
                    syn.canonical
                );
            }
        }
        Ok(())
    }

    pub fn named_day(&self, value: &str) -> Option<&NamedDay> {
        self.named_days.iter().find(|d| d.label.to_lowercase() == value.to_lowercase())
    }

    /// Index (Monday = 0) of a weekday name.
    pub fn weekday_index(&self, value: &str) -> Option<usize> {
        let value = value.to_lowercase();
        self.weekday_names.iter().position(|w| w.to_lowercase() == value)
    }

    /// Index (January = 0) of a month name.
    pub fn month_index(&self, value: &str) -> Option<usize> {
        let value = value.to_lowercase();
        self.month_names.iter().position(|m| m.to_lowercase() == value)
    }

    pub fn named_time(&self, value: &str) -> Option<&NamedTime> {
        let value = value.to_lowercase();
        self.named_times.iter().find(|t| t.label.to_lowercase() == value)
    }

    /// Looks up a named time directly or through its synonym table.
    pub fn resolve_time(&self, value: &str) -> Option<&NamedTime> {
        let value = value.to_lowercase();
        let canonical = self
            .time_synonyms
            .iter()
            .find(|s| s.synonym.to_lowercase() == value)
            .map(|s| s.canonical.as_str());

        match canonical {
            Some(canonical) => self.named_time(canonical),
            None => self.named_time(&value),
        }
    }
}
