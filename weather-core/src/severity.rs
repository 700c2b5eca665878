//! Maps OpenWeatherMap condition codes onto a small, family-relative
//! severity scale.
//!
//! Ranks are only comparable inside one family: rank 2 for rain says
//! nothing about rank 2 for snow. Use [`ConditionFamily::weight`] to
//! compare across families.

use serde::{Deserialize, Serialize};

/// Severity rank of a vendor condition code within its family.
///
/// Unknown codes (and the families without a scale, such as clear sky or
/// fog) rank 0.
pub fn classify(code: u16) -> u8 {
    match code {
        // thunderstorm
        210 => 0,
        211 => 1,
        230 => 3,
        231 => 4,
        232 => 5,
        200 => 6,
        201 => 7,
        202 => 8,
        212 => 9,
        221 => 10,

        // drizzle
        300 => 0,
        301 | 321 => 1,
        302 => 2,
        310 => 3,
        311 => 4,
        312 => 5,
        313 => 6,
        314 => 7,

        // rain
        500 | 520 => 0,
        501 | 521 | 511 => 1,
        502 | 522 => 2,
        503 | 531 => 3,
        504 => 4,

        // snow
        600 | 620 | 612 => 0,
        601 | 615 | 621 | 611 | 613 => 1,
        602 | 616 | 622 => 2,

        // cloud cover
        801 => 0,
        802 => 1,
        803 => 2,
        804 => 3,

        _ => 0,
    }
}

/// Condition family derived from the vendor code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionFamily {
    Thunderstorm,
    Drizzle,
    Rain,
    Snow,
    Atmosphere,
    Clear,
    Clouds,
    Unknown,
}

impl ConditionFamily {
    pub fn from_code(code: u16) -> Self {
        match code {
            200..=299 => Self::Thunderstorm,
            300..=399 => Self::Drizzle,
            500..=599 => Self::Rain,
            600..=699 => Self::Snow,
            700..=799 => Self::Atmosphere,
            800 => Self::Clear,
            801..=804 => Self::Clouds,
            _ => Self::Unknown,
        }
    }

    /// How noteworthy this family is compared to the others. A report
    /// picks the sample with the highest `(weight, rank)` of a period.
    pub fn weight(&self) -> u8 {
        match self {
            Self::Thunderstorm => 6,
            Self::Snow => 5,
            Self::Rain => 4,
            Self::Drizzle => 3,
            Self::Atmosphere => 2,
            Self::Clouds => 1,
            Self::Clear | Self::Unknown => 0,
        }
    }
}

/// A classified condition, carrying the vendor's own wording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSeverity {
    pub code: u16,
    pub rank: u8,
    /// Human-readable description from the provider, e.g. "leichter Regen".
    pub description: String,
    /// Family label from the provider, e.g. "Rain".
    pub family: String,
}

impl ConditionSeverity {
    pub fn from_vendor(
        code: u16,
        description: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Self {
            code,
            rank: classify(code),
            description: description.into(),
            family: family.into(),
        }
    }

    pub fn family_kind(&self) -> ConditionFamily {
        ConditionFamily::from_code(self.code)
    }

    /// Ordering key across families: family weight first, then rank.
    pub fn dominance(&self) -> (u8, u8) {
        (self.family_kind().weight(), self.rank)
    }
}
