//! Country/year records and the indicators tracked for each of them

use serde::{Deserialize, Serialize};
use std::fmt;

mod store;

pub use store::RecordStore;
pub(crate) use store::FlagPatch;

/// The nine survey indicators tracked per country and year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeKey {
    #[serde(rename = "lifeLadder")]
    LifeLadder,
    #[serde(rename = "socialSupport")]
    SocialSupport,
    #[serde(rename = "gdp")]
    LogGdpPerCapita,
    #[serde(rename = "healthyLife")]
    HealthyLifeExpectancy,
    #[serde(rename = "free")]
    Freedom,
    #[serde(rename = "perceptions")]
    PerceptionsOfCorruption,
    #[serde(rename = "positive")]
    PositiveAffect,
    #[serde(rename = "negative")]
    NegativeAffect,
    #[serde(rename = "generosity")]
    Generosity,
}

impl AttributeKey {
    /// All indicators, in narrative order
    pub const ALL: [AttributeKey; 9] = [
        AttributeKey::LifeLadder,
        AttributeKey::SocialSupport,
        AttributeKey::LogGdpPerCapita,
        AttributeKey::HealthyLifeExpectancy,
        AttributeKey::Freedom,
        AttributeKey::PerceptionsOfCorruption,
        AttributeKey::PositiveAffect,
        AttributeKey::NegativeAffect,
        AttributeKey::Generosity,
    ];

    /// Column header used by the survey CSV
    pub fn column_name(self) -> &'static str {
        match self {
            AttributeKey::LifeLadder => "Life Ladder",
            AttributeKey::SocialSupport => "Social support",
            AttributeKey::LogGdpPerCapita => "Log GDP per capita",
            AttributeKey::HealthyLifeExpectancy => "Healthy life expectancy at birth",
            AttributeKey::Freedom => "Freedom to make life choices",
            AttributeKey::PerceptionsOfCorruption => "Perceptions of corruption",
            AttributeKey::PositiveAffect => "Positive affect",
            AttributeKey::NegativeAffect => "Negative affect",
            AttributeKey::Generosity => "Generosity",
        }
    }

    /// Short camelCase key, as used in configuration files
    pub fn key(self) -> &'static str {
        match self {
            AttributeKey::LifeLadder => "lifeLadder",
            AttributeKey::SocialSupport => "socialSupport",
            AttributeKey::LogGdpPerCapita => "gdp",
            AttributeKey::HealthyLifeExpectancy => "healthyLife",
            AttributeKey::Freedom => "free",
            AttributeKey::PerceptionsOfCorruption => "perceptions",
            AttributeKey::PositiveAffect => "positive",
            AttributeKey::NegativeAffect => "negative",
            AttributeKey::Generosity => "generosity",
        }
    }

    /// Parse either the camelCase key or the CSV column name
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|attr| attr.key().eq_ignore_ascii_case(value) || attr.column_name().eq_ignore_ascii_case(value))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Indicator values of one record. `None` is the missing sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Indicators {
    values: [Option<f64>; 9],
}

impl Indicators {
    /// All values missing
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn get(&self, attribute: AttributeKey) -> Option<f64> {
        self.values[attribute.index()]
    }

    /// Store a value. Non-finite values are stored as missing.
    pub fn set(&mut self, attribute: AttributeKey, value: Option<f64>) {
        self.values[attribute.index()] = value.filter(|v| v.is_finite());
    }

    pub fn with(mut self, attribute: AttributeKey, value: f64) -> Self {
        self.set(attribute, Some(value));
        self
    }

    pub fn is_all_missing(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Flags derived by the selection engine. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DerivedFlags {
    pub is_indicator_max: bool,
    pub is_indicator_min: bool,
    pub is_user_selected: bool,
    pub is_displayed: bool,
}

/// Latitude/longitude of a country's reference point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One country/year observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub country_name: String,
    pub year: i32,
    pub indicators: Indicators,
    pub coordinates: Option<Coordinates>,
    flags: DerivedFlags,
}

impl Record {
    pub fn new(country_name: impl Into<String>, year: i32, indicators: Indicators) -> Self {
        Self {
            country_name: country_name.into(),
            year,
            indicators,
            coordinates: None,
            flags: DerivedFlags::default(),
        }
    }

    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn value(&self, attribute: AttributeKey) -> Option<f64> {
        self.indicators.get(attribute)
    }

    /// Derived flags as last resolved by the selection engine
    pub fn flags(&self) -> DerivedFlags {
        self.flags
    }

    pub fn is_displayed(&self) -> bool {
        self.flags.is_displayed
    }
}
