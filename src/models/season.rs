//! Calendar season and its indicator encoding
//!
//! Models were trained with a one-hot season column where winter is the
//! dropped baseline, so winter encodes as all three indicators off.

use chrono::Month;
use serde::{Deserialize, Serialize};

/// Indicator feature names in the order the models expect them
pub const SEASON_INDICATORS: [&str; 3] = ["season_spring", "season_summer", "season_autumn"];

/// Meteorological season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// December to February
    Winter,
    /// March to May
    Spring,
    /// June to August
    Summer,
    /// September to November
    Autumn,
}

impl Season {
    /// Indicator feature that is switched on for this season, if any
    #[must_use]
    pub fn indicator(self) -> Option<&'static str> {
        match self {
            Season::Winter => None,
            Season::Spring => Some(SEASON_INDICATORS[0]),
            Season::Summer => Some(SEASON_INDICATORS[1]),
            Season::Autumn => Some(SEASON_INDICATORS[2]),
        }
    }

    /// Encode as `(feature name, 0.0 | 1.0)` pairs in [`SEASON_INDICATORS`] order
    #[must_use]
    pub fn indicators(self) -> [(&'static str, f64); 3] {
        let active = self.indicator();
        SEASON_INDICATORS.map(|name| (name, if active == Some(name) { 1.0 } else { 0.0 }))
    }
}

impl From<Month> for Season {
    fn from(month: Month) -> Self {
        match month {
            Month::December | Month::January | Month::February => Season::Winter,
            Month::March | Month::April | Month::May => Season::Spring,
            Month::June | Month::July | Month::August => Season::Summer,
            Month::September | Month::October | Month::November => Season::Autumn,
        }
    }
}
