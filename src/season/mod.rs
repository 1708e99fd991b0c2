//! Season label vocabulary
//!
//! The sixteen styling seasons shared by the classifier and the knowledge
//! base. Labels serialize as their display names ("True Winter", ...), which
//! are also the keys of the knowledge base.

pub mod classifier;
pub mod knowledge;

pub use classifier::{classify, REACHABLE_SEASONS};
pub use knowledge::{
    KnowledgeBase, OccasionCategory, OccasionLook, Presentation, SeasonProfile, StyleGuide,
    WARDROBE_TIPS,
};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Broad season family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeasonFamily {
    Winter,
    Spring,
    Summer,
    Autumn,
}

/// Personal color season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "True Winter")]
    TrueWinter,
    #[serde(rename = "Bright Winter")]
    BrightWinter,
    #[serde(rename = "Dark Winter")]
    DarkWinter,
    #[serde(rename = "Cool Winter")]
    CoolWinter,
    #[serde(rename = "Bright Spring")]
    BrightSpring,
    #[serde(rename = "True Spring")]
    TrueSpring,
    #[serde(rename = "Light Spring")]
    LightSpring,
    #[serde(rename = "Warm Spring")]
    WarmSpring,
    #[serde(rename = "True Summer")]
    TrueSummer,
    #[serde(rename = "Light Summer")]
    LightSummer,
    #[serde(rename = "Cool Summer")]
    CoolSummer,
    #[serde(rename = "Soft Summer")]
    SoftSummer,
    #[serde(rename = "True Autumn")]
    TrueAutumn,
    #[serde(rename = "Dark Autumn")]
    DarkAutumn,
    #[serde(rename = "Warm Autumn")]
    WarmAutumn,
    #[serde(rename = "Soft Autumn")]
    SoftAutumn,
}

impl Season {
    /// Every season, grouped by family
    pub const ALL: [Season; 16] = [
        Season::TrueWinter,
        Season::BrightWinter,
        Season::DarkWinter,
        Season::CoolWinter,
        Season::BrightSpring,
        Season::TrueSpring,
        Season::LightSpring,
        Season::WarmSpring,
        Season::TrueSummer,
        Season::LightSummer,
        Season::CoolSummer,
        Season::SoftSummer,
        Season::TrueAutumn,
        Season::DarkAutumn,
        Season::WarmAutumn,
        Season::SoftAutumn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Season::TrueWinter => "True Winter",
            Season::BrightWinter => "Bright Winter",
            Season::DarkWinter => "Dark Winter",
            Season::CoolWinter => "Cool Winter",
            Season::BrightSpring => "Bright Spring",
            Season::TrueSpring => "True Spring",
            Season::LightSpring => "Light Spring",
            Season::WarmSpring => "Warm Spring",
            Season::TrueSummer => "True Summer",
            Season::LightSummer => "Light Summer",
            Season::CoolSummer => "Cool Summer",
            Season::SoftSummer => "Soft Summer",
            Season::TrueAutumn => "True Autumn",
            Season::DarkAutumn => "Dark Autumn",
            Season::WarmAutumn => "Warm Autumn",
            Season::SoftAutumn => "Soft Autumn",
        }
    }

    pub fn family(&self) -> SeasonFamily {
        match self {
            Season::TrueWinter | Season::BrightWinter | Season::DarkWinter | Season::CoolWinter => {
                SeasonFamily::Winter
            }
            Season::BrightSpring | Season::TrueSpring | Season::LightSpring | Season::WarmSpring => {
                SeasonFamily::Spring
            }
            Season::TrueSummer | Season::LightSummer | Season::CoolSummer | Season::SoftSummer => {
                SeasonFamily::Summer
            }
            Season::TrueAutumn | Season::DarkAutumn | Season::WarmAutumn | Season::SoftAutumn => {
                SeasonFamily::Autumn
            }
        }
    }

    /// Whether the classifier can ever emit this season
    pub fn is_reachable(&self) -> bool {
        REACHABLE_SEASONS.contains(self)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Season {
    type Err = AnalysisError;

    /// Parse a display name, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Season::ALL
            .iter()
            .copied()
            .find(|season| season.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AnalysisError::invalid_input(format!("unknown season: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_roundtrip() {
        for season in Season::ALL {
            assert_eq!(season.name().parse::<Season>().unwrap(), season);
        }
        assert_eq!(" soft autumn ".parse::<Season>().unwrap(), Season::SoftAutumn);
        assert!("Deep Winter".parse::<Season>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Season::BrightSpring).unwrap();
        assert_eq!(json, "\"Bright Spring\"");
        let parsed: Season = serde_json::from_str("\"Cool Summer\"").unwrap();
        assert_eq!(parsed, Season::CoolSummer);
    }

    #[test]
    fn test_families_have_four_seasons_each() {
        for family in [
            SeasonFamily::Winter,
            SeasonFamily::Spring,
            SeasonFamily::Summer,
            SeasonFamily::Autumn,
        ] {
            let count = Season::ALL.iter().filter(|s| s.family() == family).count();
            assert_eq!(count, 4);
        }
        assert!(Season::ALL.iter().all(|s| s.name().ends_with(&format!("{:?}", s.family()))));
    }

    #[test]
    fn test_reachable_subset() {
        let reachable = Season::ALL.iter().filter(|s| s.is_reachable()).count();
        assert_eq!(reachable, 8);
        assert!(!Season::LightSpring.is_reachable());
        assert!(Season::SoftAutumn.is_reachable());
    }
}
