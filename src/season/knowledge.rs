//! Styling knowledge base
//!
//! Read-only recommendations keyed by season: palette swatches, hair
//! colors, gendered makeup and jewelry, colors to avoid, and per-occasion
//! outfits. The built-in table is embedded at compile time and parsed once
//! per process.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::ColorConverter;
use crate::season::{Season, REACHABLE_SEASONS};
use crate::{AnalysisError, Result};

const BUILTIN_SEASONS: &str = include_str!("../../data/seasons.json");

/// Which gendered branch of a recommendation to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    #[default]
    Female,
    Male,
}

impl FromStr for Presentation {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => Ok(Presentation::Female),
            "male" | "m" => Ok(Presentation::Male),
            _ => Err(AnalysisError::invalid_input(format!("unknown presentation: {}", s))),
        }
    }
}

/// Palette entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swatch {
    pub name: String,
    pub hex: String,
    pub reason: String,
}

/// Named recommendation with its rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub name: String,
    pub reason: String,
}

/// Parallel female/male lists sharing one list of reasons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderedAdvice {
    pub female: Vec<String>,
    pub male: Vec<String>,
    pub reasons: Vec<String>,
}

impl GenderedAdvice {
    /// Items for one presentation paired with their reasons
    ///
    /// Pairs stop at the shorter of the two lists.
    pub fn for_presentation(&self, presentation: Presentation) -> Vec<(&str, &str)> {
        let items = match presentation {
            Presentation::Female => &self.female,
            Presentation::Male => &self.male,
        };
        items
            .iter()
            .zip(&self.reasons)
            .map(|(item, reason)| (item.as_str(), reason.as_str()))
            .collect()
    }
}

/// One outfit suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccasionLook {
    pub outfit: String,
    pub shoes: String,
    pub accessories: String,
    /// Makeup for female looks, grooming for male looks
    #[serde(alias = "makeup", alias = "grooming")]
    pub finishing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccasionLooks {
    pub female: OccasionLook,
    pub male: OccasionLook,
}

/// Everything recommended for one season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonProfile {
    pub description: String,
    pub palette: Vec<Swatch>,
    pub hair: Vec<Advice>,
    pub makeup: GenderedAdvice,
    pub jewelry: GenderedAdvice,
    pub avoid: Vec<Advice>,
    #[serde(default)]
    pub occasions: BTreeMap<String, OccasionLooks>,
}

impl SeasonProfile {
    pub fn makeup_for(&self, presentation: Presentation) -> Vec<(&str, &str)> {
        self.makeup.for_presentation(presentation)
    }

    pub fn jewelry_for(&self, presentation: Presentation) -> Vec<(&str, &str)> {
        self.jewelry.for_presentation(presentation)
    }

    /// Look for a named occasion; `None` when the season has no entry
    pub fn occasion_look(&self, occasion: &str, presentation: Presentation) -> Option<&OccasionLook> {
        self.occasions.get(occasion).map(|looks| match presentation {
            Presentation::Female => &looks.female,
            Presentation::Male => &looks.male,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct KnowledgeDocument {
    seasons: BTreeMap<Season, SeasonProfile>,
}

/// Season to recommendation lookup
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    seasons: BTreeMap<Season, SeasonProfile>,
}

impl KnowledgeBase {
    /// The embedded table, parsed on first use
    pub fn builtin() -> Result<&'static KnowledgeBase> {
        static BUILTIN: OnceLock<std::result::Result<KnowledgeBase, String>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| KnowledgeBase::from_json_str(BUILTIN_SEASONS).map_err(|e| e.to_string()))
            .as_ref()
            .map_err(|message| AnalysisError::KnowledgeBaseError {
                message: message.clone(),
            })
    }

    /// Parse and validate a knowledge table
    ///
    /// # Errors
    ///
    /// Returns `KnowledgeBaseError` if the JSON is malformed, a palette hex
    /// code does not parse, or a season the classifier can emit is missing
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: KnowledgeDocument =
            serde_json::from_str(json).map_err(|e| AnalysisError::KnowledgeBaseError {
                message: format!("malformed knowledge table: {}", e),
            })?;

        let converter = ColorConverter::new();
        for (season, profile) in &document.seasons {
            for swatch in &profile.palette {
                converter.hex_to_srgb(&swatch.hex).map_err(|_| AnalysisError::KnowledgeBaseError {
                    message: format!("{}: invalid hex {} for {}", season, swatch.hex, swatch.name),
                })?;
            }
        }

        if let Some(missing) = REACHABLE_SEASONS
            .iter()
            .find(|season| !document.seasons.contains_key(*season))
        {
            return Err(AnalysisError::KnowledgeBaseError {
                message: format!("no entry for {}", missing),
            });
        }

        debug!(seasons = document.seasons.len(), "knowledge table loaded");
        Ok(Self {
            seasons: document.seasons,
        })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AnalysisError::KnowledgeBaseError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::from_json_str(&content)
    }

    /// Profile for a season
    ///
    /// # Errors
    ///
    /// Returns `KnowledgeBaseError` if the table has no entry for `season`
    pub fn profile(&self, season: Season) -> Result<&SeasonProfile> {
        self.seasons
            .get(&season)
            .ok_or_else(|| AnalysisError::KnowledgeBaseError {
                message: format!("no entry for {}", season),
            })
    }

    pub fn seasons(&self) -> impl Iterator<Item = Season> + '_ {
        self.seasons.keys().copied()
    }

    pub fn contains(&self, season: Season) -> bool {
        self.seasons.contains_key(&season)
    }
}

/// Occasion groups offered for outfit lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccasionCategory {
    Business,
    Social,
    Casual,
    Special,
}

impl OccasionCategory {
    pub const ALL: [OccasionCategory; 4] = [
        OccasionCategory::Business,
        OccasionCategory::Social,
        OccasionCategory::Casual,
        OccasionCategory::Special,
    ];

    pub fn occasions(&self) -> &'static [&'static str] {
        match self {
            OccasionCategory::Business => &["Business Formal", "Business Casual", "Presentation", "Interview"],
            OccasionCategory::Social => &["Cocktail Party", "Wedding Guest", "Date Night", "Brunch"],
            OccasionCategory::Casual => &["Weekend Casual", "Errands", "Work From Home", "Outdoor Activities"],
            OccasionCategory::Special => &["Black Tie", "Formal Dinner", "Gala", "Red Carpet"],
        }
    }

    /// General advice for the category; empty for categories without tips
    pub fn tips(&self) -> &'static [&'static str] {
        match self {
            OccasionCategory::Business => &[
                "Opt for tailored pieces that fit well",
                "Keep accessories minimal and professional",
                "Choose closed-toe shoes for formal settings",
            ],
            OccasionCategory::Social => &[
                "Have fun with accessories and statement pieces",
                "Consider the venue when choosing footwear",
                "Balance bold colors with neutral elements",
            ],
            OccasionCategory::Casual | OccasionCategory::Special => &[],
        }
    }

    /// Category listing an occasion name
    pub fn of(occasion: &str) -> Option<OccasionCategory> {
        Self::ALL
            .into_iter()
            .find(|category| category.occasions().iter().any(|name| *name == occasion))
    }
}

/// Advice that applies to every season
pub const WARDROBE_TIPS: [&str; 3] = [
    "Start with 2-3 pieces in your best colors",
    "Invest in quality basics that mix and match well",
    "Add seasonal accent pieces for variety",
];

/// Condensed summary of a season profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleGuide {
    pub season: Season,
    pub presentation: Presentation,
    pub description: String,
    /// First three palette colors
    pub power_colors: Vec<String>,
    /// First two female jewelry metals
    pub best_metals: Vec<String>,
    pub avoid: Vec<String>,
    /// Leading word of a makeup or grooming product and the feature it targets
    pub focus: Vec<(String, &'static str)>,
}

impl StyleGuide {
    pub fn new(season: Season, profile: &SeasonProfile, presentation: Presentation) -> Self {
        let targets: [&'static str; 2] = match presentation {
            Presentation::Female => ["lips", "cheeks"],
            Presentation::Male => ["complexion", "features"],
        };
        let products = match presentation {
            Presentation::Female => &profile.makeup.female,
            Presentation::Male => &profile.makeup.male,
        };
        let focus = products
            .iter()
            .zip(targets)
            .filter_map(|(product, target)| {
                product
                    .split_whitespace()
                    .next()
                    .map(|word| (word.to_string(), target))
            })
            .collect();

        Self {
            season,
            presentation,
            description: profile.description.clone(),
            power_colors: profile.palette.iter().take(3).map(|s| s.name.clone()).collect(),
            best_metals: profile.jewelry.female.iter().take(2).cloned().collect(),
            avoid: profile.avoid.iter().take(2).map(|a| a.name.clone()).collect(),
            focus,
        }
    }
}
