//! Threshold classifier from a representative skin color to a season
//!
//! Ordered cascade over 8-bit HSV: cool hues first, then warm hues, then the
//! neutral remainder. Within a branch the first matching threshold wins.

use tracing::debug;

use crate::color::HsvColor;
use crate::constants::seasons::*;
use crate::season::Season;

/// The seasons [`classify`] can return
pub const REACHABLE_SEASONS: [Season; 8] = [
    Season::BrightWinter,
    Season::TrueWinter,
    Season::CoolSummer,
    Season::BrightSpring,
    Season::TrueAutumn,
    Season::SoftAutumn,
    Season::SoftSummer,
    Season::TrueSummer,
];

/// Map a representative skin color to a season
///
/// Total over every `HsvColor`. Hue values at or above 180 (outside the
/// 8-bit hue range) fall in the cool branch along with 166..=179.
pub fn classify(color: HsvColor) -> Season {
    let HsvColor {
        hue,
        saturation,
        value,
    } = color;

    let season = if hue < COOL_HUE_BELOW || hue > COOL_HUE_ABOVE {
        if saturation > BRIGHT_WINTER_MIN_SATURATION && value > BRIGHT_WINTER_MIN_VALUE {
            Season::BrightWinter
        } else if value > TRUE_WINTER_MIN_VALUE {
            Season::TrueWinter
        } else {
            Season::CoolSummer
        }
    } else if hue <= WARM_HUE_MAX {
        if saturation > BRIGHT_SPRING_MIN_SATURATION && value > BRIGHT_SPRING_MIN_VALUE {
            Season::BrightSpring
        } else if value > TRUE_AUTUMN_MIN_VALUE {
            Season::TrueAutumn
        } else {
            Season::SoftAutumn
        }
    } else if saturation < SOFT_SUMMER_SATURATION_BELOW {
        Season::SoftSummer
    } else {
        Season::TrueSummer
    };

    debug!(hue, saturation, value, %season, "classified representative color");
    season
}
