//! Color space conversion utilities
//!
//! Provides conversions between the image's RGB encoding and the 8-bit
//! hue-saturation-value encoding used by the clustering and classification
//! stages:
//! - RGB (0-255) to HSV with hue in half-degrees [0, 180)
//! - HSV back to sRGB for display
//! - Hex color representation

use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};
use crate::constants::hsv::{CHANNEL_MAX, HUE_RANGE};
use crate::{AnalysisError, Result};

/// 8-bit hue-saturation-value triple
///
/// Hue is in half-degrees [0, 180); saturation and value are in [0, 255].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HsvColor {
    pub hue: u8,
    pub saturation: u8,
    pub value: u8,
}

impl HsvColor {
    pub const fn new(hue: u8, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

/// Converter between RGB pixels and 8-bit HSV
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorConverter;

impl ColorConverter {
    pub fn new() -> Self {
        Self
    }

    /// Convert RGB (0-255) to 8-bit HSV
    ///
    /// # Arguments
    ///
    /// * `r`, `g`, `b` - RGB values in range [0, 255]
    ///
    /// # Returns
    ///
    /// HSV with hue halved into [0, 180), saturation and value scaled to [0, 255]
    pub fn rgb_to_hsv(&self, r: u8, g: u8, b: u8) -> HsvColor {
        let srgb = Srgb::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        );
        let hsv: Hsv = Hsv::from_color(srgb);

        let half_degrees = (hsv.hue.into_positive_degrees() / 2.0).round() as u16;
        let hue = (half_degrees % HUE_RANGE) as u8;
        let saturation = (hsv.saturation * CHANNEL_MAX).round().clamp(0.0, CHANNEL_MAX) as u8;
        let value = (hsv.value * CHANNEL_MAX).round().clamp(0.0, CHANNEL_MAX) as u8;

        HsvColor::new(hue, saturation, value)
    }

    /// Convert 8-bit HSV back to sRGB
    pub fn hsv_to_srgb(&self, color: HsvColor) -> Srgb {
        let hsv: Hsv = Hsv::new(
            color.hue as f32 * 2.0,
            color.saturation as f32 / CHANNEL_MAX,
            color.value as f32 / CHANNEL_MAX,
        );
        let srgb: Srgb = Srgb::from_color(hsv);
        Srgb::new(
            srgb.red.clamp(0.0, 1.0),
            srgb.green.clamp(0.0, 1.0),
            srgb.blue.clamp(0.0, 1.0),
        )
    }

    /// Convert sRGB to hexadecimal color string
    ///
    /// # Returns
    ///
    /// Hex color string (e.g., "#FF0000")
    pub fn srgb_to_hex(&self, srgb: Srgb) -> String {
        let r = (srgb.red * 255.0).round() as u8;
        let g = (srgb.green * 255.0).round() as u8;
        let b = (srgb.blue * 255.0).round() as u8;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Hex string for an 8-bit HSV color
    pub fn hsv_to_hex(&self, color: HsvColor) -> String {
        self.srgb_to_hex(self.hsv_to_srgb(color))
    }

    /// Parse hexadecimal color string to sRGB
    ///
    /// # Arguments
    ///
    /// * `hex` - Hex color string (e.g., "#FF0000" or "FF0000")
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the string is not six hex digits
    pub fn hex_to_srgb(&self, hex: &str) -> Result<Srgb> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(AnalysisError::invalid_input(format!(
                "Invalid hex color: expected 6 characters, got {}",
                hex.len()
            )));
        }

        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| AnalysisError::invalid_input(format!("Invalid {} value: {}", name, e)))
        };
        let r = channel(0..2, "red")?;
        let g = channel(2..4, "green")?;
        let b = channel(4..6, "blue")?;

        Ok(Srgb::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
        ))
    }
}
