//! Fixed reference values for the season pipeline
//!
//! Landmark topology, color encoding ranges, and the hue/saturation/value
//! thresholds of the season decision table. Changing any of these changes
//! classification outcomes.

/// 68-point facial landmark topology
pub mod landmarks {
    /// Number of points produced per detected face
    pub const POINT_COUNT: usize = 68;

    /// First index of the skin polygon (outer eyebrow). Points 0-16 are the
    /// jaw/face outline and are excluded.
    pub const SKIN_FIRST: usize = 17;

    /// Last index of the skin polygon (inner lip), inclusive
    pub const SKIN_LAST: usize = 67;

    /// Number of points feeding the convex hull
    pub const SKIN_POINT_COUNT: usize = SKIN_LAST - SKIN_FIRST + 1;

    /// Largest accepted landmark coordinate magnitude in pixels. Keeps hull
    /// cross products well inside `i64`.
    pub const MAX_COORDINATE: i32 = 1 << 24;
}

/// 8-bit hue-saturation-value encoding
pub mod hsv {
    /// Hue is stored as half-degrees, so the full circle spans [0, 180)
    pub const HUE_RANGE: u16 = 180;

    /// Saturation and value span [0, 255]
    pub const CHANNEL_MAX: f32 = 255.0;
}

/// Season decision table thresholds
pub mod seasons {
    /// Hues strictly below this are cool
    pub const COOL_HUE_BELOW: u8 = 15;
    /// Hues strictly above this are cool
    pub const COOL_HUE_ABOVE: u8 = 165;
    /// Warm band is [COOL_HUE_BELOW, WARM_HUE_MAX], inclusive
    pub const WARM_HUE_MAX: u8 = 45;

    pub const BRIGHT_WINTER_MIN_SATURATION: u8 = 150;
    pub const BRIGHT_WINTER_MIN_VALUE: u8 = 180;
    pub const TRUE_WINTER_MIN_VALUE: u8 = 160;

    pub const BRIGHT_SPRING_MIN_SATURATION: u8 = 140;
    pub const BRIGHT_SPRING_MIN_VALUE: u8 = 170;
    pub const TRUE_AUTUMN_MIN_VALUE: u8 = 150;

    /// Neutral hues below this saturation are Soft Summer
    pub const SOFT_SUMMER_SATURATION_BELOW: u8 = 100;
}

/// Dominant color clustering defaults
pub mod clustering {
    /// Number of clusters; only one centroid feeds the classifier
    pub const DEFAULT_CLUSTERS: usize = 3;

    pub const DEFAULT_MAX_ITERATIONS: usize = 300;

    /// Centroid movement below which iteration stops
    pub const DEFAULT_CONVERGENCE: f32 = 1e-4;

    pub const DEFAULT_SEED: u64 = 0;

    /// Cluster indices are stored as u8
    pub const MAX_CLUSTERS: usize = u8::MAX as usize;
}

/// Face detection defaults for the OpenCV locator
pub mod detection {
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.1;
    pub const DEFAULT_MIN_NEIGHBORS: i32 = 3;
    /// Smallest face side in pixels
    pub const DEFAULT_MIN_FACE_SIZE: u32 = 64;
    /// Hulls with less area than this (pixels²) are degenerate
    pub const DEFAULT_MIN_HULL_AREA: f64 = 1.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skin_landmark_span() {
        assert_eq!(landmarks::SKIN_POINT_COUNT, 51);
        assert!(landmarks::SKIN_LAST < landmarks::POINT_COUNT);
    }

    #[test]
    fn test_hue_bands_are_ordered() {
        assert!(seasons::COOL_HUE_BELOW <= seasons::WARM_HUE_MAX);
        assert!(seasons::WARM_HUE_MAX < seasons::COOL_HUE_ABOVE);
        assert!(u16::from(seasons::COOL_HUE_ABOVE) < hsv::HUE_RANGE);
    }

    #[test]
    fn test_cluster_defaults() {
        assert_eq!(clustering::DEFAULT_CLUSTERS, 3);
        assert!(clustering::DEFAULT_CLUSTERS <= clustering::MAX_CLUSTERS);
    }
}
