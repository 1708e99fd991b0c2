//! Configuration structures for the season analysis pipeline.
//!
//! This module defines the tunable parameters of each stage, organized into
//! face detection, skin region extraction, and dominant color clustering.
//!
//! # Configuration Loading
//!
//! Configuration can be loaded from JSON files or constructed programmatically:
//!
//! ```no_run
//! use season_scan::PipelineConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = PipelineConfig::from_json_file(Path::new("config.json"))?;
//!
//! // Or use defaults
//! let config = PipelineConfig::default();
//! # Ok::<(), season_scan::AnalysisError>(())
//! ```
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides.
//!
//! # Configuration Sections
//!
//! - [`FaceDetectionConfig`]: face selection policy and detector models
//! - [`SkinRegionConfig`]: degenerate hull threshold
//! - [`ClusteringConfig`]: k-means parameters and centroid selection

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::color::CentroidSelection;
use crate::constants::{clustering, detection};
use crate::detection::FaceSelection;
use crate::{AnalysisError, Result};

/// Complete pipeline configuration for season analysis.
///
/// Can be serialized to/from JSON for reproducible runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Face detection configuration
    pub face_detection: FaceDetectionConfig,

    /// Skin region configuration
    pub skin_region: SkinRegionConfig,

    /// Dominant color clustering configuration
    pub clustering: ClusteringConfig,
}

/// Face detection parameters.
///
/// The model paths are only read by the OpenCV locator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceDetectionConfig {
    /// Which face to analyze when several are found
    pub selection: FaceSelection,

    /// Haar cascade XML for face detection
    pub cascade_path: Option<PathBuf>,

    /// LBF facemark model (68 points)
    pub landmark_model_path: Option<PathBuf>,

    /// Image pyramid scale step (must be > 1.0)
    pub scale_factor: f64,

    /// Neighbor rectangles required to keep a detection
    pub min_neighbors: i32,

    /// Smallest face side in pixels
    pub min_face_size: u32,
}

impl Default for FaceDetectionConfig {
    fn default() -> Self {
        Self {
            selection: FaceSelection::First,
            cascade_path: None,
            landmark_model_path: None,
            scale_factor: detection::DEFAULT_SCALE_FACTOR,
            min_neighbors: detection::DEFAULT_MIN_NEIGHBORS,
            min_face_size: detection::DEFAULT_MIN_FACE_SIZE,
        }
    }
}

/// Skin region parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinRegionConfig {
    /// Hulls with less area (pixels²) are rejected as degenerate
    pub min_hull_area: f64,
}

impl Default for SkinRegionConfig {
    fn default() -> Self {
        Self {
            min_hull_area: detection::DEFAULT_MIN_HULL_AREA,
        }
    }
}

/// Dominant color clustering parameters.
///
/// `clusters` and `selection` change classification outcomes; the
/// defaults are k=3 with the first centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Number of clusters (k)
    pub clusters: usize,

    /// Iteration cap for centroid relocation
    pub max_iterations: usize,

    /// Convergence threshold on centroid movement
    pub convergence: f32,

    /// RNG seed for centroid initialization
    pub seed: u64,

    /// Centroid handed to the classifier
    pub selection: CentroidSelection,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            clusters: clustering::DEFAULT_CLUSTERS,
            max_iterations: clustering::DEFAULT_MAX_ITERATIONS,
            convergence: clustering::DEFAULT_CONVERGENCE,
            seed: clustering::DEFAULT_SEED,
            selection: CentroidSelection::First,
        }
    }
}

impl PipelineConfig {
    /// Check parameter ranges
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| AnalysisError::ConfigError {
            message,
            source: None,
        };

        if self.clustering.clusters == 0 || self.clustering.clusters > clustering::MAX_CLUSTERS {
            return Err(fail(format!(
                "clustering.clusters must be in 1..={}, got {}",
                clustering::MAX_CLUSTERS,
                self.clustering.clusters
            )));
        }
        if self.clustering.max_iterations == 0 {
            return Err(fail("clustering.max_iterations must be positive".to_string()));
        }
        if !self.clustering.convergence.is_finite() || self.clustering.convergence < 0.0 {
            return Err(fail(format!(
                "clustering.convergence must be a non-negative number, got {}",
                self.clustering.convergence
            )));
        }
        if !self.skin_region.min_hull_area.is_finite() || self.skin_region.min_hull_area < 0.0 {
            return Err(fail(format!(
                "skin_region.min_hull_area must be a non-negative number, got {}",
                self.skin_region.min_hull_area
            )));
        }
        if !(self.face_detection.scale_factor > 1.0) {
            return Err(fail(format!(
                "face_detection.scale_factor must be greater than 1.0, got {}",
                self.face_detection.scale_factor
            )));
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("Failed to read {}", path.display()), e)
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!("Failed to parse {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("Failed to serialize configuration", e))?;
        std::fs::write(path, json).map_err(|e| {
            AnalysisError::config(format!("Failed to write {}", path.display()), e)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.clustering.clusters, 3);
        assert_eq!(config.clustering.selection, CentroidSelection::First);
        assert_eq!(config.face_detection.selection, FaceSelection::First);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "clustering": { "seed": 42, "selection": "heaviest" } }"#).unwrap();
        assert_eq!(config.clustering.seed, 42);
        assert_eq!(config.clustering.selection, CentroidSelection::Heaviest);
        assert_eq!(config.clustering.clusters, 3);
        assert_eq!(config.skin_region, SkinRegionConfig::default());
    }

    #[test]
    fn test_validate_rejects_zero_clusters() {
        let mut config = PipelineConfig::default();
        config.clustering.clusters = 0;
        assert!(matches!(config.validate(), Err(AnalysisError::ConfigError { .. })));
    }

    #[test]
    fn test_validate_rejects_bad_scale_factor() {
        let mut config = PipelineConfig::default();
        config.face_detection.scale_factor = 1.0;
        assert!(config.validate().is_err());
        config.face_detection.scale_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");

        let mut config = PipelineConfig::default();
        config.face_detection.selection = FaceSelection::Largest;
        config.face_detection.cascade_path = Some(PathBuf::from("models/haarcascade_frontalface_default.xml"));
        config.to_json_file(&path).unwrap();

        let loaded = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = PipelineConfig::from_json_file(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, AnalysisError::ConfigError { .. }));
    }
}
