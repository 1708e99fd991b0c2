//! End-to-end season analysis
//!
//! Stage order: locate face → extract skin hull → cluster skin colors →
//! select a centroid → classify. Every intermediate is built per call and
//! dropped afterwards; the only shared state is the face locator.

use std::path::Path;
use std::sync::Arc;

use image::RgbImage;
use serde::Serialize;
use tracing::{debug, info};

use crate::color::{
    CentroidSelection, ColorConverter, DominantColorEstimator, HsvColor, RepresentativeColor,
};
use crate::config::PipelineConfig;
use crate::detection::{FaceBounds, FaceLocator, Point, SkinMask, SkinRegion, SkinRegionExtractor};
use crate::image_loader;
use crate::season::{classify, Season};
use crate::{AnalysisError, Result};

/// One cluster centroid ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterColor {
    pub color: HsvColor,
    pub hex: String,
    /// Skin pixels assigned to the cluster
    pub weight: usize,
}

/// Result of analyzing one portrait
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonAnalysis {
    pub season: Season,
    /// Centroid the season was derived from
    pub selected: ClusterColor,
    /// All centroids in clustering order
    pub clusters: Vec<ClusterColor>,
    pub face: FaceBounds,
    pub hull_area: f64,
    pub skin_pixels: usize,
}

/// Skin stages of one classified face
#[derive(Debug, Clone)]
pub struct SkinClassification {
    pub region: SkinRegion,
    /// All centroids in clustering order
    pub representatives: Vec<RepresentativeColor>,
    pub selected: RepresentativeColor,
    pub season: Season,
}

/// Landmarks to season: extract the skin hull, cluster it, select a
/// centroid and classify it
#[derive(Debug, Clone)]
pub struct SkinClassifier {
    extractor: SkinRegionExtractor,
    estimator: DominantColorEstimator,
    selection: CentroidSelection,
}

impl SkinClassifier {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            extractor: SkinRegionExtractor::from_config(&config.skin_region),
            estimator: DominantColorEstimator::from_config(&config.clustering),
            selection: config.clustering.selection,
        }
    }

    /// Classify the face described by `landmarks`
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if:
    /// - the landmark set is malformed (`InvalidInput`)
    /// - the skin hull is degenerate or too small to cluster (`InsufficientData`)
    pub fn classify(&self, image: &RgbImage, landmarks: &[Point]) -> Result<SkinClassification> {
        let region = self.extractor.extract(image, landmarks)?;
        let representatives = self.estimator.estimate(&region.samples)?;
        let selected = *self
            .selection
            .pick(&representatives)
            .ok_or_else(|| AnalysisError::insufficient_data("clustering produced no centroids"))?;
        let season = classify(selected.color());

        Ok(SkinClassification {
            region,
            representatives,
            selected,
            season,
        })
    }
}

/// Portrait to season pipeline
///
/// Cheap to clone; clones share the face locator.
#[derive(Clone)]
pub struct SeasonAnalyzer {
    locator: Arc<dyn FaceLocator>,
    config: PipelineConfig,
    classifier: SkinClassifier,
    converter: ColorConverter,
}

impl SeasonAnalyzer {
    /// Create an analyzer around a loaded face locator
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the configuration fails validation
    pub fn new(locator: Arc<dyn FaceLocator>, config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            classifier: SkinClassifier::from_config(&config),
            converter: ColorConverter::new(),
            locator,
            config,
        })
    }

    pub fn with_defaults(locator: Arc<dyn FaceLocator>) -> Result<Self> {
        Self::new(locator, PipelineConfig::default())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn analyze_image(&self, image: &RgbImage) -> Result<SeasonAnalysis> {
        self.analyze_with_mask(image).map(|(analysis, _)| analysis)
    }

    /// Decode uploaded bytes and analyze them
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<SeasonAnalysis> {
        let image = image_loader::decode_image(bytes)?;
        self.analyze_image(&image)
    }

    pub fn analyze_path(&self, path: &Path) -> Result<SeasonAnalysis> {
        let image = image_loader::load_image(path)?;
        self.analyze_image(&image)
    }

    /// Analyze an image and also return the skin mask that was sampled
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if:
    /// - the locator finds no face (`NoFaceDetected`)
    /// - the face carries a malformed landmark set (`InvalidInput`)
    /// - the skin hull is degenerate or too small to cluster (`InsufficientData`)
    pub fn analyze_with_mask(&self, image: &RgbImage) -> Result<(SeasonAnalysis, SkinMask)> {
        debug!(width = image.width(), height = image.height(), "analyzing image");

        let face = self
            .locator
            .locate(image, self.config.face_detection.selection)?
            .ok_or(AnalysisError::NoFaceDetected)?;

        let SkinClassification {
            region,
            representatives,
            selected,
            season,
        } = self.classifier.classify(image, &face.landmarks)?;
        let selected = self.cluster_color(&selected);

        info!(
            %season,
            hue = selected.color.hue,
            saturation = selected.color.saturation,
            value = selected.color.value,
            skin_pixels = region.samples.len(),
            "season analysis complete"
        );

        let analysis = SeasonAnalysis {
            season,
            selected,
            clusters: representatives.iter().map(|r| self.cluster_color(r)).collect(),
            face: face.bounds,
            hull_area: region.hull_area,
            skin_pixels: region.samples.len(),
        };
        Ok((analysis, region.mask))
    }

    fn cluster_color(&self, representative: &RepresentativeColor) -> ClusterColor {
        let color = representative.color();
        ClusterColor {
            color,
            hex: self.converter.hsv_to_hex(color),
            weight: representative.weight,
        }
    }
}
