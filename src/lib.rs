//! # Season Scan
//!
//! A Rust crate for estimating a person's personal color season from a
//! portrait photograph.
//!
//! The pipeline:
//! - Locates a face and its 68 landmarks
//! - Samples skin pixels inside the convex hull of landmarks 17-67
//! - Clusters the samples in 8-bit HSV with k-means (k = 3)
//! - Maps one centroid to a season with a fixed threshold table
//!
//! The season then indexes a styling knowledge base of palettes, makeup,
//! jewelry and occasion outfits.
//!
//! ## Example
//!
//! ```rust,no_run
//! use season_scan::detection::PrecomputedLocator;
//! use season_scan::{KnowledgeBase, SeasonAnalyzer};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let locator = PrecomputedLocator::from_json_file(Path::new("portrait.landmarks.json"))?;
//! let analyzer = SeasonAnalyzer::with_defaults(Arc::new(locator))?;
//!
//! let analysis = analyzer.analyze_path(Path::new("portrait.jpg"))?;
//! let profile = KnowledgeBase::builtin()?.profile(analysis.season)?;
//! println!("{}: {}", analysis.season, profile.description);
//! # Ok::<(), season_scan::AnalysisError>(())
//! ```

use image::RgbImage;

pub mod error;
pub mod constants;
pub mod config;
pub mod image_loader;
pub mod detection;
pub mod color;
pub mod season;
pub mod pipeline;

pub use color::HsvColor;
pub use config::PipelineConfig;
pub use detection::{FaceLocator, Point};
pub use error::{AnalysisError, Result};
pub use pipeline::{SeasonAnalysis, SeasonAnalyzer};
pub use season::{classify, KnowledgeBase, Presentation, Season};

/// Classify a portrait whose landmarks are already known
///
/// Runs skin extraction, clustering and classification with the default
/// configuration.
///
/// # Arguments
///
/// * `image` - RGB portrait
/// * `landmarks` - The face's 68 landmark points
///
/// # Errors
///
/// Returns `AnalysisError` if:
/// - the landmark set does not have 68 points
/// - the skin hull is degenerate or has fewer pixels than clusters
pub fn classify_portrait(image: &RgbImage, landmarks: &[Point]) -> Result<Season> {
    pipeline::SkinClassifier::from_config(&PipelineConfig::default())
        .classify(image, landmarks)
        .map(|classification| classification.season)
}
