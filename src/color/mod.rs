//! Color conversion and dominant color module
//!
//! This module handles RGB to 8-bit HSV conversion, hex formatting, and
//! k-means estimation of representative skin colors.

pub mod conversion;
pub mod analysis;

pub use conversion::{ColorConverter, HsvColor};
pub use analysis::{CentroidSelection, DominantColorEstimator, HsvSample, RepresentativeColor};
