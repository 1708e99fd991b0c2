//! Face and skin region detection module
//!
//! This module handles locating a face with its 68 landmarks and isolating
//! the landmark-bounded skin region whose pixels feed color analysis.

pub mod face;
pub mod precomputed;
pub mod skin;
#[cfg(feature = "opencv")]
pub mod cascade;

pub use face::{FaceBounds, FaceLocator, FaceRegion, FaceSelection, Point};
pub use precomputed::PrecomputedLocator;
pub use skin::{SkinMask, SkinRegion, SkinRegionExtractor};
#[cfg(feature = "opencv")]
pub use cascade::CascadeLandmarkLocator;
