//! Face localization contract
//!
//! A [`FaceLocator`] turns an RGB image into zero or more faces, each with a
//! bounding box and the 68-point landmark set. Detector backends are
//! pre-trained and loaded once; the pipeline only ever sees this trait.
//!
//! # Landmarks Layout (68-point model)
//!
//! - 0-16: Jaw outline
//! - 17-21: Right eyebrow
//! - 22-26: Left eyebrow
//! - 27-35: Nose
//! - 36-41: Right eye
//! - 42-47: Left eye
//! - 48-59: Outer lip
//! - 60-67: Inner lip

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;

/// Integer pixel coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned face bounding box in image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FaceBounds {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBounds {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }
}

/// One detected face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRegion {
    pub bounds: FaceBounds,
    /// Landmark points in model order
    pub landmarks: Vec<Point>,
}

/// Policy for choosing among several detected faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaceSelection {
    /// First face in the detector's return order
    #[default]
    First,
    /// Largest bounding box; ties resolve to the earliest
    Largest,
}

impl FaceSelection {
    pub fn select(&self, faces: Vec<FaceRegion>) -> Option<FaceRegion> {
        match self {
            FaceSelection::First => faces.into_iter().next(),
            FaceSelection::Largest => faces
                .into_iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| a.bounds.area().cmp(&b.bounds.area()).then(ib.cmp(ia)))
                .map(|(_, face)| face),
        }
    }
}

/// Face and landmark detector
///
/// Implementations hold a read-only model and must be safe to share across
/// threads; the pipeline keeps one instance for the life of the process.
pub trait FaceLocator: Send + Sync {
    /// All faces in the detector's native order
    fn detect(&self, image: &RgbImage) -> Result<Vec<FaceRegion>>;

    /// The face to analyze, or `None` when no face is found
    fn locate(&self, image: &RgbImage, selection: FaceSelection) -> Result<Option<FaceRegion>> {
        let faces = self.detect(image)?;
        debug!(faces = faces.len(), ?selection, "face detection finished");
        Ok(selection.select(faces))
    }
}
