//! Locator backed by landmarks computed elsewhere
//!
//! Reads the output of an external face/landmark detector from JSON:
//!
//! ```json
//! { "faces": [ { "bbox": [x, y, w, h], "landmarks": [[x, y], ...] } ] }
//! ```
//!
//! Coordinates may be fractional; they are rounded to whole pixels. Faces
//! keep the order of the document.

use std::path::Path;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::constants::landmarks;
use crate::detection::{FaceBounds, FaceLocator, FaceRegion, Point};
use crate::{AnalysisError, Result};

/// A serializable representation of a single face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub bbox: [f32; 4],
    pub landmarks: Vec<[f32; 2]>,
}

/// A serializable representation of all faces for one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkDocument {
    pub faces: Vec<FaceRecord>,
}

impl From<&FaceRegion> for FaceRecord {
    fn from(face: &FaceRegion) -> Self {
        Self {
            bbox: [
                face.bounds.x as f32,
                face.bounds.y as f32,
                face.bounds.width as f32,
                face.bounds.height as f32,
            ],
            landmarks: face
                .landmarks
                .iter()
                .map(|p| [p.x as f32, p.y as f32])
                .collect(),
        }
    }
}

impl TryFrom<&FaceRecord> for FaceRegion {
    type Error = AnalysisError;

    fn try_from(record: &FaceRecord) -> Result<Self> {
        if record.landmarks.len() != landmarks::POINT_COUNT {
            return Err(AnalysisError::invalid_input(format!(
                "face record has {} landmarks, expected {}",
                record.landmarks.len(),
                landmarks::POINT_COUNT
            )));
        }
        if record.bbox.iter().chain(record.landmarks.iter().flatten()).any(|v| !v.is_finite()) {
            return Err(AnalysisError::invalid_input("face record contains non-finite coordinates"));
        }
        let limit = landmarks::MAX_COORDINATE as f32;
        if record.landmarks.iter().flatten().any(|v| v.abs() > limit) {
            return Err(AnalysisError::invalid_input(format!(
                "face record has landmarks beyond ±{} px",
                landmarks::MAX_COORDINATE
            )));
        }

        let [x, y, width, height] = record.bbox.map(|v| v.round() as i32);
        Ok(FaceRegion {
            bounds: FaceBounds::new(x, y, width, height),
            landmarks: record
                .landmarks
                .iter()
                .map(|[x, y]| Point::new(x.round() as i32, y.round() as i32))
                .collect(),
        })
    }
}

/// Face locator returning a fixed, pre-detected set of faces
#[derive(Debug, Clone, Default)]
pub struct PrecomputedLocator {
    faces: Vec<FaceRegion>,
}

impl PrecomputedLocator {
    pub fn new(faces: Vec<FaceRegion>) -> Self {
        Self { faces }
    }

    /// Parse and validate a landmark document
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the JSON is malformed or any face does not
    /// carry exactly 68 landmarks
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: LandmarkDocument = serde_json::from_str(json)
            .map_err(|e| AnalysisError::invalid_input(format!("malformed landmark document: {}", e)))?;
        let faces = document
            .faces
            .iter()
            .map(FaceRegion::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { faces })
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::invalid_input(format!("cannot read landmarks {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    pub fn faces(&self) -> &[FaceRegion] {
        &self.faces
    }
}

impl FaceLocator for PrecomputedLocator {
    fn detect(&self, _image: &RgbImage) -> Result<Vec<FaceRegion>> {
        Ok(self.faces.clone())
    }
}

/// Serialize detected faces into a landmark document
pub fn faces_to_json(faces: &[FaceRegion]) -> Result<String> {
    let document = LandmarkDocument {
        faces: faces.iter().map(FaceRecord::from).collect(),
    };
    serde_json::to_string_pretty(&document)
        .map_err(|e| AnalysisError::invalid_input(format!("cannot serialize faces: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::FaceSelection;

    fn record(offset: f32) -> FaceRecord {
        FaceRecord {
            bbox: [offset, 0.0, 50.0, 60.0],
            landmarks: (0..landmarks::POINT_COUNT)
                .map(|i| [offset + i as f32 * 0.5, 10.4])
                .collect(),
        }
    }

    #[test]
    fn test_from_json_str() {
        let json = serde_json::to_string(&LandmarkDocument {
            faces: vec![record(0.0), record(100.0)],
        })
        .unwrap();
        let locator = PrecomputedLocator::from_json_str(&json).unwrap();
        assert_eq!(locator.faces().len(), 2);

        let first = &locator.faces()[0];
        assert_eq!(first.bounds, FaceBounds::new(0, 0, 50, 60));
        assert_eq!(first.landmarks[3], Point::new(2, 10));
    }

    #[test]
    fn test_rejects_short_landmark_list() {
        let mut bad = record(0.0);
        bad.landmarks.truncate(5);
        let json = serde_json::to_string(&LandmarkDocument { faces: vec![bad] }).unwrap();
        let err = PrecomputedLocator::from_json_str(&json).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_out_of_range_landmarks() {
        let mut bad = record(0.0);
        bad.landmarks[17] = [-3.0e9, -3.0e9];
        bad.landmarks[54] = [3.0e9, 3.0e9];
        let err = FaceRegion::try_from(&bad).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = PrecomputedLocator::from_json_str("{ faces: ").unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[test]
    fn test_locate_first_in_document_order() {
        let json = serde_json::to_string(&LandmarkDocument {
            faces: vec![record(100.0), record(0.0)],
        })
        .unwrap();
        let locator = PrecomputedLocator::from_json_str(&json).unwrap();
        let image = RgbImage::new(4, 4);
        let face = locator.locate(&image, FaceSelection::First).unwrap().unwrap();
        assert_eq!(face.bounds.x, 100);
    }

    #[test]
    fn test_faces_to_json_roundtrip() {
        let face = FaceRegion::try_from(&record(7.0)).unwrap();
        let json = faces_to_json(std::slice::from_ref(&face)).unwrap();
        let locator = PrecomputedLocator::from_json_str(&json).unwrap();
        assert_eq!(locator.faces(), &[face]);
    }

    #[test]
    fn test_empty_document_has_no_faces() {
        let locator = PrecomputedLocator::from_json_str(r#"{ "faces": [] }"#).unwrap();
        let image = RgbImage::new(4, 4);
        assert!(locator.locate(&image, FaceSelection::First).unwrap().is_none());
    }
}
