//! OpenCV face locator
//!
//! Haar cascade face detection followed by LBF facemark fitting for the
//! 68-point landmark model. Both models are loaded once at construction and
//! reused for every image.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use image::RgbImage;
use opencv::{
    core::{Mat, Point2f, Ptr, Rect, Size, Vec3b, Vector, CV_8UC3},
    face::{FacemarkLBF, FacemarkLBF_Params},
    imgproc::{cvt_color, equalize_hist, COLOR_BGR2GRAY},
    objdetect::CascadeClassifier,
    prelude::*,
};
use tracing::{debug, info};

use crate::config::FaceDetectionConfig;
use crate::constants::landmarks;
use crate::detection::{FaceBounds, FaceLocator, FaceRegion, Point};
use crate::{AnalysisError, Result};

struct Models {
    cascade: CascadeClassifier,
    facemark: Ptr<FacemarkLBF>,
}

/// Haar cascade + LBF facemark locator
///
/// OpenCV detectors keep scratch state, so calls are serialized through a
/// mutex. Share one instance behind an `Arc`.
pub struct CascadeLandmarkLocator {
    models: Mutex<Models>,
    scale_factor: f64,
    min_neighbors: i32,
    min_face_size: i32,
}

impl CascadeLandmarkLocator {
    /// Load both models from disk
    pub fn new(cascade_path: &Path, landmark_model_path: &Path, config: &FaceDetectionConfig) -> Result<Self> {
        let cascade_file = path_str(cascade_path)?;
        let model_file = path_str(landmark_model_path)?;

        let cascade = CascadeClassifier::new(cascade_file)
            .map_err(|e| AnalysisError::opencv("load face cascade", e))?;
        if cascade.empty().map_err(|e| AnalysisError::opencv("inspect face cascade", e))? {
            return Err(AnalysisError::config(
                format!("Face cascade {} is empty", cascade_path.display()),
                std::io::Error::from(std::io::ErrorKind::InvalidData),
            ));
        }

        let params = FacemarkLBF_Params::default()
            .map_err(|e| AnalysisError::opencv("create facemark parameters", e))?;
        let mut facemark = FacemarkLBF::create(&params)
            .map_err(|e| AnalysisError::opencv("create facemark", e))?;
        facemark
            .load_model(model_file)
            .map_err(|e| AnalysisError::opencv("load facemark model", e))?;

        info!(
            cascade = %cascade_path.display(),
            landmark_model = %landmark_model_path.display(),
            "face models loaded"
        );

        Ok(Self {
            models: Mutex::new(Models { cascade, facemark }),
            scale_factor: config.scale_factor,
            min_neighbors: config.min_neighbors,
            min_face_size: i32::try_from(config.min_face_size).unwrap_or(i32::MAX),
        })
    }

    /// Load the models named in the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either model path is not set
    pub fn from_config(config: &FaceDetectionConfig) -> Result<Self> {
        let missing = |field: &str| AnalysisError::ConfigError {
            message: format!("face_detection.{} is required for the OpenCV locator", field),
            source: None,
        };
        let cascade = config.cascade_path.as_deref().ok_or_else(|| missing("cascade_path"))?;
        let model = config
            .landmark_model_path
            .as_deref()
            .ok_or_else(|| missing("landmark_model_path"))?;
        Self::new(cascade, model, config)
    }
}

impl FaceLocator for CascadeLandmarkLocator {
    fn detect(&self, image: &RgbImage) -> Result<Vec<FaceRegion>> {
        let bgr = rgb_image_to_bgr_mat(image)?;

        let mut gray = Mat::default();
        cvt_color(
            &bgr,
            &mut gray,
            COLOR_BGR2GRAY,
            0,
            opencv::core::AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| AnalysisError::opencv("convert to grayscale", e))?;
        let mut equalized = Mat::default();
        equalize_hist(&gray, &mut equalized)
            .map_err(|e| AnalysisError::opencv("equalize histogram", e))?;

        let mut models = lock_models(&self.models);

        let mut rects = Vector::<Rect>::new();
        models
            .cascade
            .detect_multi_scale(
                &equalized,
                &mut rects,
                self.scale_factor,
                self.min_neighbors,
                0,
                Size::new(self.min_face_size, self.min_face_size),
                Size::default(),
            )
            .map_err(|e| AnalysisError::opencv("detect faces", e))?;

        debug!(candidates = rects.len(), "cascade detection finished");
        if rects.is_empty() {
            return Ok(Vec::new());
        }

        let mut fitted = Vector::<Vector<Point2f>>::new();
        let ok = models
            .facemark
            .fit(&bgr, &rects, &mut fitted)
            .map_err(|e| AnalysisError::opencv("fit landmarks", e))?;
        if !ok {
            return Ok(Vec::new());
        }

        let mut faces = Vec::with_capacity(rects.len());
        for (rect, shape) in rects.iter().zip(fitted.iter()) {
            if shape.len() != landmarks::POINT_COUNT {
                return Err(AnalysisError::invalid_input(format!(
                    "landmark model produced {} points, expected {}",
                    shape.len(),
                    landmarks::POINT_COUNT
                )));
            }
            faces.push(FaceRegion {
                bounds: FaceBounds::new(rect.x, rect.y, rect.width, rect.height),
                landmarks: shape
                    .iter()
                    .map(|p| Point::new(p.x.round() as i32, p.y.round() as i32))
                    .collect(),
            });
        }
        Ok(faces)
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| AnalysisError::invalid_input(format!("non UTF-8 path: {}", path.display())))
}

/// Copy an RGB image into a BGR OpenCV matrix
fn rgb_image_to_bgr_mat(image: &RgbImage) -> Result<Mat> {
    let width = i32::try_from(image.width())
        .map_err(|_| AnalysisError::invalid_input("image too wide"))?;
    let height = i32::try_from(image.height())
        .map_err(|_| AnalysisError::invalid_input("image too tall"))?;

    let mut mat = Mat::zeros(height, width, CV_8UC3)
        .map_err(|e| AnalysisError::opencv("allocate image matrix", e))?
        .to_mat()
        .map_err(|e| AnalysisError::opencv("allocate image matrix", e))?;

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let dst = mat
            .at_2d_mut::<Vec3b>(y as i32, x as i32)
            .map_err(|e| AnalysisError::opencv("write pixel", e))?;
        dst[0] = b;
        dst[1] = g;
        dst[2] = r;
    }

    Ok(mat)
}

/// Lock the detector models, recovering from a panic in another caller
///
/// Detection never leaves the models half-updated, so a poisoned lock is
/// still safe to use.
fn lock_models<T>(models: &Mutex<T>) -> MutexGuard<'_, T> {
    models.lock().unwrap_or_else(PoisonError::into_inner)
}
