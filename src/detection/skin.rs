//! Skin region extraction from facial landmarks
//!
//! The sampled region is the convex hull of landmarks 17-67 (brows, eyes,
//! nose, mouth). It is a coarse stand-in for skin: eye and lip pixels
//! inside the hull are sampled too, and no color-based skin test is applied.

use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::geometry::{contour_area, convex_hull};
use imageproc::point::Point as PixelPoint;
use tracing::debug;

use crate::color::{ColorConverter, HsvColor};
use crate::config::SkinRegionConfig;
use crate::constants::{detection, landmarks};
use crate::detection::Point;
use crate::{AnalysisError, Result};

const INSIDE: Luma<u8> = Luma([255]);

/// 8-bit mask (255 inside, 0 outside) with the source image dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkinMask {
    image: GrayImage,
}

impl SkinMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.image.get_pixel(x, y).0[0] > 0
    }

    /// Number of masked pixels
    pub fn count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] > 0).count()
    }

    /// Masked pixel coordinates in row-major order
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0[0] > 0)
            .map(|(x, y, _)| (x, y))
    }

    pub fn as_gray_image(&self) -> &GrayImage {
        &self.image
    }

    /// Copy of the mask for debug output
    pub fn to_gray_image(&self) -> GrayImage {
        self.image.clone()
    }
}

/// Sampled skin region of one face
#[derive(Debug, Clone)]
pub struct SkinRegion {
    /// Hull vertices in traversal order
    pub hull: Vec<Point>,
    /// Hull area in pixels²
    pub hull_area: f64,
    pub mask: SkinMask,
    /// One HSV color per masked pixel
    pub samples: Vec<HsvColor>,
}

/// Skin region extractor over the 68-point landmark set
#[derive(Debug, Clone)]
pub struct SkinRegionExtractor {
    converter: ColorConverter,
    min_hull_area: f64,
}

impl Default for SkinRegionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinRegionExtractor {
    pub fn new() -> Self {
        Self::with_min_hull_area(detection::DEFAULT_MIN_HULL_AREA)
    }

    pub fn with_min_hull_area(min_hull_area: f64) -> Self {
        Self {
            converter: ColorConverter::new(),
            min_hull_area,
        }
    }

    pub fn from_config(config: &SkinRegionConfig) -> Self {
        Self::with_min_hull_area(config.min_hull_area)
    }

    /// Mask the landmark hull and collect HSV samples under it
    ///
    /// # Arguments
    ///
    /// * `image` - RGB source image
    /// * `points` - Full 68-point landmark set of one face
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if:
    /// - the landmark set does not have 68 points, or a point lies beyond
    ///   `MAX_COORDINATE` (`InvalidInput`)
    /// - the hull is degenerate or lies outside the image (`InsufficientData`)
    pub fn extract(&self, image: &RgbImage, points: &[Point]) -> Result<SkinRegion> {
        if points.len() != landmarks::POINT_COUNT {
            return Err(AnalysisError::invalid_input(format!(
                "expected {} landmarks, got {}",
                landmarks::POINT_COUNT,
                points.len()
            )));
        }
        if let Some(p) = points.iter().find(|p| {
            p.x.unsigned_abs() > landmarks::MAX_COORDINATE as u32
                || p.y.unsigned_abs() > landmarks::MAX_COORDINATE as u32
        }) {
            return Err(AnalysisError::invalid_input(format!(
                "landmark ({}, {}) lies beyond ±{} px",
                p.x,
                p.y,
                landmarks::MAX_COORDINATE
            )));
        }

        let hull = skin_hull(&points[landmarks::SKIN_FIRST..=landmarks::SKIN_LAST]);
        let hull_area = if hull.len() < 3 { 0.0 } else { contour_area(&hull).abs() };
        if hull.len() < 3 || hull_area < self.min_hull_area {
            return Err(AnalysisError::insufficient_data(format!(
                "skin hull area {:.1} px² below minimum {:.1} px²",
                hull_area, self.min_hull_area
            )));
        }

        let mask = fill_hull(&hull, image.width(), image.height());
        let samples: Vec<HsvColor> = mask
            .positions()
            .map(|(x, y)| {
                let [r, g, b] = image.get_pixel(x, y).0;
                self.converter.rgb_to_hsv(r, g, b)
            })
            .collect();

        if samples.is_empty() {
            return Err(AnalysisError::insufficient_data(
                "skin hull does not overlap the image",
            ));
        }

        debug!(
            hull_vertices = hull.len(),
            hull_area,
            samples = samples.len(),
            "extracted skin region"
        );

        Ok(SkinRegion {
            hull: hull.iter().map(|p| Point::new(p.x, p.y)).collect(),
            hull_area,
            mask,
            samples,
        })
    }
}

/// Convex hull of the distinct landmark positions
///
/// Fewer than three distinct points are returned as-is.
fn skin_hull(points: &[Point]) -> Vec<PixelPoint<i32>> {
    let mut distinct: Vec<PixelPoint<i32>> = points.iter().map(|p| PixelPoint::new(p.x, p.y)).collect();
    distinct.sort_by_key(|p| (p.x, p.y));
    distinct.dedup();
    if distinct.len() < 3 {
        return distinct;
    }
    convex_hull(distinct.as_slice())
}

/// Fill a convex hull into a mask, boundary pixels included
fn fill_hull(hull: &[PixelPoint<i32>], width: u32, height: u32) -> SkinMask {
    let mut mask = SkinMask::new(width, height);
    if width == 0 || height == 0 || hull.len() < 3 {
        return mask;
    }
    draw_polygon_mut(&mut mask.image, hull, INSIDE);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Landmarks whose skin subset spans the rectangle (x0, y0)-(x1, y1)
    fn rectangle_landmarks(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
        let center = Point::new((x0 + x1) / 2, (y0 + y1) / 2);
        let mut points = vec![center; landmarks::POINT_COUNT];
        points[17] = Point::new(x0, y0);
        points[26] = Point::new(x1, y0);
        points[48] = Point::new(x0, y1);
        points[54] = Point::new(x1, y1);
        points
    }

    fn pixel_points(points: &[(i32, i32)]) -> Vec<PixelPoint<i32>> {
        points.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect()
    }

    #[test]
    fn test_extract_rejects_wrong_landmark_count() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::new(10, 10);
        let err = extractor.extract(&image, &[Point::new(1, 1); 5]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[test]
    fn test_extract_uniform_rectangle() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::from_pixel(20, 20, Rgb([224, 172, 138]));
        let region = extractor.extract(&image, &rectangle_landmarks(2, 3, 5, 7)).unwrap();

        // Boundary inclusive: 4 columns x 5 rows
        assert_eq!(region.mask.count(), 20);
        assert_eq!(region.samples.len(), 20);
        assert_eq!(region.hull.len(), 4);
        assert_eq!(region.hull_area, 12.0);

        let expected = ColorConverter::new().rgb_to_hsv(224, 172, 138);
        assert!(region.samples.iter().all(|&s| s == expected));
    }

    #[test]
    fn test_extract_ignores_jaw_points() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::new(40, 40);
        let mut points = rectangle_landmarks(10, 10, 20, 20);
        for (i, point) in points.iter_mut().take(landmarks::SKIN_FIRST).enumerate() {
            *point = Point::new(i as i32 * 2, 39);
        }
        let region = extractor.extract(&image, &points).unwrap();
        assert!(!region.mask.contains(0, 39));
        assert!(!region.mask.contains(10, 30));
        assert!(region.mask.contains(15, 15));
    }

    #[test]
    fn test_extract_collapsed_landmarks() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::new(10, 10);
        let points = vec![Point::new(4, 4); landmarks::POINT_COUNT];
        let err = extractor.extract(&image, &points).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn test_extract_collinear_landmarks() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::new(60, 10);
        let points: Vec<Point> = (0..landmarks::POINT_COUNT as i32).map(|i| Point::new(i % 60, 5)).collect();
        let err = extractor.extract(&image, &points).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn test_extract_hull_outside_image() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::new(10, 10);
        let err = extractor.extract(&image, &rectangle_landmarks(100, 100, 120, 120)).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn test_extract_clips_to_image() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::new(10, 10);
        let region = extractor.extract(&image, &rectangle_landmarks(-5, -5, 4, 4)).unwrap();
        assert_eq!(region.mask.count(), 25);
        assert_eq!(region.mask.width(), 10);
    }

    #[test]
    fn test_extract_rejects_extreme_coordinates() {
        let extractor = SkinRegionExtractor::new();
        let image = RgbImage::new(10, 10);
        let mut points = rectangle_landmarks(0, 0, 5, 5);
        points[17] = Point::new(i32::MIN, i32::MIN);
        points[26] = Point::new(i32::MAX, i32::MIN);
        points[48] = Point::new(i32::MIN, i32::MAX);
        points[54] = Point::new(i32::MAX, i32::MAX);
        let err = extractor.extract(&image, &points).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));

        // Far outside the image but within range
        points[17] = Point::new(-5000, -5000);
        points[26] = Point::new(5000, -5000);
        points[48] = Point::new(-5000, 5000);
        points[54] = Point::new(5000, 5000);
        let region = extractor.extract(&image, &points).unwrap();
        assert_eq!(region.mask.count(), 100);
    }

    #[test]
    fn test_skin_hull_drops_interior_points() {
        let points: Vec<Point> = [(0, 0), (4, 0), (4, 4), (0, 4), (2, 2), (1, 3), (4, 4)]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect();
        let hull = skin_hull(&points);
        assert!(!hull.contains(&PixelPoint::new(2, 2)));
        assert!(!hull.contains(&PixelPoint::new(1, 3)));
        assert_eq!(contour_area(&hull).abs(), 16.0);
    }

    #[test]
    fn test_triangle_fill_includes_edges() {
        let mask = fill_hull(&pixel_points(&[(0, 0), (4, 0), (0, 4)]), 8, 8);
        // 5 + 4 + 3 + 2 + 1 lattice points on or inside the triangle
        assert_eq!(mask.count(), 15);
        assert!(mask.contains(2, 2));
        assert!(!mask.contains(3, 2));
    }

    #[test]
    fn test_mask_to_gray_image() {
        let mask = fill_hull(&pixel_points(&[(0, 0), (1, 0), (1, 1), (0, 1)]), 3, 3);
        let gray = mask.to_gray_image();
        assert_eq!(gray.get_pixel(0, 0).0, [255]);
        assert_eq!(gray.get_pixel(2, 2).0, [0]);
        assert_eq!(mask.positions().count(), 4);
    }
}
