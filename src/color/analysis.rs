//! Dominant color estimation over skin samples
//!
//! Partitions the masked skin pixels into `k` clusters in HSV space and
//! reports each centroid with its population:
//! - k-means++ seeding and Lloyd iterations via `kmeans_colors`
//! - Seeded RNG so a fixed image always yields the same centroids
//! - Centroids are returned in clustering order, not sorted by weight

use kmeans_colors::{get_kmeans, Calculate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::HsvColor;
use crate::config::ClusteringConfig;
use crate::constants::clustering;
use crate::{AnalysisError, Result};

/// Continuous HSV point used as the clustering element
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HsvSample {
    pub hue: f32,
    pub saturation: f32,
    pub value: f32,
}

impl HsvSample {
    pub fn new(hue: f32, saturation: f32, value: f32) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

impl From<HsvColor> for HsvSample {
    fn from(color: HsvColor) -> Self {
        Self::new(
            color.hue as f32,
            color.saturation as f32,
            color.value as f32,
        )
    }
}

impl Calculate for HsvSample {
    fn get_closest_centroid(buffer: &[Self], centroids: &[Self], indices: &mut Vec<u8>) {
        for sample in buffer {
            let mut index = 0;
            let mut min = f32::MAX;
            for (idx, centroid) in centroids.iter().enumerate() {
                let diff = Self::difference(sample, centroid);
                if diff < min {
                    min = diff;
                    index = idx;
                }
            }
            indices.push(index as u8);
        }
    }

    fn recalculate_centroids(
        rng: &mut impl Rng,
        buf: &[Self],
        centroids: &mut [Self],
        indices: &[u8],
    ) {
        for (idx, centroid) in centroids.iter_mut().enumerate() {
            let mut hue = 0.0;
            let mut saturation = 0.0;
            let mut value = 0.0;
            let mut count: u64 = 0;
            for (&cluster, sample) in indices.iter().zip(buf) {
                if cluster as usize == idx {
                    hue += sample.hue;
                    saturation += sample.saturation;
                    value += sample.value;
                    count += 1;
                }
            }

            if count != 0 {
                let n = count as f32;
                *centroid = HsvSample::new(hue / n, saturation / n, value / n);
            } else if !buf.is_empty() {
                // Empty cluster: restart it on a random observed sample
                *centroid = buf[rng.gen_range(0..buf.len())];
            } else {
                *centroid = Self::create_random(rng);
            }
        }
    }

    fn check_loop(centroids: &[Self], old_centroids: &[Self]) -> f32 {
        centroids
            .iter()
            .zip(old_centroids)
            .map(|(new, old)| Self::difference(new, old))
            .sum()
    }

    fn create_random(rng: &mut impl Rng) -> Self {
        HsvSample::new(
            rng.gen_range(0.0..180.0),
            rng.gen_range(0.0..=255.0),
            rng.gen_range(0.0..=255.0),
        )
    }

    fn difference(c1: &Self, c2: &Self) -> f32 {
        let dh = c1.hue - c2.hue;
        let ds = c1.saturation - c2.saturation;
        let dv = c1.value - c2.value;
        dh * dh + ds * ds + dv * dv
    }
}

/// One cluster centroid with its population
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeColor {
    /// Mean HSV of the cluster
    pub centroid: HsvSample,
    /// Number of samples assigned to the cluster
    pub weight: usize,
}

impl RepresentativeColor {
    /// Centroid truncated to integer channels
    pub fn color(&self) -> HsvColor {
        // `as u8` truncates toward zero and saturates at the channel bounds
        HsvColor::new(
            self.centroid.hue as u8,
            self.centroid.saturation as u8,
            self.centroid.value as u8,
        )
    }
}

/// Which centroid feeds the season classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentroidSelection {
    /// First centroid in clustering order
    #[default]
    First,
    /// Most populated cluster; ties resolve to the earliest
    Heaviest,
}

impl CentroidSelection {
    pub fn pick<'a>(&self, representatives: &'a [RepresentativeColor]) -> Option<&'a RepresentativeColor> {
        match self {
            CentroidSelection::First => representatives.first(),
            CentroidSelection::Heaviest => representatives
                .iter()
                .enumerate()
                .max_by(|(ia, a), (ib, b)| a.weight.cmp(&b.weight).then(ib.cmp(ia)))
                .map(|(_, rep)| rep),
        }
    }
}

/// Dominant color estimator backed by k-means clustering
#[derive(Debug, Clone)]
pub struct DominantColorEstimator {
    clusters: usize,
    max_iterations: usize,
    convergence: f32,
    seed: u64,
}

impl Default for DominantColorEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl DominantColorEstimator {
    /// Create an estimator with k=3 and default iteration limits
    pub fn new() -> Self {
        Self {
            clusters: clustering::DEFAULT_CLUSTERS,
            max_iterations: clustering::DEFAULT_MAX_ITERATIONS,
            convergence: clustering::DEFAULT_CONVERGENCE,
            seed: clustering::DEFAULT_SEED,
        }
    }

    /// Create an estimator with custom parameters
    pub fn with_params(clusters: usize, max_iterations: usize, convergence: f32, seed: u64) -> Self {
        Self {
            clusters,
            max_iterations,
            convergence,
            seed,
        }
    }

    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::with_params(
            config.clusters,
            config.max_iterations,
            config.convergence,
            config.seed,
        )
    }

    pub fn clusters(&self) -> usize {
        self.clusters
    }

    /// Cluster HSV samples and return the `k` centroids
    ///
    /// # Arguments
    ///
    /// * `samples` - HSV colors of the masked skin pixels
    ///
    /// # Returns
    ///
    /// Exactly `k` representatives in clustering order, each weighted by
    /// its cluster population
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError` if:
    /// - `k` is zero or exceeds 255 (`InvalidInput`)
    /// - the sample set is empty or smaller than `k` (`InsufficientData`)
    pub fn estimate(&self, samples: &[HsvColor]) -> Result<Vec<RepresentativeColor>> {
        if self.clusters == 0 || self.clusters > clustering::MAX_CLUSTERS {
            return Err(AnalysisError::invalid_input(format!(
                "cluster count must be in 1..={}, got {}",
                clustering::MAX_CLUSTERS,
                self.clusters
            )));
        }
        if samples.is_empty() {
            return Err(AnalysisError::insufficient_data("no skin samples to cluster"));
        }
        if samples.len() < self.clusters {
            return Err(AnalysisError::insufficient_data(format!(
                "{} skin samples cannot form {} clusters",
                samples.len(),
                self.clusters
            )));
        }

        let points: Vec<HsvSample> = samples.iter().copied().map(HsvSample::from).collect();
        let result = get_kmeans(
            self.clusters,
            self.max_iterations,
            self.convergence,
            false,
            &points,
            self.seed,
        );

        // k-means++ seeding stops early when there are fewer than `k`
        // distinct colors; repeat found centroids as empty clusters
        let mut centroids = result.centroids;
        let found = centroids.len();
        if found == 0 {
            return Err(AnalysisError::insufficient_data("clustering produced no centroids"));
        }
        for i in found..self.clusters {
            let repeated = centroids[(i - found) % found];
            centroids.push(repeated);
        }

        let mut weights = vec![0usize; centroids.len()];
        for &index in &result.indices {
            if let Some(weight) = weights.get_mut(index as usize) {
                *weight += 1;
            }
        }

        let representatives: Vec<RepresentativeColor> = centroids
            .into_iter()
            .zip(weights)
            .map(|(centroid, weight)| RepresentativeColor { centroid, weight })
            .collect();

        debug!(
            samples = samples.len(),
            score = result.score,
            ?representatives,
            "clustered skin samples"
        );

        Ok(representatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_groups() -> Vec<HsvColor> {
        let mut samples = Vec::new();
        samples.extend(std::iter::repeat(HsvColor::new(10, 60, 200)).take(500));
        samples.extend(std::iter::repeat(HsvColor::new(12, 64, 196)).take(100));
        samples.extend(std::iter::repeat(HsvColor::new(90, 200, 40)).take(300));
        samples.extend(std::iter::repeat(HsvColor::new(170, 20, 120)).take(200));
        samples
    }

    #[test]
    fn test_estimator_defaults() {
        let estimator = DominantColorEstimator::new();
        assert_eq!(estimator.clusters(), 3);
    }

    #[test]
    fn test_estimate_empty_samples() {
        let estimator = DominantColorEstimator::new();
        let err = estimator.estimate(&[]).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn test_estimate_fewer_samples_than_clusters() {
        let estimator = DominantColorEstimator::new();
        let samples = [HsvColor::new(10, 10, 10), HsvColor::new(20, 20, 20)];
        let err = estimator.estimate(&samples).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData { .. }));
    }

    #[test]
    fn test_estimate_zero_clusters() {
        let estimator = DominantColorEstimator::with_params(0, 10, 1e-4, 0);
        let err = estimator.estimate(&[HsvColor::new(1, 2, 3)]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput { .. }));
    }

    #[test]
    fn test_estimate_separates_groups() {
        let estimator = DominantColorEstimator::new();
        let samples = three_groups();
        let reps = estimator.estimate(&samples).unwrap();

        assert_eq!(reps.len(), 3);
        assert_eq!(reps.iter().map(|r| r.weight).sum::<usize>(), samples.len());

        let mut weights: Vec<usize> = reps.iter().map(|r| r.weight).collect();
        weights.sort_unstable();
        assert_eq!(weights, vec![200, 300, 600]);

        let skin = reps.iter().find(|r| r.weight == 600).unwrap();
        let skin_color = skin.color();
        assert!((10..=11).contains(&skin_color.hue));
        assert!((60..=61).contains(&skin_color.saturation));
        assert!((199..=200).contains(&skin_color.value));
    }

    #[test]
    fn test_estimate_uniform_samples_yields_k_centroids() {
        let estimator = DominantColorEstimator::new();
        let samples = vec![HsvColor::new(10, 100, 100); 50];
        let reps = estimator.estimate(&samples).unwrap();

        assert_eq!(reps.len(), 3);
        assert_eq!(reps[0].color(), HsvColor::new(10, 100, 100));
        assert_eq!(reps[0].weight, 50);
        assert!(reps.iter().all(|r| r.color() == HsvColor::new(10, 100, 100)));
        assert_eq!(reps.iter().map(|r| r.weight).sum::<usize>(), 50);
    }

    #[test]
    fn test_estimate_two_colors_yields_k_centroids() {
        let estimator = DominantColorEstimator::new();
        let mut samples = vec![HsvColor::new(10, 100, 100); 25];
        samples.extend(std::iter::repeat(HsvColor::new(120, 40, 220)).take(25));
        let reps = estimator.estimate(&samples).unwrap();

        assert_eq!(reps.len(), 3);
        assert_eq!(reps.iter().map(|r| r.weight).sum::<usize>(), 50);
        assert!(reps.iter().any(|r| r.color() == HsvColor::new(10, 100, 100) && r.weight == 25));
        assert!(reps.iter().any(|r| r.color() == HsvColor::new(120, 40, 220) && r.weight == 25));
    }

    #[test]
    fn test_estimate_is_deterministic_for_seed() {
        let estimator = DominantColorEstimator::with_params(3, 100, 1e-4, 7);
        let samples = three_groups();
        let first = estimator.estimate(&samples).unwrap();
        let second = estimator.estimate(&samples).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_color_truncates_centroid() {
        let rep = RepresentativeColor {
            centroid: HsvSample::new(14.9, 150.99, 180.5),
            weight: 1,
        };
        assert_eq!(rep.color(), HsvColor::new(14, 150, 180));
    }

    #[test]
    fn test_centroid_selection() {
        let reps = vec![
            RepresentativeColor { centroid: HsvSample::new(1.0, 1.0, 1.0), weight: 10 },
            RepresentativeColor { centroid: HsvSample::new(2.0, 2.0, 2.0), weight: 30 },
            RepresentativeColor { centroid: HsvSample::new(3.0, 3.0, 3.0), weight: 30 },
        ];
        assert_eq!(CentroidSelection::First.pick(&reps).unwrap().weight, 10);

        let heaviest = CentroidSelection::Heaviest.pick(&reps).unwrap();
        assert_eq!(heaviest.centroid, HsvSample::new(2.0, 2.0, 2.0));

        assert!(CentroidSelection::First.pick(&[]).is_none());
    }

    #[test]
    fn test_difference_is_squared_euclidean() {
        let a = HsvSample::new(0.0, 0.0, 0.0);
        let b = HsvSample::new(1.0, 2.0, 2.0);
        assert_eq!(HsvSample::difference(&a, &b), 9.0);
    }
}
