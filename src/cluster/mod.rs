//! K-means clustering of colour point clouds.
//!
//! Each attempt seeds `k` centroids, refines them with Lloyd iterations and
//! scores the outcome by compactness (sum of squared distances from each
//! point to its centroid). The engine keeps the most compact attempt. This is
//! a local-optimum heuristic: nothing guarantees the global minimum.

mod config;
pub mod lloyd;
mod seeding;


use palette::Srgb;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

pub use config::{KMeansConfig, Seeding};

use crate::error::{QuantizeError, Result};
use crate::samples::{Point, PointSet, narrow_channel};

pub const MIN_CLUSTERS: usize = 2;
pub const MAX_CLUSTERS: usize = 256;

/// Best attempt of one clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    /// Exactly `k` centroids, indexed `0..k`.
    pub centroids: Vec<Point>,
    /// One centroid index per input point, in input order.
    pub assignments: Vec<usize>,
    pub compactness: f64,
    /// Lloyd rounds run by the winning attempt.
    pub iterations: usize,
    /// Index of the winning attempt.
    pub attempt: usize,
    /// ChaCha seed of the winning attempt; replays it exactly.
    pub seed: u64,
    /// Compactness after each update step of the winning attempt.
    pub history: Vec<f64>,
}

impl ClusterResult {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Centroids narrowed to 8-bit sRGB, in centroid order.
    pub fn palette(&self) -> Vec<Srgb<u8>> {
        self.centroids
            .iter()
            .map(|c| Srgb::new(narrow_channel(c[0]), narrow_channel(c[1]), narrow_channel(c[2])))
            .collect()
    }

    pub fn hex_palette(&self) -> Vec<String> {
        self.palette()
            .iter()
            .map(|c| format!("{:02X}{:02X}{:02X}", c.red, c.green, c.blue))
            .collect()
    }
}

/// Stateless apart from its configuration; every call owns its working data.
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    config: KMeansConfig,
}

impl ClusterEngine {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Partition `points` into `k` clusters.
    ///
    /// `rng` only supplies one seed per attempt, drawn in attempt order, so a
    /// seeded `rng` gives identical results with or without parallel attempts.
    pub fn cluster<R: Rng + ?Sized>(
        &self,
        points: &PointSet,
        k: usize,
        rng: &mut R,
    ) -> Result<ClusterResult> {
        self.config.validate()?;
        validate_input(points, k)?;

        let seeds: Vec<u64> = (0..self.config.attempts).map(|_| rng.random()).collect();
        let outcomes = self.run_attempts(points.as_slice(), k, &seeds);

        let mut best: Option<(usize, lloyd::Refined)> = None;
        for (attempt, refined) in outcomes.into_iter().enumerate() {
            debug!(
                attempt,
                iterations = refined.iterations,
                compactness = refined.compactness,
                "attempt finished"
            );
            let better = match &best {
                Some((_, current)) => refined.compactness < current.compactness,
                None => true,
            };
            if better {
                best = Some((attempt, refined));
            }
        }

        let (attempt, refined) =
            best.ok_or_else(|| QuantizeError::invalid("no clustering attempt was run"))?;
        debug!(attempt, compactness = refined.compactness, "best attempt selected");

        Ok(ClusterResult {
            centroids: refined.centroids,
            assignments: refined.assignments,
            compactness: refined.compactness,
            iterations: refined.iterations,
            attempt,
            seed: seeds[attempt],
            history: refined.history,
        })
    }

    fn run_attempts(&self, points: &[Point], k: usize, seeds: &[u64]) -> Vec<lloyd::Refined> {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel && seeds.len() > 1 {
                return seeds
                    .par_iter()
                    .map(|&seed| self.attempt(points, k, seed))
                    .collect();
            }
        }

        seeds
            .iter()
            .map(|&seed| self.attempt(points, k, seed))
            .collect()
    }

    fn attempt(&self, points: &[Point], k: usize, seed: u64) -> lloyd::Refined {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let initial = seeding::seed_centroids(points, k, self.config.seeding, &mut rng);
        lloyd::refine(points, initial, &self.config)
    }
}

/// Cluster `points` into `k` groups with `config`, drawing attempt seeds from `rng`.
pub fn cluster<R: Rng + ?Sized>(
    points: &PointSet,
    k: usize,
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<ClusterResult> {
    ClusterEngine::new(config.clone()).cluster(points, k, rng)
}

fn validate_input(points: &PointSet, k: usize) -> Result<()> {
    if !(MIN_CLUSTERS..=MAX_CLUSTERS).contains(&k) {
        return Err(QuantizeError::invalid(format!(
            "k must be in [{MIN_CLUSTERS}, {MAX_CLUSTERS}], got {k}"
        )));
    }
    if points.is_empty() {
        return Err(QuantizeError::invalid("point set is empty"));
    }
    if points.len() < k {
        return Err(QuantizeError::invalid(format!(
            "need at least k = {k} points, got {}",
            points.len()
        )));
    }
    if let Some(i) = points.iter().position(|p| p.iter().any(|v| !v.is_finite())) {
        return Err(QuantizeError::invalid(format!("point {i} has a non-finite channel")));
    }
    Ok(())
}
