use rand::Rng;

use super::config::Seeding;
use super::lloyd::squared_distance;
use crate::samples::Point;

/// Pick `k` initial centroids from `points`. Callers guarantee `points.len() >= k`.
pub(crate) fn seed_centroids<R: Rng + ?Sized>(
    points: &[Point],
    k: usize,
    seeding: Seeding,
    rng: &mut R,
) -> Vec<Point> {
    match seeding {
        Seeding::Spread => spread(points, k, rng),
        Seeding::Uniform => uniform(points, k, rng),
    }
}

fn uniform<R: Rng + ?Sized>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    rand::seq::index::sample(rng, points.len(), k)
        .iter()
        .map(|i| points[i])
        .collect()
}

fn spread<R: Rng + ?Sized>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k);

    let first = points[rng.random_range(0..points.len())];
    centroids.push(first);

    // Squared distance from every point to its nearest chosen centroid.
    let mut nearest: Vec<f64> = points.iter().map(|p| squared_distance(p, &first)).collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().sum();
        let idx = if total > 0.0 {
            pick_weighted(&nearest, rng.random::<f64>() * total)
        } else {
            // Every point already sits on a centroid; fewer distinct colours than k.
            rng.random_range(0..points.len())
        };

        let chosen = points[idx];
        centroids.push(chosen);

        for (d, p) in nearest.iter_mut().zip(points) {
            let candidate = squared_distance(p, &chosen);
            if candidate < *d {
                *d = candidate;
            }
        }
    }

    centroids
}

/// Index whose cumulative weight first exceeds `target`. Zero-weight entries
/// are never returned while any positive weight exists.
fn pick_weighted(weights: &[f64], target: f64) -> usize {
    let mut acc = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        acc += w;
        last_positive = i;
        if acc > target {
            return i;
        }
    }
    last_positive
}
