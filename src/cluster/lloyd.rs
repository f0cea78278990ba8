//! Lloyd iteration: assign every point to its nearest centroid, move each
//! centroid to the mean of its points, repeat until the centroids settle.
//!
//! The result is a local optimum of the compactness objective. Different
//! starting centroids can settle into different partitions, which is why the
//! engine runs several attempts.

use tracing::trace;

use super::config::KMeansConfig;
use crate::samples::{CHANNELS, Point};

/// Outcome of refining one set of starting centroids.
#[derive(Debug, Clone)]
pub struct Refined {
    pub centroids: Vec<Point>,
    pub assignments: Vec<usize>,
    pub compactness: f64,
    /// Assign/update rounds executed.
    pub iterations: usize,
    /// Compactness after each update step, in round order.
    pub history: Vec<f64>,
}

#[inline]
pub(crate) fn squared_distance(a: &Point, b: &Point) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as f64 - y as f64;
            d * d
        })
        .sum()
}

/// Index of the closest centroid and its squared distance. Ties go to the
/// lowest index.
#[inline]
pub(crate) fn nearest(point: &Point, centroids: &[Point]) -> (usize, f64) {
    let mut best = 0usize;
    let mut best_dist = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = squared_distance(point, centroid);
        if dist < best_dist {
            best_dist = dist;
            best = idx;
        }
    }
    (best, best_dist)
}

pub(crate) fn assign(points: &[Point], centroids: &[Point], assignments: &mut [usize]) {
    for (slot, point) in assignments.iter_mut().zip(points) {
        *slot = nearest(point, centroids).0;
    }
}

/// Mean of the points assigned to each centroid. A centroid with no points
/// keeps its previous position.
pub(crate) fn update(points: &[Point], assignments: &[usize], previous: &[Point]) -> Vec<Point> {
    let k = previous.len();
    let mut sums = vec![[0f64; CHANNELS]; k];
    let mut counts = vec![0usize; k];

    for (point, &label) in points.iter().zip(assignments) {
        for (acc, &v) in sums[label].iter_mut().zip(point) {
            *acc += v as f64;
        }
        counts[label] += 1;
    }

    sums.iter()
        .zip(&counts)
        .zip(previous)
        .map(|((sum, &count), prev)| {
            if count == 0 {
                *prev
            } else {
                let n = count as f64;
                [
                    (sum[0] / n) as f32,
                    (sum[1] / n) as f32,
                    (sum[2] / n) as f32,
                ]
            }
        })
        .collect()
}

/// Sum of squared centroid displacements between two rounds.
pub(crate) fn movement(old: &[Point], new: &[Point]) -> f64 {
    old.iter().zip(new).map(|(a, b)| squared_distance(a, b)).sum()
}

pub(crate) fn compactness(points: &[Point], centroids: &[Point], assignments: &[usize]) -> f64 {
    points
        .iter()
        .zip(assignments)
        .map(|(p, &label)| squared_distance(p, &centroids[label]))
        .sum()
}

/// Run Lloyd rounds from `initial` until the summed centroid movement falls
/// below `config.convergence_epsilon` or `config.max_iterations` is reached,
/// then reassign every point to its nearest final centroid.
pub fn refine(points: &[Point], initial: Vec<Point>, config: &KMeansConfig) -> Refined {
    let mut centroids = initial;
    let mut assignments = vec![0usize; points.len()];
    let mut history = Vec::with_capacity(config.max_iterations);
    let mut iterations = 0;

    for round in 0..config.max_iterations {
        iterations = round + 1;

        assign(points, &centroids, &mut assignments);
        let updated = update(points, &assignments, &centroids);
        history.push(compactness(points, &updated, &assignments));

        let shift = movement(&centroids, &updated);
        centroids = updated;
        trace!(round, shift, "lloyd round");

        if shift < config.convergence_epsilon {
            break;
        }
    }

    assign(points, &centroids, &mut assignments);
    let compactness = compactness(points, &centroids, &assignments);

    Refined {
        centroids,
        assignments,
        compactness,
        iterations,
        history,
    }
}
