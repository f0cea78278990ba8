use crate::cluster::ClusterResult;
use crate::error::{QuantizeError, Result};
use crate::samples::PointSet;

/// Replace every point with a copy of its assigned centroid.
///
/// The returned set owns its data; `points` and `result` can be dropped
/// afterwards.
pub fn materialize(points: &PointSet, result: &ClusterResult) -> Result<PointSet> {
    if result.assignments.len() != points.len() {
        return Err(QuantizeError::invalid(format!(
            "{} assignments for {} points",
            result.assignments.len(),
            points.len()
        )));
    }

    let k = result.centroids.len();
    let quantized = result
        .assignments
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            result.centroids.get(label).copied().ok_or_else(|| {
                QuantizeError::invalid(format!(
                    "assignment {label} of point {i} is outside 0..{k}"
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(PointSet::new(quantized))
}
