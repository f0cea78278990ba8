use image::{DynamicImage, RgbImage};
use rand::Rng;
use tracing::info;

use crate::cluster::{ClusterEngine, ClusterResult, KMeansConfig};
use crate::error::Result;
use crate::reconstruct::materialize;
use crate::samples::{to_image, to_samples};
use crate::timing::PhaseTimer;

/// A quantized image together with the clustering that produced it.
#[derive(Debug, Clone)]
pub struct Quantized {
    pub image: RgbImage,
    pub result: ClusterResult,
}

/// Reduce `image` to `k` colours.
///
/// Marks the `prep`, `kmeans` and `reconstruct` phases on `timer`.
pub fn quantize_image<R, T>(
    image: &DynamicImage,
    k: usize,
    config: &KMeansConfig,
    rng: &mut R,
    timer: &mut T,
) -> Result<Quantized>
where
    R: Rng + ?Sized,
    T: PhaseTimer + ?Sized,
{
    let (width, height) = (image.width(), image.height());

    let samples = to_samples(image)?;
    info!(width, height, samples = samples.len(), "prepared samples");
    timer.mark("prep");

    let result = ClusterEngine::new(config.clone()).cluster(&samples, k, rng)?;
    info!(
        k,
        compactness = result.compactness,
        iterations = result.iterations,
        attempt = result.attempt,
        "kmeans done"
    );
    timer.mark("kmeans");

    let quantized = materialize(&samples, &result)?;
    drop(samples);
    let image = to_image(&quantized, height, width)?;
    timer.mark("reconstruct");

    Ok(Quantized { image, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuantizeError;
    use crate::timing::Stopwatch;
    use image::{ImageBuffer, Rgb};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn marks_core_phases() {
        let img: RgbImage = ImageBuffer::from_fn(4, 4, |x, y| Rgb([(x * 60) as u8, (y * 60) as u8, 0]));
        let mut sw = Stopwatch::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        quantize_image(
            &DynamicImage::ImageRgb8(img),
            4,
            &KMeansConfig::default(),
            &mut rng,
            &mut sw,
        )
        .unwrap();

        let labels: Vec<&str> = sw.events().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["prep", "kmeans", "reconstruct"]);
    }

    #[test]
    fn failure_leaves_no_marks_past_the_failing_phase() {
        let img: RgbImage = ImageBuffer::from_pixel(1, 1, Rgb([1, 2, 3]));
        let mut sw = Stopwatch::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let err = quantize_image(
            &DynamicImage::ImageRgb8(img),
            2,
            &KMeansConfig::default(),
            &mut rng,
            &mut sw,
        )
        .unwrap_err();

        assert!(matches!(err, QuantizeError::InvalidInput(_)));
        assert_eq!(sw.events().len(), 1);
    }
}
