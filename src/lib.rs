//! Colour quantization by k-means clustering.
//!
//! An image is flattened into a cloud of RGB points ([`samples`]), the cloud
//! is partitioned into `k` clusters ([`cluster`]), every point is replaced by
//! its cluster's centroid ([`reconstruct`]) and the result is re-gridded into
//! an image with at most `k` colours.

use js_sys::{Array, Object, Reflect, Uint8Array};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

pub mod cluster;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod reconstruct;
pub mod samples;
pub mod timing;

pub use cluster::{
    ClusterEngine, ClusterResult, KMeansConfig, MAX_CLUSTERS, MIN_CLUSTERS, Seeding, cluster,
};
pub use error::{QuantizeError, Result};
pub use pipeline::{Quantized, quantize_image};
pub use reconstruct::materialize;
pub use samples::{Point, PointSet, to_image, to_samples};
pub use timing::{PhaseTimer, Stopwatch};

/// JPEG bytes and palette produced by [`quantize_bytes`].
#[derive(Debug, Clone)]
pub struct Compressed {
    pub jpeg: Vec<u8>,
    /// `RRGGBB` per centroid, in centroid order.
    pub palette: Vec<String>,
    pub compactness: f64,
    /// Seed the run used; pass it back to reproduce the output.
    pub seed: u64,
}

/// A fresh seed from the thread-local OS-seeded generator.
pub fn random_seed() -> u64 {
    rand::rng().random()
}

/// Decode `input`, reduce it to `k` colours and encode it as JPEG.
pub fn quantize_bytes(
    input: &[u8],
    k: usize,
    config: &KMeansConfig,
    quality: u8,
    seed: Option<u64>,
) -> Result<Compressed> {
    let seed = seed.unwrap_or_else(random_seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let image = io::decode_color_image(input)?;
    let Quantized { image, result } = quantize_image(&image, k, config, &mut rng, &mut ())?;
    let jpeg = io::encode_jpeg(&image, quality)?;

    Ok(Compressed {
        jpeg,
        palette: result.hex_palette(),
        compactness: result.compactness,
        seed,
    })
}

/// Reduce an encoded image to `k` colours.
///
/// Returns `{ image: Uint8Array, palette: string[], compactness: number, seed: bigint }`
/// where `image` is JPEG-encoded at `quality`.
#[wasm_bindgen]
pub fn quantize(
    input: Vec<u8>,
    k: usize,
    quality: u8,
    seed: Option<u64>,
) -> std::result::Result<Object, JsValue> {
    // No worker threads in the browser.
    let config = KMeansConfig::default().with_parallel(false);
    let out = quantize_bytes(&input, k, &config, quality, seed)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let palette_js = Array::new();
    for hex in &out.palette {
        palette_js.push(&JsValue::from_str(hex));
    }

    let result = Object::new();
    Reflect::set(&result, &JsValue::from_str("image"), &Uint8Array::from(out.jpeg.as_slice()))?;
    Reflect::set(&result, &JsValue::from_str("palette"), &palette_js)?;
    Reflect::set(&result, &JsValue::from_str("compactness"), &JsValue::from_f64(out.compactness))?;
    Reflect::set(&result, &JsValue::from_str("seed"), &JsValue::from(out.seed))?;

    Ok(result)
}
