//! Decode and encode at the filesystem boundary. Everything here reports
//! failures as [`QuantizeError::ResourceFailure`].

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};

use crate::error::{QuantizeError, Result};

pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Decode any format `image` understands and drop alpha, leaving 8-bit RGB.
pub fn decode_color_image(bytes: &[u8]) -> Result<DynamicImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

pub fn load_color_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| {
        QuantizeError::ResourceFailure(format!("failed to open {}: {e}", path.display()))
    })?;
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

/// Encode as baseline JPEG. `quality` is 0-100; the encoder's floor is 1, so 0
/// encodes like 1.
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    if quality > 100 {
        return Err(QuantizeError::invalid(format!(
            "jpeg quality must be in [0, 100], got {quality}"
        )));
    }
    let mut buf = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buf);
        let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality.max(1));
        encoder.encode_image(image)?;
    }
    Ok(buf)
}

pub fn ensure_directory<P: AsRef<Path>>(dir: P) -> Result<()> {
    fs::create_dir_all(&dir)?;
    Ok(())
}

/// `<out_dir>/<stem>_k<k>_q<quality>.jpg`
pub fn output_path<I, O>(input: I, out_dir: O, k: usize, quality: u8) -> PathBuf
where
    I: AsRef<Path>,
    O: AsRef<Path>,
{
    let stem = input
        .as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    out_dir.as_ref().join(format!("{stem}_k{k}_q{quality}.jpg"))
}

pub fn save_jpeg<P: AsRef<Path>>(path: P, image: &RgbImage, quality: u8) -> Result<()> {
    let bytes = encode_jpeg(image, quality)?;
    fs::write(&path, bytes)?;
    Ok(())
}
