//! Conversion between decoded images and flat colour point clouds.

use image::{DynamicImage, RgbImage};

use crate::error::{QuantizeError, Result};

/// Number of colour channels every point carries.
pub const CHANNELS: usize = 3;

/// One pixel's channels as floats, in the 0-255 range of the source image.
pub type Point = [f32; CHANNELS];

/// Pixels in row-major scan order. The position in the set is the only link
/// back to the pixel's location, so a `PointSet` is never reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Build a point set from loosely typed rows, rejecting any row that is not
    /// exactly three channels wide.
    pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self> {
        let mut points = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let point: Point = row.try_into().map_err(|_| {
                QuantizeError::invalid(format!(
                    "point {i} has {} channels, expected {CHANNELS}",
                    row.len()
                ))
            })?;
            points.push(point);
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn into_inner(self) -> Vec<Point> {
        self.points
    }
}

impl From<Vec<Point>> for PointSet {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Flatten an 8-bit RGB image into a point set of `width * height` points.
///
/// Channel values are copied as-is (no normalisation). Images with zero
/// dimensions, an alpha channel, or a bit depth other than 8 are rejected.
pub fn to_samples(image: &DynamicImage) -> Result<PointSet> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(QuantizeError::invalid(format!(
            "image dimensions must be positive, got {width}x{height}"
        )));
    }

    let channels = image.color().channel_count() as usize;
    if channels != CHANNELS {
        return Err(QuantizeError::invalid(format!(
            "expected a {CHANNELS}-channel image, got {channels} channels"
        )));
    }

    let Some(rgb) = image.as_rgb8() else {
        return Err(QuantizeError::invalid(format!(
            "expected 8-bit RGB samples, got {:?}",
            image.color()
        )));
    };

    let points = rgb
        .pixels()
        .map(|p| [p[0] as f32, p[1] as f32, p[2] as f32])
        .collect();
    Ok(PointSet::new(points))
}

/// Re-grid a point set into an RGB image of `rows` x `cols` pixels.
///
/// Each channel is narrowed with [`narrow_channel`].
pub fn to_image(points: &PointSet, rows: u32, cols: u32) -> Result<RgbImage> {
    if rows == 0 || cols == 0 {
        return Err(QuantizeError::invalid(format!(
            "rows and cols must be positive, got {rows}x{cols}"
        )));
    }
    let expected = rows as usize * cols as usize;
    if points.len() != expected {
        return Err(QuantizeError::invalid(format!(
            "point count {} does not match {rows}x{cols} = {expected}",
            points.len()
        )));
    }

    let mut raw = Vec::with_capacity(expected * CHANNELS);
    for point in points {
        raw.extend(point.iter().map(|&v| narrow_channel(v)));
    }

    RgbImage::from_raw(cols, rows, raw)
        .ok_or_else(|| QuantizeError::invalid("failed to rebuild image buffer"))
}

/// Float channel to 8-bit: fractional part truncated, saturating at 0 and 255,
/// NaN mapped to 0.
#[inline]
pub fn narrow_channel(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.clamp(0.0, 255.0) as u8
}
