//! Decoded RGB raster.

use crate::error::{AnalysisError, Result};
use crate::extraction::{Channel, SAMPLES_PER_PIXEL};
use image::RgbImage;

/// A decoded image as interleaved RGB bytes.
///
/// Alpha is never retained. The buffer holds at least
/// `width * height * 3` bytes; sample `c` of pixel `(x, y)` lives at
/// `(y * width + x) * 3 + c`.
#[derive(Clone)]
pub struct Raster {
    /// Interleaved RGB samples.
    pixels: Vec<u8>,
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
}

impl Raster {
    /// Creates a raster, checking that the buffer covers the dimensions.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(AnalysisError::invalid(format!(
                "dimensions must be non-zero (got {width}x{height})"
            )));
        }

        let needed = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(SAMPLES_PER_PIXEL))
            .ok_or_else(|| AnalysisError::invalid("dimensions overflow"))?;
        if pixels.len() < needed {
            return Err(AnalysisError::invalid(format!(
                "raster holds {} bytes, {width}x{height} RGB needs {needed}",
                pixels.len()
            )));
        }

        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Wraps an already decoded RGB image.
    pub fn from_rgb_image(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height)
    }

    /// Returns the interleaved sample data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the total number of pixels (width * height).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Returns one channel sample of pixel `(x, y)`.
    pub fn sample(&self, x: u32, y: u32, channel: Channel) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * SAMPLES_PER_PIXEL
            + channel.index();
        self.pixels.get(idx).copied()
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_creation() {
        let raster = Raster::new(vec![0u8; 64 * 48 * 3], 64, 48).unwrap();

        assert_eq!(raster.width(), 64);
        assert_eq!(raster.height(), 48);
        assert_eq!(raster.pixel_count(), 64 * 48);
    }

    #[test]
    fn test_raster_invalid_size() {
        let result = Raster::new(vec![0u8; 100], 64, 48);
        assert!(matches!(result, Err(AnalysisError::InvalidImage(_))));
    }

    #[test]
    fn test_raster_zero_dimension() {
        assert!(Raster::new(Vec::new(), 0, 10).is_err());
    }

    #[test]
    fn test_sample_lookup() {
        let raster = Raster::new(vec![1, 2, 3, 4, 5, 6], 2, 1).unwrap();

        assert_eq!(raster.sample(1, 0, Channel::Red), Some(4));
        assert_eq!(raster.sample(1, 0, Channel::Blue), Some(6));
        assert_eq!(raster.sample(2, 0, Channel::Red), None);
    }
}
