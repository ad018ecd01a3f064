//! Image decoding into RGB rasters.
//!
//! Format detection and decompression are delegated to the `image` crate.
//! Anything it cannot read, or anything larger than the configured pixel
//! limit, is reported as [`AnalysisError::InvalidImage`].

use super::Raster;
use crate::config::DecodeConfig;
use crate::error::{AnalysisError, Result};
use image::ImageReader;
use std::io::Cursor;

/// Decodes encoded image bytes into a [`Raster`].
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    /// Creates a decoder with the given limits.
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    /// Decodes PNG, JPEG, BMP or any other supported format.
    ///
    /// Alpha is discarded; greyscale and palette images are expanded to RGB.
    pub fn decode(&self, bytes: &[u8]) -> Result<Raster> {
        if bytes.is_empty() {
            return Err(AnalysisError::invalid("empty input"));
        }

        let (width, height) = reader(bytes)?
            .into_dimensions()
            .map_err(|e| AnalysisError::invalid(e.to_string()))?;
        self.check_limits(width, height)?;

        let image = reader(bytes)?
            .decode()
            .map_err(|e| AnalysisError::invalid(e.to_string()))?;

        tracing::debug!(width, height, color = ?image.color(), "Decoded image");

        Raster::from_rgb_image(image.to_rgb8())
    }

    fn check_limits(&self, width: u32, height: u32) -> Result<()> {
        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.config.max_pixels {
            return Err(AnalysisError::invalid(format!(
                "{width}x{height} exceeds the {} pixel limit",
                self.config.max_pixels
            )));
        }
        Ok(())
    }
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AnalysisError::invalid(e.to_string()))?;
    if reader.format().is_none() {
        return Err(AnalysisError::invalid("unrecognised image format"));
    }
    Ok(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Channel;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

    fn encode_png(image: &RgbImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let image = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 200]));
        let raster = Decoder::default().decode(&encode_png(&image)).unwrap();

        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(raster.sample(2, 1, Channel::Red), Some(2));
        assert_eq!(raster.sample(2, 1, Channel::Green), Some(1));
        assert_eq!(raster.sample(2, 1, Channel::Blue), Some(200));
    }

    #[test]
    fn test_alpha_dropped() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();

        let raster = Decoder::default().decode(out.get_ref()).unwrap();
        assert_eq!(raster.pixels().len(), 2 * 2 * 3);
        assert_eq!(&raster.pixels()[..3], &[10, 20, 30]);
    }

    #[test]
    fn test_garbage_rejected() {
        let result = Decoder::default().decode(b"definitely not an image");
        assert!(matches!(result, Err(AnalysisError::InvalidImage(_))));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            Decoder::default().decode(&[]),
            Err(AnalysisError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_pixel_limit() {
        let image = RgbImage::new(10, 10);
        let decoder = Decoder::new(DecodeConfig { max_pixels: 99 });

        assert!(matches!(
            decoder.decode(&encode_png(&image)),
            Err(AnalysisError::InvalidImage(_))
        ));
    }
}
