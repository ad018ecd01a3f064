//! Visualization of channels and bit planes.
//!
//! Produces RGBA buffers for display: a channel keeps its own sample and
//! zeroes the other two, a bit plane becomes black and white.

use crate::extraction::{Channel, Matrix};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use thiserror::Error;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("matrix of {width}x{height} cannot be rendered")]
    InvalidSize { width: usize, height: usize },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn buffer(matrix: &Matrix, pixel: impl Fn(u8) -> Rgba<u8>) -> Result<RgbaImage, RenderError> {
    let invalid = || RenderError::InvalidSize {
        width: matrix.width(),
        height: matrix.height(),
    };
    if matrix.is_empty() {
        return Err(invalid());
    }
    let width = u32::try_from(matrix.width()).map_err(|_| invalid())?;
    let height = u32::try_from(matrix.height()).map_err(|_| invalid())?;

    let values = matrix.as_slice();
    Ok(RgbaImage::from_fn(width, height, |x, y| {
        pixel(values[y as usize * matrix.width() + x as usize])
    }))
}

/// Renders one channel in its own colour, fully opaque.
pub fn render_channel(matrix: &Matrix, channel: Channel) -> Result<RgbaImage, RenderError> {
    buffer(matrix, |v| {
        let mut px = [0, 0, 0, 255];
        px[channel.index()] = v;
        Rgba(px)
    })
}

/// Renders a binary plane as greyscale: 1 is white, 0 is black.
pub fn render_bit_plane(matrix: &Matrix) -> Result<RgbaImage, RenderError> {
    buffer(matrix, |bit| {
        let v = bit.saturating_mul(255);
        Rgba([v, v, v, 255])
    })
}

/// Scales binary values to display intensities (0 or 255).
pub fn bit_plane_to_pixels(matrix: &Matrix) -> Matrix {
    matrix.map(|bit| bit.saturating_mul(255))
}

/// Encodes a rendered buffer as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
