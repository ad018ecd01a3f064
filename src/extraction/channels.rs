//! Colour channel separation.
//!
//! Splits an interleaved RGB raster into one matrix per colour channel.

use super::Matrix;
use crate::error::{AnalysisError, Result};
use crate::ingest::Raster;
use serde::{Deserialize, Serialize};

/// Number of samples per pixel in an interleaved RGB raster.
pub const SAMPLES_PER_PIXEL: usize = 3;

/// One colour component of an RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// All channels in sample order.
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Sample offset of this channel within a pixel.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    /// Capitalised display name.
    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "Red",
            Channel::Green => "Green",
            Channel::Blue => "Blue",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(Channel::Red),
            "green" | "g" => Ok(Channel::Green),
            "blue" | "b" => Ok(Channel::Blue),
            other => Err(format!("unknown channel '{other}'")),
        }
    }
}

/// A red/green/blue triple of equally shaped matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSet {
    /// Red samples.
    pub red: Matrix,
    /// Green samples.
    pub green: Matrix,
    /// Blue samples.
    pub blue: Matrix,
}

impl ChannelSet {
    /// Returns the matrix for `channel`.
    pub fn get(&self, channel: Channel) -> &Matrix {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
        }
    }

    /// Applies `f` to every cell of every channel.
    pub fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            red: self.red.map(&f),
            green: self.green.map(&f),
            blue: self.blue.map(&f),
        }
    }

    /// Iterates over `(channel, matrix)` pairs in red, green, blue order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &Matrix)> {
        Channel::ALL.into_iter().map(move |c| (c, self.get(c)))
    }
}

/// Splits interleaved RGB bytes into channel matrices.
///
/// `red[y][x] = data[(y * width + x) * 3]`, with green and blue at the
/// following two offsets. Trailing bytes beyond `width * height * 3` are
/// ignored.
pub fn split_channels(width: usize, height: usize, data: &[u8]) -> Result<ChannelSet> {
    if width == 0 || height == 0 {
        return Err(AnalysisError::invalid(format!(
            "dimensions must be non-zero (got {width}x{height})"
        )));
    }

    let needed = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(SAMPLES_PER_PIXEL))
        .ok_or_else(|| AnalysisError::invalid("dimensions overflow"))?;
    if data.len() < needed {
        return Err(AnalysisError::invalid(format!(
            "raster holds {} bytes, {width}x{height} RGB needs {needed}",
            data.len()
        )));
    }

    let plane = |c: usize| {
        Matrix::from_fn(width, height, |x, y| data[(y * width + x) * SAMPLES_PER_PIXEL + c])
    };

    Ok(ChannelSet {
        red: plane(0),
        green: plane(1),
        blue: plane(2),
    })
}

/// Splits a decoded raster into channel matrices.
pub fn extract_channels(raster: &Raster) -> Result<ChannelSet> {
    split_channels(
        raster.width() as usize,
        raster.height() as usize,
        raster.pixels(),
    )
}
