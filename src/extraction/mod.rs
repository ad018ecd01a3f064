//! Channel and bit-plane extraction.
//!
//! This module turns a decoded raster into plain numeric matrices: one per
//! colour channel, eight binary planes per channel, and the LSB planes
//! exposed separately. Every step is a pure transform over its input.

mod bitplane;
mod channels;
mod matrix;

pub use bitplane::{
    extract_bit, extract_bit_planes, extract_lsb, extract_lsb_planes, extract_plane, BitPlane,
    PLANE_COUNT,
};
pub use channels::{extract_channels, split_channels, Channel, ChannelSet, SAMPLES_PER_PIXEL};
pub use matrix::Matrix;

use crate::error::Result;
use crate::ingest::Raster;

/// Everything extracted from one raster.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Per-channel sample values.
    pub channels: ChannelSet,
    /// Bit planes 0 through 7.
    pub bit_planes: Vec<BitPlane>,
    /// Least significant bit of every channel.
    pub lsb: ChannelSet,
}

/// Runs channel, bit-plane and LSB extraction over a raster.
#[derive(Debug, Default, Clone, Copy)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts channels, all bit planes and the LSB planes.
    pub fn process(&self, raster: &Raster) -> Result<Extraction> {
        let channels = extract_channels(raster)?;
        let bit_planes = extract_bit_planes(&channels);
        let lsb = extract_lsb_planes(&channels);

        tracing::trace!(
            width = raster.width(),
            height = raster.height(),
            planes = bit_planes.len(),
            "Extracted channels and bit planes"
        );

        Ok(Extraction {
            channels,
            bit_planes,
            lsb,
        })
    }
}
