//! Analysis result assembly.
//!
//! Packages everything extracted from one image into a single immutable,
//! serializable value. Nothing here can fail on its own; errors only come
//! from the extraction stage.

use crate::analysis::{
    detect_steganography_with, generate_summary_with, PatternThresholds, StegoReport,
};
use crate::error::Result;
use crate::extraction::{BitPlane, ChannelSet, Extraction, Extractor};
use crate::ingest::Raster;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `width * height`.
    pub fn total_pixels(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Channels, bit planes and LSB planes of one analyzed image.
///
/// `lsb_analysis` always equals the channels of `bit_planes[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Name the image was submitted under.
    pub filename: String,
    /// Size of the decoded image.
    pub dimensions: Dimensions,
    /// Raw channel samples.
    pub rgb_channels: ChannelSet,
    /// Planes 0 through 7, in order.
    pub bit_planes: Vec<BitPlane>,
    /// LSB plane of every channel.
    pub lsb_analysis: ChannelSet,
    /// When the analysis ran.
    #[serde(with = "iso_millis")]
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Packages an extraction, stamped with `timestamp`.
    pub fn assemble(
        filename: impl Into<String>,
        dimensions: Dimensions,
        extraction: Extraction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let Extraction {
            channels,
            bit_planes,
            lsb,
        } = extraction;

        Self {
            filename: filename.into(),
            dimensions,
            rgb_channels: channels,
            bit_planes,
            lsb_analysis: lsb,
            timestamp,
        }
    }

    /// Extracts and packages a raster, stamped with the current time
    /// truncated to milliseconds.
    pub fn from_raster(filename: impl Into<String>, raster: &Raster) -> Result<Self> {
        let extraction = Extractor::new().process(raster)?;
        Ok(Self::assemble(
            filename,
            Dimensions::new(raster.width(), raster.height()),
            extraction,
            Utc::now().trunc_subsecs(3),
        ))
    }

    /// Returns bit plane `plane` (0 through 7).
    pub fn bit_plane(&self, plane: u8) -> Option<&BitPlane> {
        self.bit_planes.iter().find(|p| p.plane == plane)
    }

    /// Runs LSB detection over this result.
    pub fn detect(&self, thresholds: &PatternThresholds) -> Result<StegoReport> {
        detect_steganography_with(&self.lsb_analysis, thresholds)
    }

    /// Renders the plain-text summary of this result.
    pub fn summary(&self, thresholds: &PatternThresholds) -> Result<String> {
        generate_summary_with(&self.dimensions, &self.lsb_analysis, thresholds)
    }
}

/// ISO-8601 UTC timestamps with millisecond precision.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
