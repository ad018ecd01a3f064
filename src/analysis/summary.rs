//! Plain-text analysis summary.

use super::detector::{detect_steganography_with, StegoReport};
use super::threshold::PatternThresholds;
use crate::error::Result;
use crate::extraction::{Channel, ChannelSet};
use crate::report::Dimensions;
use serde::Deserialize;
use std::fmt::Write;

/// The parts of an analysis result a summary needs.
///
/// Deserializes from a full analysis result JSON document; other fields are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryInput {
    pub dimensions: Dimensions,
    pub lsb_analysis: ChannelSet,
}

/// Renders the summary with the default thresholds.
pub fn generate_summary(dimensions: &Dimensions, lsb: &ChannelSet) -> Result<String> {
    generate_summary_with(dimensions, lsb, &PatternThresholds::default())
}

/// Renders dimensions, pixel count, per-channel LSB percentages and the
/// recommendation list, one item per line.
pub fn generate_summary_with(
    dimensions: &Dimensions,
    lsb: &ChannelSet,
    thresholds: &PatternThresholds,
) -> Result<String> {
    let report = detect_steganography_with(lsb, thresholds)?;
    Ok(format_summary(dimensions, &report))
}

/// Renders the summary text for a report that has already been computed.
pub fn format_summary(dimensions: &Dimensions, report: &StegoReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "Image Analysis Summary:");
    let _ = writeln!(out, "Dimensions: {}x{}", dimensions.width, dimensions.height);
    let _ = writeln!(out, "Total pixels: {}", dimensions.total_pixels());
    let _ = writeln!(out);

    let _ = writeln!(out, "LSB Analysis:");
    for channel in Channel::ALL {
        let _ = writeln!(
            out,
            "{} channel: {}% ones",
            channel,
            report.channel(channel).share()
        );
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Recommendations:");
    for rec in &report.recommendations {
        let _ = writeln!(out, "\u{2022} {rec}");
    }

    out
}

impl SummaryInput {
    /// Renders the summary for this input.
    pub fn summarize(&self, thresholds: &PatternThresholds) -> Result<String> {
        generate_summary_with(&self.dimensions, &self.lsb_analysis, thresholds)
    }
}
