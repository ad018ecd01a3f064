//! Bit distribution analysis and steganography detection.
//!
//! This module classifies binary matrices by their share of ones and turns
//! the LSB planes of an image into a suspicion verdict. The checks are
//! heuristics for triage, not a proof that data is hidden.

mod detector;
mod statistics;
mod summary;
mod threshold;

pub use detector::{
    channel_anomalies, detect_steganography, detect_steganography_with, DetectionMetrics,
    DetectionMonitor, StegoReport, NO_PATTERNS_DETECTED,
};
pub use statistics::{OnesShare, PatternStatistics};
pub use summary::{format_summary, generate_summary, generate_summary_with, SummaryInput};
pub use threshold::{Anomaly, Pattern, PatternThresholds};
