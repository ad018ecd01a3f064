//! Pattern classification thresholds.
//!
//! The classification order is fixed: "mostly ones" is tested first, then
//! "mostly zeros", then exact balance; everything else is "random". With
//! the default bounds the bands (40, 50) and (50, 60) therefore classify as
//! random, matching the historical behaviour of the upload service.

use super::statistics::OnesShare;
use crate::extraction::Channel;
use serde::{Deserialize, Serialize};

/// Coarse shape of a binary matrix's bit distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// More ones than the upper bound allows.
    MostlyOnes,
    /// Fewer ones than the lower bound allows.
    MostlyZeros,
    /// Exactly the balance point.
    Balanced,
    /// Anything else.
    Random,
}

impl Pattern {
    /// Wire name of the pattern.
    pub fn as_str(self) -> &'static str {
        match self {
            Pattern::MostlyOnes => "mostly_ones",
            Pattern::MostlyZeros => "mostly_zeros",
            Pattern::Balanced => "balanced",
            Pattern::Random => "random",
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Percentage bounds used to classify bit planes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternThresholds {
    /// Ones-percentage strictly above this is `mostly_ones`.
    pub mostly_ones_above: f64,
    /// Ones-percentage strictly below this is `mostly_zeros`.
    pub mostly_zeros_below: f64,
    /// Ones-percentage exactly equal to this is `balanced`.
    pub balanced_at: f64,
    /// Ones-percentage strictly above this is an unusual distribution.
    pub unusual_above: f64,
    /// Ones-percentage strictly below this is an unusual distribution.
    pub unusual_below: f64,
}

impl Default for PatternThresholds {
    fn default() -> Self {
        Self {
            mostly_ones_above: 60.0,
            mostly_zeros_below: 40.0,
            balanced_at: 50.0,
            unusual_above: 70.0,
            unusual_below: 30.0,
        }
    }
}

impl PatternThresholds {
    /// Classifies a ones-percentage. First match wins.
    pub fn classify(&self, ones_percentage: f64) -> Pattern {
        if ones_percentage > self.mostly_ones_above {
            Pattern::MostlyOnes
        } else if ones_percentage < self.mostly_zeros_below {
            Pattern::MostlyZeros
        } else if ones_percentage == self.balanced_at {
            Pattern::Balanced
        } else {
            Pattern::Random
        }
    }

    /// Returns true if the percentage lies outside the unusual-distribution band.
    pub fn is_unusual(&self, ones_percentage: f64) -> bool {
        ones_percentage > self.unusual_above || ones_percentage < self.unusual_below
    }

    /// Checks the bounds are ordered and within 0..=100.
    pub fn validate(&self) -> Result<(), String> {
        let all = [
            self.mostly_ones_above,
            self.mostly_zeros_below,
            self.balanced_at,
            self.unusual_above,
            self.unusual_below,
        ];
        if all.iter().any(|v| !(0.0..=100.0).contains(v)) {
            return Err("percentages must lie within 0..=100".to_string());
        }
        if self.mostly_zeros_below > self.mostly_ones_above {
            return Err(format!(
                "mostly_zeros_below ({}) exceeds mostly_ones_above ({})",
                self.mostly_zeros_below, self.mostly_ones_above
            ));
        }
        if self.unusual_below > self.unusual_above {
            return Err(format!(
                "unusual_below ({}) exceeds unusual_above ({})",
                self.unusual_below, self.unusual_above
            ));
        }
        Ok(())
    }
}

/// A per-channel observation that contributes a recommendation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Anomaly {
    #[error("{channel} channel shows {pattern} pattern ({share}% ones)")]
    NonRandomPattern {
        channel: Channel,
        pattern: Pattern,
        share: OnesShare,
    },

    #[error("{channel} channel has unusual bit distribution")]
    UnusualDistribution { channel: Channel, percentage: f64 },
}

impl Anomaly {
    /// Returns true if this anomaly marks the image as suspicious.
    pub fn is_suspicious(&self) -> bool {
        matches!(self, Anomaly::NonRandomPattern { .. })
    }
}
