//! Bit distribution statistics.
//!
//! Counts ones and zeros in a binary matrix and classifies the result.
//! These are coarse heuristics, not a steganalysis proof.

use super::threshold::{Pattern, PatternThresholds};
use crate::error::{AnalysisError, Result};
use crate::extraction::Matrix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of ones in a bit count, displayed as a percentage with one
/// decimal and exact ties rounded up (12.25 shows as 12.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnesShare {
    /// Cells equal to 1.
    pub ones: usize,
    /// Cells counted.
    pub total: usize,
}

impl OnesShare {
    /// Returns the share in tenths of a percent, rounded half up.
    pub fn tenths(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let ones = self.ones as u64;
        let total = self.total as u64;
        (2000 * ones + total) / (2 * total)
    }
}

impl fmt::Display for OnesShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenths = self.tenths();
        write!(f, "{}.{}", tenths / 10, tenths % 10)
    }
}

/// Distribution of bits in one binary matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternStatistics {
    /// Number of cells analyzed.
    pub total_bits: usize,
    /// Cells equal to 1.
    pub ones: usize,
    /// Remaining cells.
    pub zeros: usize,
    /// `100 * ones / total_bits`, unrounded.
    pub ones_percentage: f64,
    /// Coarse classification of the distribution.
    pub pattern: Pattern,
}

impl PatternStatistics {
    /// Returns the ones count for display.
    pub fn share(&self) -> OnesShare {
        OnesShare {
            ones: self.ones,
            total: self.total_bits,
        }
    }

    /// Analyzes a binary matrix with the default thresholds.
    pub fn analyze(matrix: &Matrix) -> Result<Self> {
        Self::analyze_with(matrix, &PatternThresholds::default())
    }

    /// Analyzes a binary matrix.
    ///
    /// Fails with [`AnalysisError::EmptyMatrix`] if the matrix has no cells.
    pub fn analyze_with(matrix: &Matrix, thresholds: &PatternThresholds) -> Result<Self> {
        let total_bits = matrix.len();
        if total_bits == 0 {
            return Err(AnalysisError::EmptyMatrix);
        }

        let ones = matrix.count_ones();
        let zeros = total_bits - ones;
        let ones_percentage = 100.0 * ones as f64 / total_bits as f64;

        Ok(Self {
            total_bits,
            ones,
            zeros,
            ones_percentage,
            pattern: thresholds.classify(ones_percentage),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(ones: usize, total: usize) -> Matrix {
        let data = (0..total).map(|i| u8::from(i < ones)).collect();
        Matrix::from_vec(data, total, 1).unwrap()
    }

    #[test]
    fn test_all_zero_plane() {
        let stats = PatternStatistics::analyze(&bits(0, 64)).unwrap();

        assert_eq!(stats.total_bits, 64);
        assert_eq!(stats.ones, 0);
        assert_eq!(stats.zeros, 64);
        assert_eq!(stats.ones_percentage, 0.0);
        assert_eq!(stats.pattern, Pattern::MostlyZeros);
    }

    #[test]
    fn test_all_one_plane() {
        let stats = PatternStatistics::analyze(&bits(64, 64)).unwrap();

        assert_eq!(stats.ones_percentage, 100.0);
        assert_eq!(stats.pattern, Pattern::MostlyOnes);
    }

    #[test]
    fn test_exact_half_is_balanced() {
        let stats = PatternStatistics::analyze(&bits(50, 100)).unwrap();
        assert_eq!(stats.pattern, Pattern::Balanced);
    }

    #[test]
    fn test_percentage_values() {
        let classify = |ones| PatternStatistics::analyze(&bits(ones, 100)).unwrap().pattern;

        assert_eq!(classify(61), Pattern::MostlyOnes);
        assert_eq!(classify(39), Pattern::MostlyZeros);
        assert_eq!(classify(45), Pattern::Random);
        assert_eq!(classify(60), Pattern::Random);
        assert_eq!(classify(40), Pattern::Random);
    }

    #[test]
    fn test_percentage_not_rounded() {
        let stats = PatternStatistics::analyze(&bits(1, 3)).unwrap();
        assert!((stats.ones_percentage - 100.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_share_rounds_ties_up() {
        let stats = PatternStatistics::analyze(&bits(49, 400)).unwrap();
        assert_eq!(stats.ones_percentage, 12.25);
        assert_eq!(stats.share().to_string(), "12.3");

        assert_eq!(OnesShare { ones: 1, total: 3 }.to_string(), "33.3");
        assert_eq!(OnesShare { ones: 2, total: 3 }.to_string(), "66.7");
        assert_eq!(OnesShare { ones: 1, total: 8 }.to_string(), "12.5");
        assert_eq!(OnesShare { ones: 1, total: 1600 }.to_string(), "0.1");
        assert_eq!(OnesShare { ones: 7, total: 7 }.to_string(), "100.0");
    }

    #[test]
    fn test_empty_matrix_fails() {
        let empty = Matrix::from_vec(Vec::new(), 0, 0).unwrap();
        assert_eq!(
            PatternStatistics::analyze(&empty),
            Err(AnalysisError::EmptyMatrix)
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let stats = PatternStatistics::analyze(&bits(1, 4)).unwrap();
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalBits"], 4);
        assert_eq!(json["onesPercentage"], 25.0);
        assert_eq!(json["pattern"], "mostly_zeros");
    }
}
