//! LSB steganography detection.
//!
//! Aggregates per-channel LSB statistics into a suspicion verdict with
//! human-readable recommendations, and tracks verdicts across requests for
//! monitoring.

use super::{
    statistics::PatternStatistics,
    threshold::{Anomaly, Pattern, PatternThresholds},
};
use crate::error::Result;
use crate::extraction::{Channel, ChannelSet};
use serde::{Deserialize, Serialize};

/// Recommendation emitted when no channel looks suspicious.
pub const NO_PATTERNS_DETECTED: &str = "No obvious steganographic patterns detected";

/// Verdict over the three LSB planes of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StegoReport {
    /// True if any channel's pattern is not random.
    pub suspicious: bool,
    /// Per-channel LSB statistics.
    pub red_analysis: PatternStatistics,
    pub green_analysis: PatternStatistics,
    pub blue_analysis: PatternStatistics,
    /// Findings in red, green, blue order.
    pub recommendations: Vec<String>,
}

impl StegoReport {
    /// Returns the statistics for `channel`.
    pub fn channel(&self, channel: Channel) -> &PatternStatistics {
        match channel {
            Channel::Red => &self.red_analysis,
            Channel::Green => &self.green_analysis,
            Channel::Blue => &self.blue_analysis,
        }
    }
}

/// Lists the anomalies for one channel, pattern check before distribution check.
pub fn channel_anomalies(
    channel: Channel,
    stats: &PatternStatistics,
    thresholds: &PatternThresholds,
) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    let percentage = stats.ones_percentage;

    if stats.pattern != Pattern::Random {
        anomalies.push(Anomaly::NonRandomPattern {
            channel,
            pattern: stats.pattern,
            share: stats.share(),
        });
    }
    if thresholds.is_unusual(percentage) {
        anomalies.push(Anomaly::UnusualDistribution {
            channel,
            percentage,
        });
    }

    anomalies
}

/// Runs LSB detection with the default thresholds.
pub fn detect_steganography(lsb: &ChannelSet) -> Result<StegoReport> {
    detect_steganography_with(lsb, &PatternThresholds::default())
}

/// Runs LSB detection over the red, green and blue LSB planes.
pub fn detect_steganography_with(
    lsb: &ChannelSet,
    thresholds: &PatternThresholds,
) -> Result<StegoReport> {
    let red_analysis = PatternStatistics::analyze_with(&lsb.red, thresholds)?;
    let green_analysis = PatternStatistics::analyze_with(&lsb.green, thresholds)?;
    let blue_analysis = PatternStatistics::analyze_with(&lsb.blue, thresholds)?;

    let mut suspicious = false;
    let mut recommendations = Vec::new();

    for (channel, stats) in [
        (Channel::Red, &red_analysis),
        (Channel::Green, &green_analysis),
        (Channel::Blue, &blue_analysis),
    ] {
        for anomaly in channel_anomalies(channel, stats, thresholds) {
            suspicious |= anomaly.is_suspicious();
            recommendations.push(anomaly.to_string());
        }
    }

    if !suspicious {
        recommendations.push(NO_PATTERNS_DETECTED.to_string());
    }

    Ok(StegoReport {
        suspicious,
        red_analysis,
        green_analysis,
        blue_analysis,
        recommendations,
    })
}

/// Running detection counts.
#[derive(Debug, Clone, Default)]
pub struct DetectionMetrics {
    /// Most recent report.
    pub latest: Option<StegoReport>,
    /// Images analyzed successfully.
    pub total_analyzed: u64,
    /// Images flagged as suspicious.
    pub total_suspicious: u64,
    /// Consecutive suspicious images.
    pub consecutive_suspicious: u64,
    /// Analyses that ended in an error.
    pub total_failures: u64,
}

/// Tracks detection verdicts across requests.
///
/// Detection itself stays a pure function; the monitor only records
/// outcomes for metrics and logging.
pub struct DetectionMonitor {
    /// Classification thresholds.
    thresholds: PatternThresholds,
    /// Current counts.
    metrics: DetectionMetrics,
}

impl DetectionMonitor {
    /// Creates a monitor with the given thresholds.
    pub fn new(thresholds: PatternThresholds) -> Self {
        Self {
            thresholds,
            metrics: DetectionMetrics::default(),
        }
    }

    /// Returns the thresholds in use.
    pub fn thresholds(&self) -> &PatternThresholds {
        &self.thresholds
    }

    /// Runs detection and records the outcome.
    pub fn analyze(&mut self, lsb: &ChannelSet) -> Result<&StegoReport> {
        let report = match detect_steganography_with(lsb, &self.thresholds) {
            Ok(report) => report,
            Err(e) => {
                self.record_failure();
                return Err(e);
            }
        };
        Ok(self.record(report))
    }

    /// Records a report produced elsewhere.
    pub fn record(&mut self, report: StegoReport) -> &StegoReport {
        self.metrics.total_analyzed += 1;

        if report.suspicious {
            self.metrics.total_suspicious += 1;
            self.metrics.consecutive_suspicious += 1;
            tracing::info!(
                red = report.red_analysis.ones_percentage,
                green = report.green_analysis.ones_percentage,
                blue = report.blue_analysis.ones_percentage,
                "Suspicious LSB distribution"
            );
        } else {
            self.metrics.consecutive_suspicious = 0;
            tracing::trace!("LSB distribution looks random");
        }

        self.metrics.latest.insert(report)
    }

    /// Records an analysis that failed before a report was produced.
    pub fn record_failure(&mut self) {
        self.metrics.total_failures += 1;
        tracing::debug!(failures = self.metrics.total_failures, "Analysis failed");
    }

    /// Returns current counts.
    pub fn metrics(&self) -> &DetectionMetrics {
        &self.metrics
    }

    /// Resets the monitor to its initial state.
    pub fn reset(&mut self) {
        self.metrics = DetectionMetrics::default();
        tracing::info!("Detection monitor reset");
    }
}

impl Default for DetectionMonitor {
    fn default() -> Self {
        Self::new(PatternThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::extraction::Matrix;

    fn plane(ones: usize, total: usize) -> Matrix {
        let data = (0..total).map(|i| u8::from(i < ones)).collect();
        Matrix::from_vec(data, total, 1).unwrap()
    }

    fn lsb(red: usize, green: usize, blue: usize) -> ChannelSet {
        ChannelSet {
            red: plane(red, 100),
            green: plane(green, 100),
            blue: plane(blue, 100),
        }
    }

    #[test]
    fn test_random_image_not_suspicious() {
        let report = detect_steganography(&lsb(45, 52, 58)).unwrap();

        assert!(!report.suspicious);
        assert_eq!(report.recommendations, vec![NO_PATTERNS_DETECTED.to_string()]);
    }

    #[test]
    fn test_all_zero_channel_double_emits() {
        let report = detect_steganography(&lsb(0, 45, 45)).unwrap();

        assert!(report.suspicious);
        assert_eq!(report.red_analysis.ones, 0);
        assert_eq!(report.red_analysis.pattern, Pattern::MostlyZeros);
        assert_eq!(
            report.recommendations,
            vec![
                "Red channel shows mostly_zeros pattern (0.0% ones)".to_string(),
                "Red channel has unusual bit distribution".to_string(),
            ]
        );
    }

    #[test]
    fn test_recommendation_order_follows_channels() {
        let report = detect_steganography(&lsb(100, 50, 35)).unwrap();

        assert!(report.suspicious);
        assert_eq!(
            report.recommendations,
            vec![
                "Red channel shows mostly_ones pattern (100.0% ones)".to_string(),
                "Red channel has unusual bit distribution".to_string(),
                "Green channel shows balanced pattern (50.0% ones)".to_string(),
                "Blue channel shows mostly_zeros pattern (35.0% ones)".to_string(),
            ]
        );
    }

    #[test]
    fn test_recommendation_rounds_ties_up() {
        let set = ChannelSet {
            red: plane(49, 400),
            green: plane(200, 400),
            blue: plane(180, 400),
        };
        let report = detect_steganography(&set).unwrap();

        assert_eq!(report.red_analysis.ones_percentage, 12.25);
        assert_eq!(
            report.recommendations,
            vec![
                "Red channel shows mostly_zeros pattern (12.3% ones)".to_string(),
                "Red channel has unusual bit distribution".to_string(),
                "Green channel shows balanced pattern (50.0% ones)".to_string(),
            ]
        );
    }

    #[test]
    fn test_report_json_shape() {
        let report = detect_steganography(&lsb(45, 52, 58)).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        for key in ["suspicious", "redAnalysis", "greenAnalysis", "blueAnalysis", "recommendations"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("perChannel").is_none());
        assert_eq!(
            json["recommendations"][0],
            "No obvious steganographic patterns detected"
        );
    }

    #[test]
    fn test_balanced_is_suspicious() {
        let report = detect_steganography(&lsb(45, 50, 45)).unwrap();
        assert!(report.suspicious);
        assert_eq!(report.channel(Channel::Green).pattern, Pattern::Balanced);
    }

    #[test]
    fn test_empty_lsb_fails() {
        let empty = Matrix::from_vec(Vec::new(), 0, 0).unwrap();
        let set = ChannelSet {
            red: empty.clone(),
            green: empty.clone(),
            blue: empty,
        };
        assert_eq!(detect_steganography(&set), Err(AnalysisError::EmptyMatrix));
    }

    #[test]
    fn test_monitor_counts() {
        let mut monitor = DetectionMonitor::default();

        monitor.analyze(&lsb(0, 45, 45)).unwrap();
        monitor.analyze(&lsb(0, 45, 45)).unwrap();
        assert_eq!(monitor.metrics().consecutive_suspicious, 2);

        let report = monitor.analyze(&lsb(45, 45, 45)).unwrap();
        assert!(!report.suspicious);

        let metrics = monitor.metrics();
        assert_eq!(metrics.total_analyzed, 3);
        assert_eq!(metrics.total_suspicious, 2);
        assert_eq!(metrics.consecutive_suspicious, 0);
        assert!(metrics.latest.is_some());
    }

    #[test]
    fn test_monitor_records_failures() {
        let mut monitor = DetectionMonitor::default();
        let empty = Matrix::from_vec(Vec::new(), 0, 0).unwrap();
        let set = ChannelSet {
            red: empty.clone(),
            green: empty.clone(),
            blue: empty,
        };

        assert!(monitor.analyze(&set).is_err());
        assert_eq!(monitor.metrics().total_failures, 1);
        assert_eq!(monitor.metrics().total_analyzed, 0);

        monitor.reset();
        assert_eq!(monitor.metrics().total_failures, 0);
    }
}
