//! Metrics collection and registry.

use crate::analysis::DetectionMetrics;
use crate::extraction::Channel;
use prometheus::{Encoder, GaugeVec, IntCounter, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of detection state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Images analyzed successfully.
    pub total_analyzed: u64,
    /// Images flagged as suspicious.
    pub total_suspicious: u64,
    /// Failed analyses.
    pub total_failures: u64,
    /// Consecutive suspicious images.
    pub consecutive_suspicious: u64,
    /// Whether the latest image was suspicious.
    pub last_suspicious: bool,
    /// Pixel count of the latest image.
    pub last_pixels: Option<usize>,
    /// LSB ones-percentage of the latest image, red/green/blue.
    pub last_ones_percentage: Option<[f64; 3]>,
}

/// Prometheus metrics registry for analysis monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    // Throughput
    analyzed_total: IntCounter,
    suspicious_total: IntCounter,
    failures_total: IntCounter,

    // Latest verdict
    consecutive_suspicious: IntGauge,
    last_suspicious: IntGauge,
    last_pixels: IntGauge,
    lsb_ones_percentage: GaugeVec,
}

impl MetricsRegistry {
    /// Creates a new metrics registry with all analysis metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let analyzed_total = IntCounter::new(
            "bitplane_stego_images_analyzed_total",
            "Total number of images analyzed",
        )?;
        let suspicious_total = IntCounter::new(
            "bitplane_stego_suspicious_total",
            "Total number of images with a non-random LSB pattern",
        )?;
        let failures_total = IntCounter::new(
            "bitplane_stego_failures_total",
            "Total number of analyses that failed",
        )?;

        let consecutive_suspicious = IntGauge::new(
            "bitplane_stego_consecutive_suspicious",
            "Number of consecutive suspicious images",
        )?;
        let last_suspicious = IntGauge::new(
            "bitplane_stego_last_suspicious",
            "Verdict for the latest image (1=suspicious, 0=clean)",
        )?;
        let last_pixels = IntGauge::new(
            "bitplane_stego_last_image_pixels",
            "Pixel count of the latest analyzed image",
        )?;
        let lsb_ones_percentage = GaugeVec::new(
            Opts::new(
                "bitplane_stego_lsb_ones_percentage",
                "Share of ones in the latest image's LSB plane",
            ),
            &["channel"],
        )?;

        registry.register(Box::new(analyzed_total.clone()))?;
        registry.register(Box::new(suspicious_total.clone()))?;
        registry.register(Box::new(failures_total.clone()))?;
        registry.register(Box::new(consecutive_suspicious.clone()))?;
        registry.register(Box::new(last_suspicious.clone()))?;
        registry.register(Box::new(last_pixels.clone()))?;
        registry.register(Box::new(lsb_ones_percentage.clone()))?;

        Ok(Self {
            registry,
            analyzed_total,
            suspicious_total,
            failures_total,
            consecutive_suspicious,
            last_suspicious,
            last_pixels,
            lsb_ones_percentage,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        // Counters only move forward by the difference
        bump(&self.analyzed_total, snapshot.total_analyzed);
        bump(&self.suspicious_total, snapshot.total_suspicious);
        bump(&self.failures_total, snapshot.total_failures);

        self.consecutive_suspicious
            .set(snapshot.consecutive_suspicious as i64);
        self.last_suspicious
            .set(if snapshot.last_suspicious { 1 } else { 0 });

        if let Some(pixels) = snapshot.last_pixels {
            self.last_pixels.set(pixels as i64);
        }
        if let Some(percentages) = snapshot.last_ones_percentage {
            for (channel, pct) in Channel::ALL.iter().zip(percentages) {
                let label = channel.name().to_ascii_lowercase();
                self.lsb_ones_percentage
                    .with_label_values(&[label.as_str()])
                    .set(pct);
            }
        }
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn bump(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the detection monitor's counts.
    pub fn from_detection(metrics: &DetectionMetrics) -> Self {
        let latest = metrics.latest.as_ref();

        Self {
            total_analyzed: metrics.total_analyzed,
            total_suspicious: metrics.total_suspicious,
            total_failures: metrics.total_failures,
            consecutive_suspicious: metrics.consecutive_suspicious,
            last_suspicious: latest.map_or(false, |r| r.suspicious),
            last_pixels: latest.map(|r| r.red_analysis.total_bits),
            last_ones_percentage: latest.map(|r| {
                [
                    r.red_analysis.ones_percentage,
                    r.green_analysis.ones_percentage,
                    r.blue_analysis.ones_percentage,
                ]
            }),
        }
    }
}
