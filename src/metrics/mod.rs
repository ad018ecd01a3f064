//! Prometheus metrics for analysis monitoring.
//!
//! # Metrics Exposed
//!
//! ## Throughput
//! - `bitplane_stego_images_analyzed_total` - Images analyzed successfully
//! - `bitplane_stego_suspicious_total` - Images flagged as suspicious
//! - `bitplane_stego_failures_total` - Analyses that failed
//!
//! ## Latest Verdict
//! - `bitplane_stego_consecutive_suspicious` - Consecutive suspicious images
//! - `bitplane_stego_last_suspicious` - Latest verdict (1=suspicious, 0=clean)
//! - `bitplane_stego_last_image_pixels` - Pixel count of the latest image
//! - `bitplane_stego_lsb_ones_percentage{channel}` - Latest LSB ones share per channel
//!
//! # Example
//!
//! ```
//! use bitplane_stego::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! registry.update(&MetricsSnapshot {
//!     total_analyzed: 12,
//!     total_suspicious: 3,
//!     last_suspicious: true,
//!     last_ones_percentage: Some([49.8, 50.3, 12.5]),
//!     ..Default::default()
//! });
//!
//! assert!(registry.encode().unwrap().contains("bitplane_stego_suspicious_total 3"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
