//! Bit-Plane Steganography Analysis Library
//!
//! Splits uploaded images into colour channels and bit planes and looks for
//! the skewed least-significant-bit distributions that LSB steganography
//! tends to leave behind.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! ingest → extraction → analysis → report
//!   ↓                      ↓          ↓
//! store                 metrics    render
//! ```
//!
//! # Design Principles
//!
//! - **Pure core**: decoding aside, every stage is a synchronous transform
//!   over plain matrices with no shared state between requests
//! - **All or nothing**: an analysis yields a complete result or an error
//! - **Injected storage**: backends plug in through [`ingest::BlobStore`]
//! - **Heuristic verdicts**: the pattern checks flag images for a closer
//!   look; they do not prove hidden data exists
//!
//! # Example
//!
//! ```
//! use bitplane_stego::{
//!     analysis::detect_steganography,
//!     ingest::Raster,
//!     report::AnalysisResult,
//! };
//!
//! // 2x2 image, red samples 0..=3, green 0, blue 255
//! let pixels = vec![0, 0, 255, 1, 0, 255, 2, 0, 255, 3, 0, 255];
//! let raster = Raster::new(pixels, 2, 2).unwrap();
//!
//! let result = AnalysisResult::from_raster("tiny.png", &raster).unwrap();
//! assert_eq!(result.lsb_analysis.red.to_rows(), vec![vec![0, 1], vec![0, 1]]);
//!
//! let report = detect_steganography(&result.lsb_analysis).unwrap();
//! assert!(report.suspicious);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod extraction;
pub mod ingest;
pub mod metrics;
pub mod processor;
pub mod render;
pub mod report;
#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types at crate root
pub use analysis::{detect_steganography, generate_summary, Pattern, PatternStatistics, StegoReport};
pub use analyzer::Analyzer;
pub use config::FileConfig;
pub use error::AnalysisError;
pub use extraction::{extract_bit, extract_lsb, Channel, ChannelSet, Matrix};
pub use ingest::{BlobStore, Decoder, Raster};
pub use report::{AnalysisResult, Dimensions};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
