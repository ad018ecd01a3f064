//! End-to-end analysis pipeline.
//!
//! Wires decoding, extraction, result assembly and detection together.
//! Storage is injected per call; the analyzer itself holds no request state.

use crate::analysis::{PatternThresholds, StegoReport};
use crate::config::FileConfig;
use crate::error::AnalysisError;
use crate::ingest::{BlobStore, Decoder, StoreError};
use crate::report::AnalysisResult;
use thiserror::Error;

/// Suffix appended to a blob key when storing its analysis result.
pub const RESULT_SUFFIX: &str = ".analysis.json";

/// Errors from a pipeline run that touches storage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Decodes images and assembles analysis results.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    decoder: Decoder,
    thresholds: PatternThresholds,
}

impl Analyzer {
    /// Creates an analyzer from explicit parts.
    pub fn new(decoder: Decoder, thresholds: PatternThresholds) -> Self {
        Self {
            decoder,
            thresholds,
        }
    }

    /// Creates an analyzer from file configuration.
    pub fn from_config(config: &FileConfig) -> Self {
        Self::new(
            Decoder::new(config.decode.clone()),
            config.thresholds.clone(),
        )
    }

    /// Returns the classification thresholds.
    pub fn thresholds(&self) -> &PatternThresholds {
        &self.thresholds
    }

    /// Decodes and analyzes encoded image bytes.
    pub fn analyze_bytes(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<AnalysisResult, AnalysisError> {
        let raster = self.decoder.decode(bytes)?;
        let result = AnalysisResult::from_raster(filename, &raster)?;

        tracing::info!(
            filename,
            width = result.dimensions.width,
            height = result.dimensions.height,
            "Analyzed image"
        );

        Ok(result)
    }

    /// Fetches a stored blob and analyzes it; the result is named after the key.
    pub fn analyze_key(
        &self,
        store: &dyn BlobStore,
        key: &str,
    ) -> Result<AnalysisResult, PipelineError> {
        let bytes = store.fetch(key)?;
        tracing::debug!(key, bytes = bytes.len(), "Fetched blob for analysis");
        Ok(self.analyze_bytes(key, &bytes)?)
    }

    /// Stores a result as JSON next to its source blob and returns the key used.
    pub fn store_result(
        &self,
        store: &dyn BlobStore,
        key: &str,
        result: &AnalysisResult,
    ) -> Result<String, PipelineError> {
        let result_key = format!("{key}{RESULT_SUFFIX}");
        let json = serde_json::to_vec(result)?;
        store.put(&result_key, &json)?;
        Ok(result_key)
    }

    /// Runs LSB detection over a result.
    pub fn detect(&self, result: &AnalysisResult) -> Result<StegoReport, AnalysisError> {
        result.detect(&self.thresholds)
    }

    /// Renders the plain-text summary of a result.
    pub fn summarize(&self, result: &AnalysisResult) -> Result<String, AnalysisError> {
        result.summary(&self.thresholds)
    }
}
