//! External forensic processor.
//!
//! The processor is a black-box HTTP service that runs command-line tools
//! over a stored upload and answers with one entry per tool. The set of
//! tools is its own configuration, so results are kept as an open mapping
//! rather than a fixed record.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Output of one tool: plain text or any structured JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// Captured stdout of the tool.
    Text(String),
    /// Anything the processor already parsed.
    Structured(serde_json::Value),
}

impl ToolOutput {
    /// Returns the text output, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(text) => Some(text),
            ToolOutput::Structured(_) => None,
        }
    }
}

/// Tool name to tool output, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolResults(BTreeMap<String, ToolOutput>);

impl ToolResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the output of `tool`.
    pub fn get(&self, tool: &str) -> Option<&ToolOutput> {
        self.0.get(tool)
    }

    /// Records the output of `tool`, replacing any earlier entry.
    pub fn insert(&mut self, tool: impl Into<String>, output: ToolOutput) {
        self.0.insert(tool.into(), output);
    }

    /// Returns the number of tools.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no tool reported.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(tool, output)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolOutput)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Body sent to the processor's `/process` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessRequest<'a> {
    /// Blob key of the upload.
    pub key: &'a str,
    /// Passphrase for tools that try extraction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
}

/// Errors that can occur while talking to the processor.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("processor request failed: {0}")]
    Http(String),
    #[error("processor rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid processor response: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Extracts the `error` field of a failure body, falling back to a generic message.
pub fn rejection_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| "Failed to process file.".to_string())
}

#[cfg(feature = "server")]
pub use client::ProcessorClient;

#[cfg(feature = "server")]
mod client {
    use super::{rejection_message, ProcessRequest, ProcessorError, ToolResults};
    use reqwest::Client;
    use std::time::Duration;

    /// HTTP client for the processor service.
    #[derive(Debug, Clone)]
    pub struct ProcessorClient {
        base_url: String,
        http_client: Client,
    }

    impl ProcessorClient {
        /// Creates a client for the processor at `base_url`.
        pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProcessorError> {
            let http_client = Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| ProcessorError::Http(e.to_string()))?;

            Ok(Self {
                base_url: base_url.trim_end_matches('/').to_string(),
                http_client,
            })
        }

        /// Returns the processor base URL.
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        /// Asks the processor to run its tools over the blob stored under `key`.
        pub async fn process(
            &self,
            key: &str,
            password: Option<&str>,
        ) -> Result<ToolResults, ProcessorError> {
            let url = format!("{}/process", self.base_url);

            let response = self
                .http_client
                .post(&url)
                .json(&ProcessRequest { key, password })
                .send()
                .await
                .map_err(|e| ProcessorError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ProcessorError::Rejected {
                    status: status.as_u16(),
                    message: rejection_message(&body),
                });
            }

            let results: ToolResults = response
                .json()
                .await
                .map_err(|e| ProcessorError::Decode(e.to_string()))?;

            tracing::debug!(key, tools = results.len(), "Processor finished");
            Ok(results)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_tool_output() {
        let json = r#"{
            "strings": "IHDR\nIDAT\n",
            "binwalk": {"entries": [{"offset": 0, "description": "PNG image"}]},
            "exiftool": "File Type : PNG"
        }"#;
        let results: ToolResults = serde_json::from_str(json).unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results.get("strings").and_then(ToolOutput::as_text), Some("IHDR\nIDAT\n"));
        assert!(matches!(
            results.get("binwalk"),
            Some(ToolOutput::Structured(_))
        ));

        let names: Vec<&str> = results.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["binwalk", "exiftool", "strings"]);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut results = ToolResults::new();
        results.insert("zsteg", ToolOutput::Text("nothing".into()));

        assert_eq!(
            serde_json::to_string(&results).unwrap(),
            r#"{"zsteg":"nothing"}"#
        );
    }

    #[test]
    fn test_request_omits_missing_password() {
        let body = serde_json::to_string(&ProcessRequest {
            key: "a.png",
            password: None,
        })
        .unwrap();
        assert_eq!(body, r#"{"key":"a.png"}"#);
    }

    #[test]
    fn test_rejection_message() {
        assert_eq!(
            rejection_message(r#"{"error":"Missing S3 key or bucket"}"#),
            "Missing S3 key or bucket"
        );
        assert_eq!(rejection_message("<html>"), "Failed to process file.");
    }
}
