//! Remote document-understanding client
//!
//! Posts the raw document to a Document AI style `:process` endpoint and
//! reads back the recognized text.

use super::DocumentUnderstandingService;
use crate::errors::ExtractionError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use routine_common::config::DocumentServiceConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::instrument;

const SERVICE: &str = "document-ai";

const BASE_BACKOFF_MS: u64 = 100;
const MAX_BACKOFF_MS: u64 = 10_000;

pub struct DocumentAiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_retries: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessRequest<'a> {
    raw_document: RawDocument<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument<'a> {
    content: String,
    mime_type: &'a str,
}

#[derive(Deserialize)]
struct ProcessResponse {
    document: Option<ProcessedDocument>,
}

#[derive(Deserialize)]
struct ProcessedDocument {
    #[serde(default)]
    text: String,
}

impl DocumentAiClient {
    /// Build a client, or `None` when no endpoint is configured
    pub fn from_config(config: &DocumentServiceConfig) -> Result<Option<Self>, ExtractionError> {
        let Some(endpoint) = config.endpoint() else {
            return Ok(None);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| failure(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
        }))
    }

    /// Make request with retry
    async fn request_with_retry(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(attempt)).await;
            }

            match self.make_request(bytes, mime_type).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        error = %e,
                        "Document service request failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| failure("Unknown error after retries".to_string())))
    }

    async fn make_request(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        let request = ProcessRequest {
            raw_document: RawDocument {
                content: STANDARD.encode(bytes),
                mime_type,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| failure(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(failure(format!("API error {}: {}", status, body)));
        }

        let result: ProcessResponse = response
            .json()
            .await
            .map_err(|e| failure(format!("Failed to parse response: {}", e)))?;

        document_text(result)
    }
}

/// Exponential backoff before retry `attempt`, capped
fn backoff_delay(attempt: u32) -> Duration {
    let millis = BASE_BACKOFF_MS.saturating_mul(2_u64.saturating_pow(attempt));
    Duration::from_millis(millis.min(MAX_BACKOFF_MS))
}

fn document_text(response: ProcessResponse) -> Result<String, ExtractionError> {
    match response.document {
        Some(document) if !document.text.trim().is_empty() => Ok(document.text),
        _ => Err(failure("Response carried no document text".to_string())),
    }
}

#[async_trait]
impl DocumentUnderstandingService for DocumentAiClient {
    fn name(&self) -> &str {
        SERVICE
    }

    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn extract_text(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        self.request_with_retry(bytes, mime_type).await
    }
}

fn failure(message: String) -> ExtractionError {
    ExtractionError::ExternalService {
        service: SERVICE.to_string(),
        message,
    }
}
