//! OCR through the tesseract command-line engine
//!
//! The image is streamed to `tesseract stdin stdout` so nothing touches disk.

use super::OcrTextDecoder;
use crate::errors::ExtractionError;
use async_trait::async_trait;
use routine_common::config::OcrConfig;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument};

const SERVICE: &str = "tesseract";

pub struct TesseractCli {
    binary: String,
    language: String,
    timeout: Duration,
}

impl TesseractCli {
    pub fn new(binary: impl Into<String>, language: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
            timeout,
        }
    }

    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(
            config.tesseract_path.clone(),
            config.language.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    async fn run(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| failure(format!("failed to start {}: {}", self.binary, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(bytes)
                .await
                .map_err(|e| failure(format!("failed to write image: {}", e)))?;
            // Closing stdin lets tesseract start recognizing
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| failure(format!("failed to read output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!("exited with {}: {}", output.status, stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl OcrTextDecoder for TesseractCli {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn recognize(&self, bytes: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        let text = tokio::time::timeout(self.timeout, self.run(bytes))
            .await
            .map_err(|_| ExtractionError::ExternalServiceTimeout {
                service: SERVICE.to_string(),
                timeout_secs: self.timeout.as_secs(),
            })??;

        debug!(chars = text.len(), "OCR complete");
        Ok(text)
    }
}

fn failure(message: String) -> ExtractionError {
    ExtractionError::ExternalService {
        service: SERVICE.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_service_error() {
        let ocr = TesseractCli::new("/nonexistent/tesseract", "eng", Duration::from_secs(5));
        let err = tokio_test::assert_err!(ocr.recognize(b"\x89PNG", "image/png").await);
        assert!(matches!(err, ExtractionError::ExternalService { .. }));
    }

    #[test]
    fn test_from_config() {
        let ocr = TesseractCli::from_config(&OcrConfig::default());
        assert_eq!(ocr.binary, "tesseract");
        assert_eq!(ocr.language, "eng");
        assert_eq!(ocr.timeout, Duration::from_secs(60));
    }
}
