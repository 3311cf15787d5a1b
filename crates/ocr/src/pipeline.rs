use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use kakeibo_core::Yen;
use thiserror::Error;

use crate::extract::{ExtractError, Extractor};
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::ExtractionResult;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("No text detected in image")]
    NoTextDetected,
    #[error("OCR task did not complete: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<ExtractError> for PipelineError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::NoTextDetected => PipelineError::NoTextDetected,
        }
    }
}

/// Orchestrates: OCR (on the blocking pool) → extract.
pub struct ReceiptPipeline<R: OcrBackend + 'static> {
    recognizer: Arc<R>,
    extractor: Arc<Extractor>,
}

impl<R: OcrBackend + 'static> ReceiptPipeline<R> {
    pub fn new(recognizer: R, extractor: Arc<Extractor>) -> Self {
        Self { recognizer: Arc::new(recognizer), extractor }
    }

    /// Process an image file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ExtractionResult, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(bytes).await
    }

    /// Process raw image bytes (camera capture or upload).
    pub async fn process_bytes(&self, image: Vec<u8>) -> Result<ExtractionResult, PipelineError> {
        let started = Instant::now();
        let size = image.len();

        // OCR engines are CPU-bound and synchronous.
        let recognizer = Arc::clone(&self.recognizer);
        let text = tokio::task::spawn_blocking(move || recognizer.recognize(&image)).await??;

        tracing::debug!(
            bytes = size,
            chars = text.chars().count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "OCR finished"
        );

        match self.extractor.extract(&text) {
            Ok(result) => {
                tracing::info!(
                    amount = %result.amount.map(Yen::format_jpy).unwrap_or_default(),
                    store_name = ?result.store_name,
                    date = ?result.date,
                    "Receipt fields extracted"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(bytes = size, "OCR returned no text");
                Err(e.into())
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
