use kakeibo_ocr::{Extractor, OcrBackend, OcrError, ReceiptPipeline};
use std::sync::Arc;

use crate::config::{OcrBackendKind, OcrConfig};

pub type SharedBackend = Arc<dyn OcrBackend>;

/// Shared by every request. The extractor is immutable, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    /// `None` when no OCR engine is configured.
    pub pipeline: Option<Arc<ReceiptPipeline<SharedBackend>>>,
}

impl AppState {
    pub fn new(extractor: Arc<Extractor>, backend: Option<SharedBackend>) -> Self {
        let pipeline = backend.map(|b| Arc::new(ReceiptPipeline::new(b, Arc::clone(&extractor))));
        Self { extractor, pipeline }
    }
}

pub fn build_backend(config: &OcrConfig) -> Result<Option<SharedBackend>, OcrError> {
    match config.backend {
        OcrBackendKind::None => Ok(None),
        OcrBackendKind::Tesseract => tesseract(config).map(Some),
    }
}

#[cfg(feature = "tesseract")]
fn tesseract(config: &OcrConfig) -> Result<SharedBackend, OcrError> {
    use kakeibo_ocr::recognizer::tesseract::TesseractEngine;
    Ok(Arc::new(TesseractEngine::new(config.data_path.clone(), &config.lang)))
}

#[cfg(not(feature = "tesseract"))]
fn tesseract(_config: &OcrConfig) -> Result<SharedBackend, OcrError> {
    Err(OcrError::NotAvailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kakeibo_ocr::FixedTranscript;

    #[test]
    fn no_backend_means_no_pipeline() {
        let backend = build_backend(&OcrConfig::default()).unwrap();
        let state = AppState::new(Arc::new(Extractor::default()), backend);
        assert!(state.pipeline.is_none());
    }

    #[test]
    fn backend_gets_a_pipeline() {
        let backend: SharedBackend = Arc::new(FixedTranscript::new("x"));
        let state = AppState::new(Arc::new(Extractor::default()), Some(backend));
        assert!(state.pipeline.is_some());
    }

    #[cfg(not(feature = "tesseract"))]
    #[test]
    fn tesseract_requires_feature() {
        let config = OcrConfig { backend: OcrBackendKind::Tesseract, ..OcrConfig::default() };
        assert!(matches!(build_backend(&config), Err(OcrError::NotAvailable)));
    }
}
