//! The seam between a receipt photo and its transcript.
//!
//! Extraction only ever sees text; whatever turns the camera image into that
//! text implements [`OcrBackend`]. The server shares one backend across
//! requests, so implementations must be `Send + Sync`.

use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Receipt image could not be read: {0}")]
    UnreadableImage(String),
    #[error("OCR engine failed: {0}")]
    Engine(String),
    #[error("No OCR engine compiled in: rebuild with the `tesseract` feature")]
    NotAvailable,
}

/// Turns an uploaded receipt photo (PNG or JPEG bytes) into its transcript,
/// one printed line per `\n`. Empty output is not an error here; the
/// extractor reports it as `NoTextDetected`.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Arc<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

/// A backend that "reads" the same transcript from every image. Used to run
/// the pipeline and the HTTP routes without an OCR engine installed.
pub struct FixedTranscript {
    transcript: String,
}

impl FixedTranscript {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self { transcript: transcript.into() }
    }
}

impl OcrBackend for FixedTranscript {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.transcript.clone())
    }
}

#[cfg(feature = "tesseract")]
pub mod tesseract {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    /// `LepTess` holds mutable engine state and is not `Sync`, so each photo
    /// gets its own instance.
    pub struct TesseractEngine {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractEngine {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }

        /// `jpn` trained data, horizontal text.
        pub fn japanese(data_path: Option<String>) -> Self {
            Self::new(data_path, "jpn")
        }
    }

    impl OcrBackend for TesseractEngine {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            if image_bytes.is_empty() {
                return Err(OcrError::UnreadableImage("empty upload".to_string()));
            }
            let mut engine = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(format!("{} ({})", e, self.lang)))?;
            engine
                .set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::UnreadableImage(e.to_string()))?;
            engine.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
