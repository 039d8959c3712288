//! Core traits for structural inspection
//!
//! Each format family sits behind a narrow inspector interface so the decoding library
//! can be swapped without touching the policy gate or the orchestrator.

use crate::metadata::{ImageMetadata, PdfMetadata, RasterFormat};

/// Why an inspector could not produce structural metadata
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InspectionError {
    #[error("Malformed structure: {0}")]
    Malformed(String),

    #[error("Document has no pages")]
    NoPages,

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Decoder panicked: {0}")]
    DecoderPanic(String),
}

/// PDF inspector - reports page count and encryption without rendering
pub trait PdfInspector: Send + Sync {
    fn inspect(&self, data: &[u8]) -> Result<PdfMetadata, InspectionError>;
}

/// Image inspector - reports pixel dimensions from headers
pub trait ImageInspector: Send + Sync {
    fn inspect(&self, data: &[u8], format: RasterFormat) -> Result<ImageMetadata, InspectionError>;
}

/// Run a decoder call, turning a panic inside a third-party library into an error.
pub(crate) fn guard_decoder<T, F>(decoder: &'static str, f: F) -> Result<T, InspectionError>
where
    F: FnOnce() -> Result<T, InspectionError>,
{
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(decoder = decoder, panic = %message, "Decoder panicked on input");
            Err(InspectionError::DecoderPanic(message))
        }
    }
}
