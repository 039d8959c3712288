//! Validation verdicts and the rejection taxonomy

use serde::Serialize;

use docgate_core::constants::MEDIA_TYPE_PDF;
use docgate_core::{format_data_size, ErrorMetadata, LogLevel};

use crate::sniff::DetectedType;

/// Pipeline states, in the only order they can be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    Start,
    SizeChecked,
    TypeDetected,
    AllowListChecked,
    StructurallyValidated,
    Accepted,
}

/// Why a file was rejected. Each variant carries the configured limit it violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    #[error("File is required.")]
    FileMissing,

    #[error("File exceeds allowed size ({}).", size_label(.max_bytes))]
    FileTooLarge { size_bytes: u64, max_bytes: u64 },

    #[error("Unsupported file type: {detected} (allowed: {}).", allowed_list(.allowed))]
    UnsupportedType {
        detected: String,
        allowed: Vec<String>,
    },

    /// `detail` is the decoder's diagnostic; it is kept out of the message.
    #[error("Invalid or unreadable {}.", format_label(.media_type))]
    UnreadableOrCorrupt { media_type: String, detail: String },

    #[error("PDF encryption is not supported.")]
    EncryptedNotSupported,

    #[error("PDF exceeds allowed page limit ({max_pages}).")]
    PageLimitExceeded { page_count: u32, max_pages: u32 },

    #[error("Image dimensions below minimum ({min_dimension} x {min_dimension}).")]
    DimensionTooSmall {
        width_px: u32,
        height_px: u32,
        min_dimension: u32,
    },

    #[error("Image dimensions exceed maximum ({max_dimension} x {max_dimension}).")]
    DimensionTooLarge {
        width_px: u32,
        height_px: u32,
        max_dimension: u32,
    },

    #[error("Image exceeds allowed pixel count ({max_pixels}).")]
    PixelCountExceeded { pixel_count: u64, max_pixels: u64 },
}

fn size_label(bytes: &u64) -> String {
    format_data_size(*bytes)
}

fn allowed_list(allowed: &[String]) -> String {
    allowed.join(", ")
}

fn format_label(media_type: &str) -> &'static str {
    if media_type == MEDIA_TYPE_PDF {
        "PDF"
    } else {
        "image"
    }
}

impl RejectionReason {
    /// The last state the pipeline reached before this rejection
    pub fn stage(&self) -> ValidationStage {
        match self {
            RejectionReason::FileMissing | RejectionReason::FileTooLarge { .. } => {
                ValidationStage::Start
            }
            RejectionReason::UnsupportedType { .. } => ValidationStage::TypeDetected,
            RejectionReason::UnreadableOrCorrupt { .. } => ValidationStage::AllowListChecked,
            RejectionReason::EncryptedNotSupported
            | RejectionReason::PageLimitExceeded { .. }
            | RejectionReason::DimensionTooSmall { .. }
            | RejectionReason::DimensionTooLarge { .. }
            | RejectionReason::PixelCountExceeded { .. } => ValidationStage::StructurallyValidated,
        }
    }
}

impl ErrorMetadata for RejectionReason {
    fn http_status_code(&self) -> u16 {
        match self {
            RejectionReason::FileTooLarge { .. } => 413,
            _ => 400,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RejectionReason::FileMissing => "FILE_MISSING",
            RejectionReason::FileTooLarge { .. } => "FILE_TOO_LARGE",
            RejectionReason::UnsupportedType { .. } => "UNSUPPORTED_TYPE",
            RejectionReason::UnreadableOrCorrupt { .. } => "UNREADABLE_OR_CORRUPT",
            RejectionReason::EncryptedNotSupported => "ENCRYPTED_NOT_SUPPORTED",
            RejectionReason::PageLimitExceeded { .. } => "PAGE_LIMIT_EXCEEDED",
            RejectionReason::DimensionTooSmall { .. } => "DIMENSION_TOO_SMALL",
            RejectionReason::DimensionTooLarge { .. } => "DIMENSION_TOO_LARGE",
            RejectionReason::PixelCountExceeded { .. } => "PIXEL_COUNT_EXCEEDED",
        }
    }

    fn client_message(&self) -> String {
        self.to_string()
    }

    fn log_level(&self) -> LogLevel {
        match self {
            RejectionReason::UnreadableOrCorrupt { .. } => LogLevel::Warn,
            _ => LogLevel::Debug,
        }
    }
}

/// Facts about an accepted file that the caller may want downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptedFile {
    pub media_type: DetectedType,
    pub size_bytes: u64,
}

/// Terminal outcome of one validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "details", rename_all = "lowercase")]
pub enum ValidationVerdict {
    Accepted(AcceptedFile),
    Rejected(RejectionReason),
}

impl ValidationVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationVerdict::Accepted(_))
    }

    pub fn rejection(&self) -> Option<&RejectionReason> {
        match self {
            ValidationVerdict::Accepted(_) => None,
            ValidationVerdict::Rejected(reason) => Some(reason),
        }
    }

    pub fn into_result(self) -> Result<AcceptedFile, RejectionReason> {
        match self {
            ValidationVerdict::Accepted(file) => Ok(file),
            ValidationVerdict::Rejected(reason) => Err(reason),
        }
    }
}

impl From<RejectionReason> for ValidationVerdict {
    fn from(reason: RejectionReason) -> Self {
        ValidationVerdict::Rejected(reason)
    }
}
