//! Policy gate
//!
//! Pure predicate checks against an [`UploadPolicy`]. Each check passes or returns the
//! [`RejectionReason`] naming the configured limit that was violated.

use std::sync::Arc;

use docgate_core::UploadPolicy;

use crate::metadata::{ImageMetadata, PdfMetadata};
use crate::sniff::DetectedType;
use crate::verdict::RejectionReason;

/// Policy gate over a shared, read-only policy
#[derive(Debug, Clone)]
pub struct PolicyGate {
    policy: Arc<UploadPolicy>,
}

impl PolicyGate {
    pub fn new(policy: Arc<UploadPolicy>) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Fails if the buffer is empty
    pub fn check_presence(&self, data: &[u8]) -> Result<(), RejectionReason> {
        if data.is_empty() {
            return Err(RejectionReason::FileMissing);
        }
        Ok(())
    }

    /// Fails if `size_bytes` exceeds the max file size. Runs before any parsing.
    pub fn check_size(&self, size_bytes: u64) -> Result<(), RejectionReason> {
        if size_bytes > self.policy.max_file_size_bytes {
            return Err(RejectionReason::FileTooLarge {
                size_bytes,
                max_bytes: self.policy.max_file_size_bytes,
            });
        }
        Ok(())
    }

    /// Fails if the detected type is not on the allow-list
    pub fn check_allowed_type(&self, detected: &DetectedType) -> Result<(), RejectionReason> {
        if !self.policy.is_allowed(detected.as_str()) {
            return Err(RejectionReason::UnsupportedType {
                detected: detected.to_string(),
                allowed: self.policy.allowed_media_types.iter().cloned().collect(),
            });
        }
        Ok(())
    }

    /// Fails on encryption, then on page count
    pub fn check_pdf_policy(&self, metadata: &PdfMetadata) -> Result<(), RejectionReason> {
        if metadata.is_encrypted {
            return Err(RejectionReason::EncryptedNotSupported);
        }

        if metadata.page_count > self.policy.max_pdf_pages {
            return Err(RejectionReason::PageLimitExceeded {
                page_count: metadata.page_count,
                max_pages: self.policy.max_pdf_pages,
            });
        }

        Ok(())
    }

    /// Fails on minimum dimension, then maximum dimension, then pixel count.
    /// A zero width or height is always too small, whatever the configured minimum.
    pub fn check_image_policy(&self, metadata: &ImageMetadata) -> Result<(), RejectionReason> {
        let (width_px, height_px) = (metadata.width_px, metadata.height_px);
        let min_dimension = self.policy.min_image_dimension;
        let max_dimension = self.policy.max_image_dimension;

        if width_px == 0 || height_px == 0 || width_px < min_dimension || height_px < min_dimension
        {
            return Err(RejectionReason::DimensionTooSmall {
                width_px,
                height_px,
                min_dimension,
            });
        }

        if width_px > max_dimension || height_px > max_dimension {
            return Err(RejectionReason::DimensionTooLarge {
                width_px,
                height_px,
                max_dimension,
            });
        }

        let pixel_count = metadata.pixel_count();
        if pixel_count > self.policy.max_image_pixels {
            return Err(RejectionReason::PixelCountExceeded {
                pixel_count,
                max_pixels: self.policy.max_image_pixels,
            });
        }

        Ok(())
    }
}
