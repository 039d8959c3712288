//! Structural metadata extracted by the format inspectors

use serde::Serialize;

use docgate_core::constants::{MEDIA_TYPE_JPEG, MEDIA_TYPE_PNG, MEDIA_TYPE_TIFF};

/// Raster formats the image inspector understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Png,
    Jpeg,
    Tiff,
}

impl RasterFormat {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            MEDIA_TYPE_PNG => Some(RasterFormat::Png),
            MEDIA_TYPE_JPEG => Some(RasterFormat::Jpeg),
            MEDIA_TYPE_TIFF => Some(RasterFormat::Tiff),
            _ => None,
        }
    }

    pub fn media_type(&self) -> &'static str {
        match self {
            RasterFormat::Png => MEDIA_TYPE_PNG,
            RasterFormat::Jpeg => MEDIA_TYPE_JPEG,
            RasterFormat::Tiff => MEDIA_TYPE_TIFF,
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            RasterFormat::Png => image::ImageFormat::Png,
            RasterFormat::Jpeg => image::ImageFormat::Jpeg,
            RasterFormat::Tiff => image::ImageFormat::Tiff,
        }
    }
}

/// PDF metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfMetadata {
    /// Zero when the document is encrypted and its page tree could not be read.
    pub page_count: u32,
    pub is_encrypted: bool,
    /// Header version, e.g. "1.7"
    pub version: Option<String>,
}

/// Image metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMetadata {
    pub width_px: u32,
    pub height_px: u32,
    pub format: RasterFormat,
}

impl ImageMetadata {
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width_px) * u64::from(self.height_px)
    }
}

/// Format-specific facts consumed by the policy gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StructuralMetadata {
    Pdf(PdfMetadata),
    Image(ImageMetadata),
}
