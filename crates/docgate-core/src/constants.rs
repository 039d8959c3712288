//! Canonical media type labels produced by content sniffing.

pub const MEDIA_TYPE_PDF: &str = "application/pdf";
pub const MEDIA_TYPE_PNG: &str = "image/png";
pub const MEDIA_TYPE_JPEG: &str = "image/jpeg";
pub const MEDIA_TYPE_TIFF: &str = "image/tiff";
pub const MEDIA_TYPE_TEXT: &str = "text/plain";
pub const MEDIA_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// Media types that have a structural inspector. An upload policy may only allow these.
pub const SUPPORTED_MEDIA_TYPES: [&str; 4] = [
    MEDIA_TYPE_PDF,
    MEDIA_TYPE_PNG,
    MEDIA_TYPE_JPEG,
    MEDIA_TYPE_TIFF,
];

pub fn is_supported_media_type(media_type: &str) -> bool {
    SUPPORTED_MEDIA_TYPES.contains(&media_type)
}
