//! Content-type sniffing
//!
//! Magic bytes are checked first, using `infer` for the binary formats. A PDF header may
//! also appear after up to 1 KB of leading junk. Content that is neither is tested for
//! text, where the filename hint may pick the text subtype. Anything else is
//! `application/octet-stream`.
//!
//! A client-declared content type is never an input. The filename can never produce a
//! binary type, so renaming a file cannot route it into a format inspector.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use docgate_core::constants::{MEDIA_TYPE_OCTET_STREAM, MEDIA_TYPE_PDF, MEDIA_TYPE_TEXT};

use crate::metadata::RasterFormat;

/// How far into the buffer the PDF header may start
const PDF_HEADER_WINDOW: usize = 1024;
/// How many leading bytes the text heuristic inspects
const TEXT_SNIFF_WINDOW: usize = 1024;

/// Canonical media type derived from content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DetectedType(String);

impl DetectedType {
    pub fn new(media_type: impl Into<String>) -> Self {
        Self(media_type.into())
    }

    pub fn octet_stream() -> Self {
        Self::new(MEDIA_TYPE_OCTET_STREAM)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Which inspector, if any, handles this type
    pub fn kind(&self) -> MediaKind {
        if self.0 == MEDIA_TYPE_PDF {
            return MediaKind::Pdf;
        }
        match RasterFormat::from_media_type(&self.0) {
            Some(format) => MediaKind::Raster(format),
            None => MediaKind::Other,
        }
    }
}

impl fmt::Display for DetectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inspector routing for a detected type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Raster(RasterFormat),
    Other,
}

/// Detect the media type of `data`. Never fails: unrecognized content yields
/// `application/octet-stream` (or a text type), which the allow-list then rejects.
pub fn detect(data: &[u8], filename_hint: Option<&str>) -> DetectedType {
    if let Some(kind) = infer::get(data) {
        return DetectedType::new(kind.mime_type());
    }

    if pdf_header_offset(data).is_some() {
        return DetectedType::new(MEDIA_TYPE_PDF);
    }

    if looks_like_text(data) {
        let media_type = filename_hint
            .and_then(text_type_from_filename)
            .unwrap_or(MEDIA_TYPE_TEXT);
        return DetectedType::new(media_type);
    }

    DetectedType::octet_stream()
}

/// Offset of a `%PDF-` header lying within the first kilobyte
pub(crate) fn pdf_header_offset(data: &[u8]) -> Option<usize> {
    let window = &data[..data.len().min(PDF_HEADER_WINDOW)];
    window.windows(5).position(|w| w == b"%PDF-")
}

fn looks_like_text(data: &[u8]) -> bool {
    let prefix = &data[..data.len().min(TEXT_SNIFF_WINDOW)];
    if prefix.contains(&0) {
        return false;
    }
    match std::str::from_utf8(prefix) {
        Ok(_) => true,
        // A multi-byte character cut off by the window is still text
        Err(e) => e.error_len().is_none(),
    }
}

/// Text subtypes only. Binary formats are deliberately absent.
fn text_type_from_filename(filename: &str) -> Option<&'static str> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())?;

    match extension.as_str() {
        "txt" | "log" => Some("text/plain"),
        "csv" => Some("text/csv"),
        "json" => Some("application/json"),
        "xml" => Some("application/xml"),
        "html" | "htm" => Some("text/html"),
        "md" | "markdown" => Some("text/markdown"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        // PNG magic bytes: 89 50 4E 47 0D 0A 1A 0A
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(detect(&png, None).as_str(), "image/png");
    }

    #[test]
    fn test_detect_jpeg() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(detect(&jpeg, None).as_str(), "image/jpeg");
    }

    #[test]
    fn test_detect_tiff_both_byte_orders() {
        let little = [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let big = [0x4D, 0x4D, 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00];
        assert_eq!(detect(&little, None).as_str(), "image/tiff");
        assert_eq!(detect(&big, None).as_str(), "image/tiff");
    }

    #[test]
    fn test_detect_pdf() {
        assert_eq!(detect(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n", None).as_str(), "application/pdf");
    }

    #[test]
    fn test_detect_pdf_after_leading_junk() {
        let mut data = vec![b' '; 200];
        data.extend_from_slice(b"%PDF-1.4\n1 0 obj\n");
        assert_eq!(detect(&data, None).kind(), MediaKind::Pdf);
    }

    #[test]
    fn test_pdf_header_beyond_window_is_not_pdf() {
        let mut data = vec![b'a'; PDF_HEADER_WINDOW + 10];
        data.extend_from_slice(b"%PDF-1.4\n");
        assert_eq!(detect(&data, None).as_str(), "text/plain");
    }

    #[test]
    fn test_filename_cannot_claim_pdf() {
        let detected = detect(b"not-a-pdf", Some("file.pdf"));
        assert_eq!(detected.as_str(), "text/plain");
        assert_eq!(detected.kind(), MediaKind::Other);
    }

    #[test]
    fn test_filename_cannot_claim_image() {
        let detected = detect(&[0x00, 0x01, 0x02, 0x03], Some("photo.png"));
        assert_eq!(detected.as_str(), "application/octet-stream");
    }

    #[test]
    fn test_filename_refines_text_subtype() {
        assert_eq!(detect(b"a,b\n1,2\n", Some("data.CSV")).as_str(), "text/csv");
        assert_eq!(detect(b"hello", Some("note.txt")).as_str(), "text/plain");
        assert_eq!(detect(b"hello", None).as_str(), "text/plain");
    }

    #[test]
    fn test_whitespace_only_is_text() {
        assert_eq!(detect(b"   \n", None).as_str(), "text/plain");
    }

    #[test]
    fn test_truncated_utf8_at_window_edge_is_text() {
        let mut data = vec![b'a'; TEXT_SNIFF_WINDOW - 1];
        data.extend_from_slice("é".as_bytes());
        assert_eq!(detect(&data, None).as_str(), "text/plain");
    }

    #[test]
    fn test_binary_garbage_is_octet_stream() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0xFF];
        assert_eq!(detect(&data, Some("x.bin")), DetectedType::octet_stream());
    }

    #[test]
    fn test_empty_buffer_does_not_panic() {
        assert_eq!(detect(&[], None).as_str(), "text/plain");
    }

    #[test]
    fn test_kind_routing() {
        assert_eq!(DetectedType::new("application/pdf").kind(), MediaKind::Pdf);
        assert_eq!(
            DetectedType::new("image/jpeg").kind(),
            MediaKind::Raster(RasterFormat::Jpeg)
        );
        assert_eq!(DetectedType::new("image/gif").kind(), MediaKind::Other);
    }
}
