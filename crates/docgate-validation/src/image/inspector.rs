//! Image inspector - pixel dimensions from PNG/JPEG/TIFF headers

use std::io::Cursor;

use image::ImageReader;

use crate::metadata::{ImageMetadata, RasterFormat};
use crate::traits::{guard_decoder, ImageInspector, InspectionError};

/// Image inspector backed by the `image` crate.
///
/// Only the header (PNG `IHDR`, JPEG `SOF`, TIFF first IFD) is decoded; the pixel data is
/// never materialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderImageInspector;

impl HeaderImageInspector {
    pub fn new() -> Self {
        Self
    }
}

impl ImageInspector for HeaderImageInspector {
    fn inspect(&self, data: &[u8], format: RasterFormat) -> Result<ImageMetadata, InspectionError> {
        // The sniffer already chose the format; never let the decoder re-guess it.
        let (width, height) = guard_decoder("image", || {
            ImageReader::with_format(Cursor::new(data), format.image_format())
                .into_dimensions()
                .map_err(|e| InspectionError::Malformed(e.to_string()))
        })?;

        if width == 0 || height == 0 {
            return Err(InspectionError::InvalidDimensions { width, height });
        }

        tracing::debug!(width, height, format = ?format, "Inspected image header");

        Ok(ImageMetadata {
            width_px: width,
            height_px: height,
            format,
        })
    }
}
