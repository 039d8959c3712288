//! Docgate Validation Library
//!
//! This crate decides whether an uploaded file may enter the system. It sniffs the media
//! type from content, enforces the upload policy, and parses just enough PDF and image
//! structure to check page counts, encryption and pixel dimensions.

pub mod metadata;
pub mod policy;
pub mod sniff;
pub mod traits;
pub mod verdict;

pub mod document;
pub mod image;
pub mod validator;

// Re-export commonly used types
pub use crate::document::LopdfInspector;
pub use crate::image::HeaderImageInspector;
pub use metadata::{ImageMetadata, PdfMetadata, RasterFormat, StructuralMetadata};
pub use policy::PolicyGate;
pub use sniff::{detect, DetectedType, MediaKind};
pub use traits::{ImageInspector, InspectionError, PdfInspector};
pub use validator::{validate, Validator};
pub use verdict::{AcceptedFile, RejectionReason, ValidationStage, ValidationVerdict};
