//! Docgate Core Library
//!
//! This crate provides the upload policy configuration, media type constants, and
//! error metadata shared by the validation pipeline and its front ends.

pub mod config;
pub mod constants;
pub mod data_size;
pub mod error;

// Re-export commonly used types
pub use config::UploadPolicy;
pub use data_size::{format_data_size, parse_data_size, DataSizeError};
pub use error::{ErrorMetadata, LogLevel};
