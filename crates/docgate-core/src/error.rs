//! Error metadata module
//!
//! Rejections produced by the validation pipeline are ordinary values, not failures. This
//! module defines how such a value describes itself to the boundary that formats
//! responses and logs, without this crate knowing anything about that boundary.

use serde::Serialize;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug level - for expected outcomes like a policy rejection
    Debug,
    /// Warning level - for input that looks broken or hostile
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code a web front end should return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FILE_TOO_LARGE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message, with the violated limit interpolated
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}
