//! Configuration module
//!
//! This module provides the upload policy: the thresholds and allow-list every candidate
//! file is checked against. The policy is built once at startup and shared read-only.

use std::collections::{BTreeSet, HashMap};
use std::env;

use anyhow::Context;
use serde::Serialize;

use crate::constants::{
    is_supported_media_type, MEDIA_TYPE_JPEG, MEDIA_TYPE_PDF, MEDIA_TYPE_PNG, MEDIA_TYPE_TIFF,
    SUPPORTED_MEDIA_TYPES,
};
use crate::data_size::{format_data_size, parse_data_size};

// Defaults
const MAX_FILE_SIZE_MB: u64 = 25;
const MAX_PDF_PAGES: u32 = 2000;
const MAX_IMAGE_PIXELS: u64 = 100_000_000;
const MIN_IMAGE_DIMENSION: u32 = 50;
const MAX_IMAGE_DIMENSION: u32 = 10_000;

/// Upload validation policy
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadPolicy {
    pub max_file_size_bytes: u64,
    pub max_pdf_pages: u32,
    pub max_image_pixels: u64,
    pub min_image_dimension: u32,
    pub max_image_dimension: u32,
    pub allowed_media_types: BTreeSet<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_pdf_pages: MAX_PDF_PAGES,
            max_image_pixels: MAX_IMAGE_PIXELS,
            min_image_dimension: MIN_IMAGE_DIMENSION,
            max_image_dimension: MAX_IMAGE_DIMENSION,
            allowed_media_types: [
                MEDIA_TYPE_PDF,
                MEDIA_TYPE_PNG,
                MEDIA_TYPE_JPEG,
                MEDIA_TYPE_TIFF,
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl UploadPolicy {
    /// Load the policy from the process environment (and `.env` when present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the policy from an in-memory map of variables.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build the policy from an arbitrary variable lookup. Unset variables take the
    /// default; variables that are set but malformed are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_file_size_bytes = match lookup("UPLOAD_MAX_FILE_SIZE") {
            Some(raw) => parse_data_size(&raw)
                .with_context(|| format!("UPLOAD_MAX_FILE_SIZE is invalid: {:?}", raw))?,
            None => defaults.max_file_size_bytes,
        };

        let allowed_media_types = match lookup("UPLOAD_ALLOWED_TYPES") {
            Some(raw) => raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            None => defaults.allowed_media_types,
        };

        let policy = UploadPolicy {
            max_file_size_bytes,
            max_pdf_pages: parse_var(&lookup, "UPLOAD_MAX_PDF_PAGES", defaults.max_pdf_pages)?,
            max_image_pixels: parse_var(
                &lookup,
                "UPLOAD_MAX_IMAGE_PIXELS",
                defaults.max_image_pixels,
            )?,
            min_image_dimension: parse_var(
                &lookup,
                "UPLOAD_MIN_IMAGE_DIMENSION",
                defaults.min_image_dimension,
            )?,
            max_image_dimension: parse_var(
                &lookup,
                "UPLOAD_MAX_IMAGE_DIMENSION",
                defaults.max_image_dimension,
            )?,
            allowed_media_types,
        };

        policy.validate()?;
        Ok(policy)
    }

    /// Reject policies that cannot be enforced consistently.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("max file size must be at least 1 byte"));
        }

        if self.max_pdf_pages == 0 {
            return Err(anyhow::anyhow!("max PDF pages must be at least 1"));
        }

        if self.max_image_pixels == 0 {
            return Err(anyhow::anyhow!("max image pixels must be at least 1"));
        }

        if self.max_image_dimension == 0 {
            return Err(anyhow::anyhow!("max image dimension must be at least 1"));
        }

        if self.min_image_dimension > self.max_image_dimension {
            return Err(anyhow::anyhow!(
                "min image dimension ({}) must not exceed max image dimension ({})",
                self.min_image_dimension,
                self.max_image_dimension
            ));
        }

        if self.allowed_media_types.is_empty() {
            return Err(anyhow::anyhow!("allowed media types must not be empty"));
        }

        if let Some(unsupported) = self
            .allowed_media_types
            .iter()
            .find(|t| !is_supported_media_type(t))
        {
            return Err(anyhow::anyhow!(
                "allowed media type {} has no inspector (supported: {})",
                unsupported,
                SUPPORTED_MEDIA_TYPES.join(", ")
            ));
        }

        Ok(())
    }

    pub fn is_allowed(&self, media_type: &str) -> bool {
        self.allowed_media_types.contains(media_type)
    }

    /// Max file size formatted for messages, e.g. `25MB`.
    pub fn max_file_size_display(&self) -> String {
        format_data_size(self.max_file_size_bytes)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}
