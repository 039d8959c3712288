//! Docgate CLI support: tracing setup, batch checking and report rendering.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use docgate_core::{ErrorMetadata, UploadPolicy};
use docgate_validation::{ValidationVerdict, Validator};
use serde::Serialize;
use tokio::task::JoinSet;

/// Initialize tracing for the CLI. Logs go to stderr so reports on stdout stay parseable.
pub fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Outcome for one file on the command line
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(flatten)]
    pub verdict: ValidationVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FileReport {
    pub fn new(path: &Path, verdict: ValidationVerdict) -> Self {
        let rejection = verdict.rejection();
        Self {
            path: path.display().to_string(),
            error_code: rejection.map(|r| r.error_code()),
            http_status: rejection.map(|r| r.http_status_code()),
            message: rejection.map(|r| r.client_message()),
            verdict,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.verdict.is_accepted()
    }
}

/// Read and validate every file concurrently. Reports come back in argument order.
/// A file over the size limit is rejected from its metadata and never read.
/// Fails only if a file cannot be read or a validation task dies.
pub async fn check_files(
    validator: &Validator,
    paths: &[PathBuf],
) -> Result<Vec<FileReport>, anyhow::Error> {
    let mut tasks = JoinSet::new();

    for (index, path) in paths.iter().enumerate() {
        let validator = validator.clone();
        let path = path.clone();
        tasks.spawn(async move {
            let size_bytes = tokio::fs::metadata(&path)
                .await
                .with_context(|| format!("Failed to read metadata for {}", path.display()))?
                .len();
            if let Err(reason) = validator.gate().check_size(size_bytes) {
                tracing::debug!(path = %path.display(), size_bytes, "Skipping read of oversized file");
                let verdict = ValidationVerdict::Rejected(reason);
                return Ok((index, FileReport::new(&path, verdict)));
            }

            let data = tokio::fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());

            tracing::debug!(path = %path.display(), size_bytes = data.len(), "Checking file");
            let verdict = validator.validate_blocking(data, filename).await?;
            Ok::<_, anyhow::Error>((index, FileReport::new(&path, verdict)))
        });
    }

    let mut reports: Vec<Option<FileReport>> = vec![None; paths.len()];
    while let Some(joined) = tasks.join_next().await {
        let (index, report) = joined.context("Validation task failed")??;
        reports[index] = Some(report);
    }

    Ok(reports.into_iter().flatten().collect())
}

pub fn render_reports_table(reports: &[FileReport]) -> String {
    let mut out = String::new();
    let accepted = reports.iter().filter(|r| r.is_accepted()).count();

    let _ = writeln!(out, "\n=== Validation Results ===\n");
    for report in reports {
        match &report.verdict {
            ValidationVerdict::Accepted(file) => {
                let _ = writeln!(
                    out,
                    "ACCEPTED  {}  ({}, {} bytes)",
                    report.path, file.media_type, file.size_bytes
                );
            }
            ValidationVerdict::Rejected(reason) => {
                let _ = writeln!(
                    out,
                    "REJECTED  {}  [{}] {}",
                    report.path,
                    reason.error_code(),
                    reason
                );
            }
        }
    }
    let _ = writeln!(
        out,
        "\nAccepted: {}  Rejected: {}",
        accepted,
        reports.len() - accepted
    );
    out
}

pub fn render_policy_table(policy: &UploadPolicy) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n=== Upload Policy ===\n");
    let _ = writeln!(
        out,
        "Max file size:        {} ({} bytes)",
        policy.max_file_size_display(),
        policy.max_file_size_bytes
    );
    let _ = writeln!(out, "Max PDF pages:        {}", policy.max_pdf_pages);
    let _ = writeln!(out, "Max image pixels:     {}", policy.max_image_pixels);
    let _ = writeln!(
        out,
        "Image dimensions:     {}..={} px",
        policy.min_image_dimension, policy.max_image_dimension
    );
    let allowed: Vec<&str> = policy
        .allowed_media_types
        .iter()
        .map(String::as_str)
        .collect();
    let _ = writeln!(out, "Allowed types:        {}", allowed.join(", "));
    out
}
