//! Validation orchestrator
//!
//! Runs the fixed, short-circuiting sequence
//! presence → size → type detection → allow-list → structural parse → format policy
//! and returns exactly one verdict. Size is checked before anything looks at the content
//! so oversized input never reaches a parser, and the detected type alone decides which
//! inspector (at most one) runs.

use std::sync::Arc;

use docgate_core::{ErrorMetadata, LogLevel, UploadPolicy};

use crate::document::LopdfInspector;
use crate::image::HeaderImageInspector;
use crate::metadata::StructuralMetadata;
use crate::policy::PolicyGate;
use crate::sniff::{self, DetectedType, MediaKind};
use crate::traits::{ImageInspector, InspectionError, PdfInspector};
use crate::verdict::{AcceptedFile, RejectionReason, ValidationVerdict};

/// File validator
///
/// Cheap to clone; the policy and inspectors are shared behind `Arc`, and nothing is
/// mutated after construction, so one instance can serve concurrent requests.
#[derive(Clone)]
pub struct Validator {
    gate: PolicyGate,
    pdf_inspector: Arc<dyn PdfInspector>,
    image_inspector: Arc<dyn ImageInspector>,
}

impl Validator {
    /// Create a validator with the default inspectors. Fails if the policy is invalid.
    pub fn new(policy: UploadPolicy) -> Result<Self, anyhow::Error> {
        Self::with_inspectors(
            policy,
            Arc::new(LopdfInspector::new()),
            Arc::new(HeaderImageInspector::new()),
        )
    }

    /// Create a validator with custom inspectors. Fails if the policy is invalid.
    pub fn with_inspectors(
        policy: UploadPolicy,
        pdf_inspector: Arc<dyn PdfInspector>,
        image_inspector: Arc<dyn ImageInspector>,
    ) -> Result<Self, anyhow::Error> {
        policy.validate()?;
        Ok(Self::from_parts(
            Arc::new(policy),
            pdf_inspector,
            image_inspector,
        ))
    }

    fn from_parts(
        policy: Arc<UploadPolicy>,
        pdf_inspector: Arc<dyn PdfInspector>,
        image_inspector: Arc<dyn ImageInspector>,
    ) -> Self {
        Self {
            gate: PolicyGate::new(policy),
            pdf_inspector,
            image_inspector,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        self.gate.policy()
    }

    pub fn gate(&self) -> &PolicyGate {
        &self.gate
    }

    /// Validate a candidate file. The filename is only a hint for text sniffing.
    pub fn validate(&self, data: &[u8], filename_hint: Option<&str>) -> ValidationVerdict {
        let size_bytes = data.len() as u64;

        match self.run(data, filename_hint) {
            Ok(accepted) => {
                tracing::debug!(
                    size_bytes,
                    detected_type = %accepted.media_type,
                    "File accepted"
                );
                ValidationVerdict::Accepted(accepted)
            }
            Err(reason) => {
                log_rejection(&reason, size_bytes);
                ValidationVerdict::Rejected(reason)
            }
        }
    }

    /// Validate on tokio's blocking pool. Parsing is CPU-bound; keep it off the async
    /// workers. Errors only if the blocking task itself could not complete.
    pub async fn validate_blocking(
        &self,
        data: Vec<u8>,
        filename_hint: Option<String>,
    ) -> Result<ValidationVerdict, anyhow::Error> {
        let validator = self.clone();
        let verdict = tokio::task::spawn_blocking(move || {
            validator.validate(&data, filename_hint.as_deref())
        })
        .await?;
        Ok(verdict)
    }

    fn run(
        &self,
        data: &[u8],
        filename_hint: Option<&str>,
    ) -> Result<AcceptedFile, RejectionReason> {
        // Start → SizeChecked
        self.gate.check_presence(data)?;
        self.gate.check_size(data.len() as u64)?;

        // SizeChecked → TypeDetected → AllowListChecked
        let detected = sniff::detect(data, filename_hint);
        tracing::debug!(detected_type = %detected, "Detected media type");
        self.gate.check_allowed_type(&detected)?;

        // AllowListChecked → StructurallyValidated
        let metadata = self.inspect(data, &detected)?;

        // StructurallyValidated → Accepted
        match &metadata {
            StructuralMetadata::Pdf(pdf) => self.gate.check_pdf_policy(pdf)?,
            StructuralMetadata::Image(image) => self.gate.check_image_policy(image)?,
        }

        Ok(AcceptedFile {
            media_type: detected,
            size_bytes: data.len() as u64,
        })
    }

    /// Route to exactly one inspector based on the detected type
    fn inspect(
        &self,
        data: &[u8],
        detected: &DetectedType,
    ) -> Result<StructuralMetadata, RejectionReason> {
        let result = match detected.kind() {
            MediaKind::Pdf => self.pdf_inspector.inspect(data).map(StructuralMetadata::Pdf),
            MediaKind::Raster(format) => self
                .image_inspector
                .inspect(data, format)
                .map(StructuralMetadata::Image),
            // Unreachable with a validated policy: every allowed type has an inspector
            MediaKind::Other => {
                return Err(RejectionReason::UnsupportedType {
                    detected: detected.to_string(),
                    allowed: self.policy().allowed_media_types.iter().cloned().collect(),
                })
            }
        };

        result.map_err(|err| corrupt(detected, err))
    }
}

/// Validate `data` against `policy` with the default inspectors.
///
/// The policy is trusted as given; build a [`Validator`] once at startup to have it
/// checked for consistency.
pub fn validate(
    data: &[u8],
    filename_hint: Option<&str>,
    policy: &UploadPolicy,
) -> ValidationVerdict {
    Validator::from_parts(
        Arc::new(policy.clone()),
        Arc::new(LopdfInspector::new()),
        Arc::new(HeaderImageInspector::new()),
    )
    .validate(data, filename_hint)
}

fn corrupt(detected: &DetectedType, err: InspectionError) -> RejectionReason {
    RejectionReason::UnreadableOrCorrupt {
        media_type: detected.to_string(),
        detail: err.to_string(),
    }
}

fn log_rejection(reason: &RejectionReason, size_bytes: u64) {
    let error_code = reason.error_code();
    let stage = reason.stage();
    match (reason.log_level(), reason) {
        (_, RejectionReason::UnreadableOrCorrupt { media_type, detail }) => {
            tracing::warn!(
                error_code,
                ?stage,
                size_bytes,
                detected_type = %media_type,
                detail = %detail,
                "File failed validation"
            );
        }
        (LogLevel::Error, _) => {
            tracing::error!(error_code, ?stage, size_bytes, reason = %reason, "File failed validation");
        }
        (LogLevel::Warn, _) => {
            tracing::warn!(error_code, ?stage, size_bytes, reason = %reason, "File failed validation");
        }
        (LogLevel::Debug, _) => {
            tracing::debug!(error_code, ?stage, size_bytes, reason = %reason, "File failed validation");
        }
    }
}
