pub mod fixtures;

use std::collections::BTreeSet;

use docgate_core::UploadPolicy;

/// Default policy with the given allow-list
pub fn policy_allowing(media_types: &[&str]) -> UploadPolicy {
    UploadPolicy {
        allowed_media_types: media_types
            .iter()
            .map(|s| s.to_string())
            .collect::<BTreeSet<_>>(),
        ..UploadPolicy::default()
    }
}
