//! Manifest access over an injected metadata source.

use crate::metadata::MetadataSource;
use crate::models::{Application, MetadataError};
use std::sync::Arc;
use tracing::warn;

/// Adapts the upstream metadata documents into the shapes served to
/// clients.
///
/// Holds no state beyond the source handle; every call fetches fresh.
/// Caching, when wanted, belongs in the injected source.
pub struct ManifestAccessor {
    source: Arc<dyn MetadataSource>,
}

impl ManifestAccessor {
    /// Create an accessor over the given source.
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source }
    }

    /// The application manifest in the public shape.
    ///
    /// A failing fetch propagates as [`MetadataError`], tagged as an
    /// unavailable or malformed upstream with the cause attached.
    pub async fn get_application(&self) -> Result<Application, MetadataError> {
        let metadata = self.source.fetch_application_metadata().await?;
        Ok(Application::from(metadata))
    }

    /// The authorization policy document.
    ///
    /// Policy documents are optional at this layer; a failing fetch is
    /// logged and answered with `None`.
    pub async fn get_policy_document(&self) -> Option<String> {
        match self.source.fetch_policy_document().await {
            Ok(policy) => Some(policy),
            Err(e) => {
                warn!(error = %e, "policy document unavailable");
                None
            }
        }
    }

    /// The process definition document.
    ///
    /// Same degrade policy as [`get_policy_document`](Self::get_policy_document).
    pub async fn get_process_definition(&self) -> Option<String> {
        match self.source.fetch_process_definition().await {
            Ok(process) => Some(process),
            Err(e) => {
                warn!(error = %e, "process definition unavailable");
                None
            }
        }
    }

    /// The model class bound to a data type, or an empty string when
    /// the type is unknown or carries no binding.
    ///
    /// This is a lookup, not a failure path; callers check for the
    /// empty string themselves.
    pub fn class_ref_for_data_type(application: &Application, data_type_id: &str) -> String {
        application.class_ref_for(data_type_id)
    }
}
