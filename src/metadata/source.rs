//! The upstream metadata provider seam.

use crate::models::{ApplicationMetadata, MetadataError};
use async_trait::async_trait;

/// Provider of the application's metadata documents.
///
/// Implementations are injected by the hosting layer; they may cache,
/// fetch over the network or read from disk. The accessor treats every
/// call as fresh.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// The application manifest in the provider's wire shape.
    async fn fetch_application_metadata(&self) -> Result<ApplicationMetadata, MetadataError>;

    /// The application's authorization policy document.
    async fn fetch_policy_document(&self) -> Result<String, MetadataError>;

    /// The application's process definition document.
    async fn fetch_process_definition(&self) -> Result<String, MetadataError>;
}
