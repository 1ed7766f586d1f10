//! formtree - Resolution and assembly of per-application form resources.
//!
//! ## Architecture
//!
//! formtree is a library with three surfaces:
//! - **Resource store**: stateless, path-guarded reads of layouts, texts,
//!   settings, model documents and assets from one application's tree
//! - **Manifest accessor**: adapts an injected upstream metadata provider
//!   into the application manifest served to clients
//! - **Event client**: thin async client for the remote instance-events
//!   service
//!
//! ## Guarantees
//!
//! - Every caller-influenced path segment is validated against its base
//!   directory before any read
//! - Layout models are assembled in the exact page order their settings
//!   declare; a missing page is an error, never a skip
//! - Absence of optional files (texts, settings, rule files) is a `None`
//!   result, not a failure

pub mod client;
pub mod metadata;
pub mod models;
pub mod resources;

// Re-exports for convenience
pub use client::{InstanceEvent, InstanceEventClient};
pub use metadata::{ManifestAccessor, MetadataSource};
pub use models::{
    AppConfig, Application, FormtreeError, LayoutModel, LayoutSettings, MetadataError,
    PlatformError, Result, TextResource,
};
pub use resources::ResourceStore;
