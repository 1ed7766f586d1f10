//! Application manifest access: the upstream provider seam and the
//! accessor that adapts its documents into the public shape.

mod accessor;
mod source;

pub use accessor::ManifestAccessor;
pub use source::MetadataSource;
