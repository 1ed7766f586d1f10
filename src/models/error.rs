//! Error types for formtree.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for formtree.
#[derive(Debug, Error)]
pub enum FormtreeError {
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Path escapes its base directory: {path} is not under {base}")]
    Traversal { base: PathBuf, path: PathBuf },

    #[error("Resource not found: {0}")]
    NotFound(PathBuf),

    #[error("No page order defined for layout set '{layout_set}'")]
    MissingOrder { layout_set: String },

    #[error("Page '{page}' is listed in the page order but has no layout file")]
    MissingPage { page: String },

    #[error("Page '{page}' parsed to an empty document")]
    EmptyDocument { page: String },

    #[error("Page '{page}' is not a valid layout document: {source}")]
    InvalidDocument {
        page: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Application metadata error: {0}")]
    Metadata(#[from] MetadataError),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures when fetching documents from the upstream metadata provider.
///
/// The two variants separate "could not reach the provider" from "the
/// provider answered with something unusable", so callers can tell an
/// outage from a broken deployment.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Metadata provider unavailable: {source}")]
    UpstreamUnavailable {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Metadata provider returned a malformed document: {source}")]
    UpstreamMalformed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl MetadataError {
    /// Tag a transport-level failure as an unavailable upstream.
    pub fn unavailable(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UpstreamUnavailable {
            source: Box::new(source),
        }
    }

    /// Tag a decode-level failure as a malformed upstream document.
    pub fn malformed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::UpstreamMalformed {
            source: Box::new(source),
        }
    }
}

/// Errors from the instance-event service client.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Events API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl FormtreeError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create a traversal error for a candidate path rejected against a base.
    pub fn traversal(base: impl Into<PathBuf>, path: impl Into<PathBuf>) -> Self {
        Self::Traversal {
            base: base.into(),
            path: path.into(),
        }
    }
}

/// Result type alias for formtree.
pub type Result<T> = std::result::Result<T, FormtreeError>;
