//! Legal-path enforcement for resource lookups.
//!
//! Every filesystem access that embeds a caller-influenced segment
//! (resource names, language codes, layout-set ids, page names) passes
//! through here first.

use crate::models::{FormtreeError, Result};
use std::path::{Component, Path, PathBuf};

/// Verify that `candidate` stays within `base`.
///
/// Both sides are canonicalized before comparison: symlinks are resolved
/// for the prefix that exists on disk and `.`/`..` segments are folded
/// for the rest, so a missing target can still be judged. A candidate
/// equal to the base is legal.
pub fn ensure_legal(base: &Path, candidate: &Path) -> Result<()> {
    let canonical_base = canonicalize_allow_missing(base)?;
    let canonical_candidate = canonicalize_allow_missing(candidate)?;

    if canonical_candidate.starts_with(&canonical_base) {
        Ok(())
    } else {
        Err(FormtreeError::traversal(base, candidate))
    }
}

/// Non-failing variant of [`ensure_legal`].
///
/// Used by generic lookups that answer "not found" rather than erroring
/// on bad input.
pub fn is_legal(base: &Path, candidate: &Path) -> bool {
    ensure_legal(base, candidate).is_ok()
}

/// Canonicalize a path that may not exist yet.
///
/// Components are walked left to right. A `..` applies to the real
/// directory, so the prefix built so far is resolved through the
/// filesystem before popping; a lexical pop would let `link/..` strip a
/// symlink name instead of stepping out of its target. Segments below
/// the deepest existing ancestor are kept as written.
fn canonicalize_allow_missing(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| FormtreeError::io("resolving current directory", e))?
            .join(path)
    };

    let mut folded = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(prefix) => folded.push(prefix.as_os_str()),
            Component::RootDir => folded.push(Component::RootDir.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if folded.exists() {
                    folded = std::fs::canonicalize(&folded).map_err(|e| {
                        FormtreeError::io(format!("canonicalizing {}", folded.display()), e)
                    })?;
                }
                folded.pop();
            }
            Component::Normal(name) => folded.push(name),
        }
    }

    let mut existing = folded.clone();
    let mut missing_tail = Vec::new();
    while !existing.exists() {
        match existing.file_name() {
            Some(name) => {
                missing_tail.push(name.to_os_string());
                existing = existing
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default();
            }
            None => break,
        }
    }

    let mut resolved = if existing.as_os_str().is_empty() {
        folded
    } else {
        std::fs::canonicalize(&existing)
            .map_err(|e| FormtreeError::io(format!("canonicalizing {}", existing.display()), e))?
    };

    for name in missing_tail.into_iter().rev() {
        resolved.push(name);
    }

    Ok(resolved)
}
