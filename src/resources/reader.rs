//! Raw file reads with absence tolerance.

use crate::models::{FormtreeError, Result};
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Read a file's bytes, treating a missing target as absence.
///
/// `Ok(None)` covers both "no such file" and "target is a directory";
/// any other failure propagates. No validation, no caching.
pub fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
    if path.is_dir() {
        debug!(path = %path.display(), "resource path is a directory, treating as absent");
        return Ok(None);
    }

    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "resource file absent");
            Ok(None)
        }
        Err(e) => Err(FormtreeError::io(format!("reading {}", path.display()), e)),
    }
}

/// Read a file as UTF-8 text, treating a missing target as absence.
///
/// A leading byte-order mark is dropped, so the result can go straight
/// into a parser.
pub fn read_text(path: &Path) -> Result<Option<String>> {
    if path.is_dir() {
        debug!(path = %path.display(), "resource path is a directory, treating as absent");
        return Ok(None);
    }

    match std::fs::read_to_string(path) {
        Ok(mut text) => {
            if text.starts_with('\u{feff}') {
                text.remove(0);
            }
            Ok(Some(text))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "resource file absent");
            Ok(None)
        }
        Err(e) => Err(FormtreeError::io(format!("reading {}", path.display()), e)),
    }
}

/// Strip a UTF-8 byte-order mark if present.
pub fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}
