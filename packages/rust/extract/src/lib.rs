//! Heuristic source-file analysis for codecache.
//!
//! Builds a [`FileRecord`] for a changed file: language from the extension,
//! role from the file name, and a list of observations from per-language
//! regex scans. This is deliberately not a parser.

pub mod classify;
pub mod extractors;
pub mod language;
pub mod markers;
pub mod relations;

use std::path::Path;

use tracing::{debug, instrument};

use codecache_shared::FileRecord;

pub use classify::classify;
pub use extractors::{ElementExtractor, extract, extractor_for};
pub use language::detect_language;
pub use markers::{Marker, MarkerKind, scan_markers};
pub use relations::python_import_modules;

/// Final path component of `path`, split on `/`.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Read a source file as text, replacing invalid UTF-8.
///
/// Returns `None` when the file is missing or unreadable.
pub fn read_source(path: &str) -> Option<String> {
    match std::fs::read(Path::new(path)) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            debug!(path, error = %e, "source file not readable");
            None
        }
    }
}

/// Build the [`FileRecord`] for `path`.
///
/// When `content` is `None` the file is read from disk. Missing, unreadable,
/// or empty content yields a record with no observations and
/// `analyzed == false`; this is never an error.
#[instrument(skip(content), fields(has_content = content.is_some()))]
pub fn extract_file(path: &str, content: Option<&str>) -> FileRecord {
    let owned;
    let content = match content {
        Some(c) => c,
        None => {
            owned = read_source(path).unwrap_or_default();
            owned.as_str()
        }
    };

    let language = detect_language(path);
    let analyzed = !content.is_empty();
    let observations = if analyzed {
        extract(language, content)
    } else {
        Vec::new()
    };

    debug!(
        %language,
        observations = observations.len(),
        analyzed,
        "extracted file record"
    );

    FileRecord {
        name: base_name(path).to_string(),
        path: path.to_string(),
        component_type: classify(path),
        language,
        observations,
        analyzed,
    }
}
