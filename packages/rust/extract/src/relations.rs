//! Module dependency scanning for import relations.

use std::sync::LazyLock;

use regex::Regex;

static FROM_IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"from\s+([^\s]+)\s+import").expect("from-import regex"));

/// Modules named in Python `from X import ...` statements, in file order.
///
/// Relative imports (`from .x import y`) are skipped.
pub fn python_import_modules(content: &str) -> Vec<String> {
    FROM_IMPORT_RE
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .filter(|module| !module.starts_with('.'))
        .collect()
}
