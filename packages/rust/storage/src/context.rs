//! Context summary assembly from stored artifacts.

use tracing::{debug, error};

use codecache_shared::ContextArtifact;

use crate::KnowledgeCache;

/// Read the context and impact artifacts for `path` and build its summary.
///
/// A missing, unreadable, or corrupt artifact is treated as absent. Each
/// artifact degrades on its own, so a broken impact file does not hide a
/// valid context file.
pub(crate) fn get_context(cache: &KnowledgeCache, path: &str) -> Option<String> {
    let context = match cache.load_context(path) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!(file = path, error = %e, "error reading context artifact");
            None
        }
    };

    let impact = match cache.load_impact_count(path) {
        Ok(count) => count,
        Err(e) => {
            error!(file = path, error = %e, "error reading impact artifact");
            None
        }
    };

    let summary = format_summary(context.as_ref(), impact.as_ref());
    debug!(file = path, found = summary.is_some(), "assembled context");
    summary
}

/// Build the summary lines from decoded artifacts.
///
/// Lines, in order: imports, exports, impact (only when `count > 0`).
pub fn format_summary(
    context: Option<&ContextArtifact>,
    impact_count: Option<&serde_json::Number>,
) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(ctx) = context {
        if !ctx.imports.is_empty() {
            parts.push(format!("Imports: {}", ctx.imports.join(", ")));
        }
        if !ctx.exports.is_empty() {
            parts.push(format!("Exports: {}", ctx.exports.join(", ")));
        }
    }

    if let Some(count) = impact_count {
        if count.as_f64().is_some_and(|n| n > 0.0) {
            parts.push(format!("Impact: {count} dependent files"));
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
