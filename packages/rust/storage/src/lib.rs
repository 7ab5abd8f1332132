//! File-backed knowledge cache.
//!
//! The [`KnowledgeCache`] keeps one artifact per `(file path, namespace)` pair
//! under a single root directory:
//!
//! ```text
//! <root>/
//! ├── src_api_routes.py_context.json       (JSON, written by store_context)
//! ├── src_api_routes.py_impact.json        (raw caller text)
//! ├── src_api_routes.py_violations.json    (raw caller text)
//! └── src_api_routes.py_optimization.json  (raw caller text)
//! ```
//!
//! **Key derivation:** every `/` in the file path becomes `_`. This mapping is
//! lossy: `a/b_c` and `a_b/c` share a key and overwrite each other. The
//! layout is shared with other hook tools, so it is kept as is.
//!
//! Store calls never fail past their boundary: the `store*` methods log and
//! return `false`, and callers treat that as a cache miss.

mod context;

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{debug, error, info};

use codecache_shared::{CacheConfig, CodeCacheError, ContextArtifact, Namespace, Result};

pub use context::format_summary;

/// Timestamp format recorded in context artifacts.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Handle on a knowledge cache directory.
#[derive(Debug, Clone)]
pub struct KnowledgeCache {
    root: PathBuf,
}

impl KnowledgeCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            root: config.root.clone(),
        }
    }

    /// Open a cache rooted at `root` directly.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Sanitized key for `path`: every `/` replaced by `_`.
    pub fn cache_key(path: &str) -> String {
        path.replace('/', "_")
    }

    /// Location of the artifact for `path` in `namespace`.
    pub fn artifact_path(&self, namespace: Namespace, path: &str) -> PathBuf {
        self.root.join(format!("{}_{}.json", Self::cache_key(path), namespace))
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Write `payload` as the artifact for `(namespace, path)`, replacing any
    /// previous content. Creates the root directory when missing.
    pub fn try_store(&self, namespace: Namespace, path: &str, payload: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root).map_err(|e| CodeCacheError::io(&self.root, e))?;

        let target = self.artifact_path(namespace, path);
        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = self.root.join(format!(".{file_name}.tmp"));

        std::fs::write(&temp, payload).map_err(|e| CodeCacheError::io(&temp, e))?;
        if let Err(e) = std::fs::rename(&temp, &target) {
            let _ = std::fs::remove_file(&temp);
            return Err(CodeCacheError::io(&target, e));
        }

        debug!(path = %target.display(), bytes = payload.len(), "wrote artifact");
        Ok(target)
    }

    /// Store `payload` and report success. Failures are logged, never raised.
    pub fn store(&self, namespace: Namespace, path: &str, payload: &str) -> bool {
        match self.try_store(namespace, path, payload) {
            Ok(_) => {
                info!(file = path, "stored {}", describe(namespace));
                true
            }
            Err(e) => {
                error!(file = path, error = %e, "error storing {}", describe(namespace));
                false
            }
        }
    }

    /// Serialize and store a context artifact.
    pub fn try_store_context(&self, path: &str, context: &ContextArtifact) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(context)?;
        self.try_store(Namespace::Context, path, &json)
    }

    pub fn store_context(&self, path: &str, context: &ContextArtifact) -> bool {
        match self.try_store_context(path, context) {
            Ok(_) => {
                info!(file = path, "stored context");
                true
            }
            Err(e) => {
                error!(file = path, error = %e, "error storing context");
                false
            }
        }
    }

    /// Store whitespace-separated import and export text as the file's
    /// context, stamped with the current local time.
    pub fn store_file_context(&self, path: &str, imports: &str, exports: &str) -> bool {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let context = ContextArtifact::from_raw(path, imports, exports, timestamp);
        self.store_context(path, &context)
    }

    /// Store raw dependency-impact data. The assembler reads its `count` field.
    pub fn store_impact(&self, path: &str, impact_data: &str) -> bool {
        self.store(Namespace::Impact, path, impact_data)
    }

    pub fn store_violations(&self, path: &str, pattern_data: &str) -> bool {
        self.store(Namespace::Violations, path, pattern_data)
    }

    pub fn store_optimization(&self, path: &str, metrics_data: &str) -> bool {
        self.store(Namespace::Optimization, path, metrics_data)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Raw artifact text, or `None` when no artifact exists.
    pub fn read(&self, namespace: Namespace, path: &str) -> Result<Option<String>> {
        let target = self.artifact_path(namespace, path);
        match std::fs::read_to_string(&target) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CodeCacheError::io(target, e)),
        }
    }

    /// Decode the context artifact for `path`.
    pub fn load_context(&self, path: &str) -> Result<Option<ContextArtifact>> {
        match self.read(Namespace::Context, path)? {
            Some(content) => Ok(Some(serde_json::from_str(&content)?)),
            None => Ok(None),
        }
    }

    /// The `count` field of the impact artifact for `path`.
    pub fn load_impact_count(&self, path: &str) -> Result<Option<serde_json::Number>> {
        let Some(content) = self.read(Namespace::Impact, path)? else {
            return Ok(None);
        };

        let value: serde_json::Value = serde_json::from_str(&content)?;
        match value.get("count") {
            None => Ok(None),
            Some(serde_json::Value::Number(n)) => Ok(Some(n.clone())),
            Some(other) => Err(CodeCacheError::validation(format!(
                "impact count is not a number: {other}"
            ))),
        }
    }

    /// Assemble the human-readable context summary for `path`.
    ///
    /// Returns `None` both when nothing is stored and when the stored
    /// artifacts have nothing to report.
    pub fn get_context(&self, path: &str) -> Option<String> {
        context::get_context(self, path)
    }
}

/// Phrase used in store log lines.
fn describe(namespace: Namespace) -> &'static str {
    match namespace {
        Namespace::Context => "context",
        Namespace::Impact => "impact analysis",
        Namespace::Violations => "pattern violations",
        Namespace::Optimization => "optimization metrics",
    }
}
