//! Core domain types for the codecache knowledge cache.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Source language tag, derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Rust,
    Java,
    Cpp,
    C,
    Shell,
    Ruby,
    Php,
    Swift,
    Kotlin,
    #[default]
    Unknown,
}

impl Language {
    /// The lowercase tag used in observations and JSON output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Java => "java",
            Self::Cpp => "cpp",
            Self::C => "c",
            Self::Shell => "shell",
            Self::Ruby => "ruby",
            Self::Php => "php",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ComponentType
// ---------------------------------------------------------------------------

/// Coarse role of a file within its project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Test,
    Documentation,
    Infrastructure,
    Configuration,
    Api,
    Model,
    Service,
    Utility,
    #[default]
    Component,
}

impl ComponentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Documentation => "documentation",
            Self::Infrastructure => "infrastructure",
            Self::Configuration => "configuration",
            Self::Api => "api",
            Self::Model => "model",
            Self::Service => "service",
            Self::Utility => "utility",
            Self::Component => "component",
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FileRecord
// ---------------------------------------------------------------------------

/// Structural summary of a single source file, produced per extraction call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Base file name.
    pub name: String,
    /// Full input path (also the cache key after sanitization).
    pub path: String,
    /// Role classification, first matching rule wins.
    pub component_type: ComponentType,
    /// Language detected from the extension.
    pub language: Language,
    /// Observations in pattern-scan order. Duplicates are kept.
    pub observations: Vec<String>,
    /// Whether non-empty content was available for scanning.
    #[serde(skip)]
    pub analyzed: bool,
}

// ---------------------------------------------------------------------------
// Cache namespaces and artifacts
// ---------------------------------------------------------------------------

/// The four independent artifact categories stored per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    Context,
    Impact,
    Violations,
    Optimization,
}

impl Namespace {
    /// Suffix used in the artifact file name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Context => "context",
            Self::Impact => "impact",
            Self::Violations => "violations",
            Self::Optimization => "optimization",
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `context` namespace artifact: a file's import and export lists.
///
/// Field order is part of the on-disk format shared with other hook tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextArtifact {
    /// The file this context describes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub file: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub imports: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exports: Vec<String>,
    /// Local time of the store call, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: String,
}

/// Other hook tools write `null` for an empty field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ContextArtifact {
    /// Build an artifact from whitespace-separated import and export text.
    pub fn from_raw(file: &str, imports: &str, exports: &str, timestamp: String) -> Self {
        Self {
            file: file.to_string(),
            imports: imports.split_whitespace().map(String::from).collect(),
            exports: exports.split_whitespace().map(String::from).collect(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::JavaScript).expect("serialize");
        assert_eq!(json, "\"javascript\"");
        assert_eq!(Language::default(), Language::Unknown);
        assert_eq!(Language::Cpp.to_string(), "cpp");
    }

    #[test]
    fn file_record_uses_hook_field_names() {
        let record = FileRecord {
            name: "user_service.py".into(),
            path: "src/user_service.py".into(),
            component_type: ComponentType::Service,
            language: Language::Python,
            observations: vec!["Defines class: UserService".into()],
            analyzed: true,
        };

        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value["componentType"], "service");
        assert_eq!(value["language"], "python");
        assert!(value.get("analyzed").is_none());
    }

    #[test]
    fn context_from_raw_splits_on_whitespace() {
        let ctx =
            ContextArtifact::from_raw("a.py", "os  sys\njson", "", "2026-01-01 00:00:00".into());
        assert_eq!(ctx.imports, vec!["os", "sys", "json"]);
        assert!(ctx.exports.is_empty());
    }

    #[test]
    fn context_tolerates_missing_fields() {
        let ctx: ContextArtifact = serde_json::from_str(r#"{"imports": ["a"]}"#).expect("parse");
        assert_eq!(ctx.imports, vec!["a"]);
        assert!(ctx.file.is_empty());
    }

    #[test]
    fn context_treats_null_as_empty() {
        let ctx: ContextArtifact =
            serde_json::from_str(r#"{"file": null, "imports": null, "exports": ["c"]}"#)
                .expect("parse");
        assert!(ctx.file.is_empty());
        assert!(ctx.imports.is_empty());
        assert_eq!(ctx.exports, vec!["c"]);
    }

    #[test]
    fn context_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/context.fixture.json")
            .expect("read fixture");
        let parsed: ContextArtifact = serde_json::from_str(&fixture).expect("deserialize fixture");
        assert_eq!(parsed.file, "src/api/routes.py");
        assert_eq!(parsed.imports, vec!["flask", "models.user"]);
        assert_eq!(parsed.exports, vec!["create_app"]);
    }
}
