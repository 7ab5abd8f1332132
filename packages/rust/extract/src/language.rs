//! Language detection from file extensions.

use std::path::Path;

use codecache_shared::Language;

/// Detect the language of `path` from its extension (case-insensitive).
///
/// Paths without a recognised extension map to [`Language::Unknown`].
pub fn detect_language(path: &str) -> Language {
    let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) else {
        return Language::Unknown;
    };

    match ext.to_lowercase().as_str() {
        "py" => Language::Python,
        "js" | "jsx" => Language::JavaScript,
        "ts" | "tsx" => Language::TypeScript,
        "go" => Language::Go,
        "rs" => Language::Rust,
        "java" => Language::Java,
        "cpp" | "cc" | "cxx" => Language::Cpp,
        "c" => Language::C,
        "sh" | "bash" => Language::Shell,
        "rb" => Language::Ruby,
        "php" => Language::Php,
        "swift" => Language::Swift,
        "kt" => Language::Kotlin,
        _ => Language::Unknown,
    }
}
