//! Per-language element extractors.
//!
//! Each extractor runs a fixed list of regex patterns over the whole file, one
//! pass per pattern, in declared order. The output is advisory text for
//! humans, so false positives and misses are acceptable; the pattern order
//! is not, since it fixes the order of observations.

mod go;
mod python;
mod script;

use codecache_shared::Language;

pub use go::GoExtractor;
pub use python::PythonExtractor;
pub use script::ScriptExtractor;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Pattern-based extraction of code elements for one language family.
pub trait ElementExtractor: Send + Sync {
    /// Scan `content` and return observations in pattern order.
    fn extract(&self, content: &str) -> Vec<String>;

    /// Human-readable extractor name for tracing.
    fn name(&self) -> &str;
}

/// Fallback for languages without registered patterns.
pub struct NoopExtractor;

impl ElementExtractor for NoopExtractor {
    fn extract(&self, _content: &str) -> Vec<String> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "noop"
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Map a language to its extractor. Always returns one; unsupported
/// languages get [`NoopExtractor`].
pub fn extractor_for(language: Language) -> &'static dyn ElementExtractor {
    match language {
        Language::Python => &PythonExtractor,
        Language::JavaScript | Language::TypeScript => &ScriptExtractor,
        Language::Go => &GoExtractor,
        Language::Rust
        | Language::Java
        | Language::Cpp
        | Language::C
        | Language::Shell
        | Language::Ruby
        | Language::Php
        | Language::Swift
        | Language::Kotlin
        | Language::Unknown => &NoopExtractor,
    }
}

/// Extract observations from `content` using the extractor for `language`.
pub fn extract(language: Language, content: &str) -> Vec<String> {
    let extractor = extractor_for(language);
    let elements = extractor.extract(content);
    tracing::trace!(
        extractor = extractor.name(),
        count = elements.len(),
        "extracted elements"
    );
    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_languages_share_an_extractor() {
        assert_eq!(extractor_for(Language::JavaScript).name(), "script");
        assert_eq!(extractor_for(Language::TypeScript).name(), "script");
    }

    #[test]
    fn unsupported_languages_fall_back_to_noop() {
        for lang in [Language::Rust, Language::Java, Language::Unknown] {
            assert_eq!(extractor_for(lang).name(), "noop");
        }
        assert!(extract(Language::Rust, "fn main() {}\nstruct Foo;").is_empty());
    }

    #[test]
    fn content_without_constructs_is_empty_for_every_language() {
        let plain = "just some prose\nwith two lines\n";
        for lang in [
            Language::Python,
            Language::JavaScript,
            Language::TypeScript,
            Language::Go,
            Language::Unknown,
        ] {
            assert!(extract(lang, plain).is_empty(), "{lang} produced output");
            assert!(extract(lang, "").is_empty(), "{lang} produced output on empty");
        }
    }
}
