//! Go extractor.

use std::sync::LazyLock;

use regex::Regex;

use super::ElementExtractor;

/// Matches free functions and methods; the receiver clause is skipped.
static FUNC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"func\s+(?:\([^)]*\)\s+)?(\w+)\s*\(").expect("func regex")
});

static STRUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"type\s+(\w+)\s+struct").expect("struct regex"));

static INTERFACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"type\s+(\w+)\s+interface").expect("interface regex"));

/// Extracts functions, structs, and interfaces from Go source.
pub struct GoExtractor;

impl ElementExtractor for GoExtractor {
    fn extract(&self, content: &str) -> Vec<String> {
        let mut elements: Vec<String> = FUNC_RE
            .captures_iter(content)
            .map(|caps| format!("Defines function: {}", &caps[1]))
            .collect();

        elements.extend(
            STRUCT_RE
                .captures_iter(content)
                .map(|caps| format!("Defines struct: {}", &caps[1])),
        );
        elements.extend(
            INTERFACE_RE
                .captures_iter(content)
                .map(|caps| format!("Defines interface: {}", &caps[1])),
        );

        elements
    }

    fn name(&self) -> &str {
        "go"
    }
}
