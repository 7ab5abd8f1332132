//! Python extractor.

use std::sync::LazyLock;

use regex::Regex;

use super::ElementExtractor;

/// Matches `class Name:` and `class Name(Base):`.
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class\s+(\w+)(?:\([^)]*\))?:").expect("class regex"));

/// Matches `def name(args):`.
static FUNC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"def\s+(\w+)\s*\([^)]*\):").expect("def regex"));

/// Matches `import x` and `from m import x`; group 1 is the module when present.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:from\s+(\S+)\s+)?import\s+([^\n]+)").expect("import regex")
});

/// Names starting with this prefix are private and not reported.
const PRIVATE_PREFIX: char = '_';

/// Extracts classes, public functions, and imports from Python source.
pub struct PythonExtractor;

impl ElementExtractor for PythonExtractor {
    fn extract(&self, content: &str) -> Vec<String> {
        let mut elements = Vec::new();

        for caps in CLASS_RE.captures_iter(content) {
            elements.push(format!("Defines class: {}", &caps[1]));
        }

        for caps in FUNC_RE.captures_iter(content) {
            let name = &caps[1];
            if !name.starts_with(PRIVATE_PREFIX) {
                elements.push(format!("Defines function: {name}"));
            }
        }

        for caps in IMPORT_RE.captures_iter(content) {
            let items = &caps[2];
            match caps.get(1) {
                Some(module) => {
                    elements.push(format!("Imports from {}: {items}", module.as_str()))
                }
                None => elements.push(format!("Imports: {items}")),
            }
        }

        elements
    }

    fn name(&self) -> &str {
        "python"
    }
}
