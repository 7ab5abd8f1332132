//! JavaScript / TypeScript extractor.

use std::sync::LazyLock;

use regex::Regex;

use super::ElementExtractor;

/// Matches `function name(`.
static FUNC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"function\s+(\w+)\s*\(").expect("function regex"));

/// Matches `const|let|var name = ... =>`, with parenthesised parameter lists
/// allowed to contain `=`.
static ARROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:const|let|var)\s+(\w+)\s*=\s*(?:\([^)]*\)|[^=])*=>").expect("arrow regex")
});

/// Matches `class Name` with an optional `extends Base`.
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class\s+(\w+)(?:\s+extends\s+\w+)?").expect("class regex"));

/// Matches default and named export declarations.
static EXPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(?:class|function|const|let|var)?\s*(\w+)")
        .expect("export regex")
});

/// Extracts functions, arrow functions, classes, and exports from
/// JavaScript and TypeScript source.
pub struct ScriptExtractor;

impl ElementExtractor for ScriptExtractor {
    fn extract(&self, content: &str) -> Vec<String> {
        let patterns: [(&Regex, &str); 4] = [
            (&FUNC_RE, "Defines function"),
            (&ARROW_RE, "Defines arrow function"),
            (&CLASS_RE, "Defines class"),
            (&EXPORT_RE, "Exports"),
        ];

        let mut elements = Vec::new();
        for (re, label) in patterns {
            for caps in re.captures_iter(content) {
                elements.push(format!("{label}: {}", &caps[1]));
            }
        }
        elements
    }

    fn name(&self) -> &str {
        "script"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Vec<String> {
        ScriptExtractor.extract(src)
    }

    #[test]
    fn component_module() {
        let src = "\
import React from 'react';
export default function App() {}
const add = (a, b) => a + b;
class Widget extends Base {}
export const VERSION = 1;
";
        assert_eq!(
            run(src),
            vec![
                "Defines function: App",
                "Defines arrow function: add",
                "Defines class: Widget",
                "Exports: App",
                "Exports: VERSION",
            ]
        );
    }

    #[test]
    fn arrow_with_default_parameter() {
        let out = run("let greet = (name = 'you') => `hi ${name}`;");
        assert_eq!(out, vec!["Defines arrow function: greet"]);
    }

    #[test]
    fn single_parameter_arrow() {
        let out = run("var double = x => x * 2;");
        assert_eq!(out, vec!["Defines arrow function: double"]);
    }

    #[test]
    fn plain_assignment_is_not_an_arrow() {
        assert!(run("const limit = 10;\nlet name = 'x';\n").is_empty());
    }

    #[test]
    fn class_without_superclass() {
        assert_eq!(run("class Store {}"), vec!["Defines class: Store"]);
    }

    #[test]
    fn named_export_list_is_ignored() {
        assert!(run("export { a, b };").is_empty());
    }
}
