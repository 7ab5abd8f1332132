//! TODO / FIXME / HACK / NOTE comment markers.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of a comment marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarkerKind {
    Todo,
    Fixme,
    Hack,
    Note,
}

impl MarkerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::Fixme => "FIXME",
            Self::Hack => "HACK",
            Self::Note => "NOTE",
        }
    }

    /// Resolve the kind from the whole line, not just the matched pattern.
    fn from_line(line: &str) -> Self {
        let upper = line.to_uppercase();
        if upper.contains("FIXME") {
            Self::Fixme
        } else if upper.contains("HACK") {
            Self::Hack
        } else if upper.contains("NOTE") {
            Self::Note
        } else {
            Self::Todo
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A marker found in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub kind: MarkerKind,
    /// Text following the marker keyword.
    pub text: String,
    /// 1-based line number.
    pub line: usize,
    /// The trimmed source line.
    pub context: String,
}

/// Per-line patterns, tried in order; the first hit wins.
static MARKER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)#\s*TODO:?\s*(.+)",
        r"(?i)//\s*TODO:?\s*(.+)",
        r"(?i)/\*\s*TODO:?\s*(.+?)\*/",
        r"(?i)#\s*FIXME:?\s*(.+)",
        r"(?i)//\s*FIXME:?\s*(.+)",
        r"(?i)#\s*HACK:?\s*(.+)",
        r"(?i)//\s*HACK:?\s*(.+)",
        r"(?i)#\s*NOTE:?\s*(.+)",
        r"(?i)//\s*NOTE:?\s*(.+)",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("marker regex"))
    .collect()
});

/// Scan `content` line by line for comment markers.
pub fn scan_markers(content: &str) -> Vec<Marker> {
    let mut markers = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let Some(caps) = MARKER_PATTERNS.iter().find_map(|re| re.captures(line)) else {
            continue;
        };

        markers.push(Marker {
            kind: MarkerKind::from_line(line),
            text: caps[1].trim().to_string(),
            line: idx + 1,
            context: line.trim().to_string(),
        });
    }

    markers
}
