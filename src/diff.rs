//! Diff generation for previewing a rewrite.

use similar::{ChangeTag, TextDiff};
use std::fmt::Write;
use std::path::Path;

// ANSI color codes
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Generates a unified diff between two strings.
pub fn unified_diff(original: &str, modified: &str, path: &Path) -> String {
    render(original, modified, path, false)
}

/// Unified diff with ANSI colors for terminal display.
pub fn colorized_diff(original: &str, modified: &str, path: &Path) -> String {
    render(original, modified, path, true)
}

fn render(original: &str, modified: &str, path: &Path, color: bool) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let (header, reset) = if color { (CYAN, RESET) } else { ("", "") };
    let mut output = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(output, "{header}--- a/{}{reset}", path.display());
    let _ = writeln!(output, "{header}+++ b/{}{reset}", path.display());

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, tint) = match change.tag() {
                    ChangeTag::Delete => ("-", RED),
                    ChangeTag::Insert => ("+", GREEN),
                    ChangeTag::Equal => (" ", ""),
                };

                if color && !tint.is_empty() {
                    let _ = write!(output, "{tint}{sign}{}{RESET}", change.value());
                } else {
                    let _ = write!(output, "{sign}{}", change.value());
                }
            }
        }
    }

    output
}

/// Line counts of a rewrite.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DiffSummary {
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    /// Creates a summary from original and modified content.
    pub fn from_diff(original: &str, modified: &str) -> Self {
        let diff = TextDiff::from_lines(original, modified);
        let mut summary = Self::default();

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => summary.insertions += 1,
                ChangeTag::Delete => summary.deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        summary
    }

    pub fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }
}

impl std::fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} insertions(+), {} deletions(-)",
            self.insertions, self.deletions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unified_diff_marks_inserted_docstring() {
        let original = "class A(Base):\n    x = 1\n";
        let modified = "class A(ModelBase):\n    \"\"\"Doc.\"\"\"\n    x = 1\n";

        let diff = unified_diff(original, modified, Path::new("model.py"));
        assert!(diff.starts_with("--- a/model.py\n+++ b/model.py\n"));
        assert!(diff.contains("-class A(Base):\n"));
        assert!(diff.contains("+class A(ModelBase):\n"));
        assert!(diff.contains("+    \"\"\"Doc.\"\"\"\n"));
        assert!(diff.contains("     x = 1\n"));
    }

    #[test]
    fn test_colorized_diff_uses_ansi() {
        let diff = colorized_diff("a\n", "b\n", Path::new("m.py"));
        assert!(diff.contains(RED));
        assert!(diff.contains(GREEN));
    }

    #[test]
    fn test_summary_counts() {
        let summary = DiffSummary::from_diff("a\nb\n", "a\nc\nd\n");
        assert_eq!(summary.insertions, 2);
        assert_eq!(summary.deletions, 1);
        assert_eq!(summary.to_string(), "2 insertions(+), 1 deletions(-)");
        assert!(DiffSummary::from_diff("same\n", "same\n").is_empty());
    }
}
