//! Reconciling computed content with what is already on disk.

use similar::TextDiff;

/// How a file relates to the existing project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Create,
    Update { diff: String },
    Unchanged,
}

impl FileChange {
    pub fn compute(existing: Option<&str>, new: &str, from_label: &str, to_label: &str) -> Self {
        match existing {
            None => Self::Create,
            Some(old) if old == new => Self::Unchanged,
            Some(old) => Self::Update {
                diff: unified_diff(old, new, from_label, to_label),
            },
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Line diff in unified format with three lines of context.
pub fn unified_diff(old: &str, new: &str, from_label: &str, to_label: &str) -> String {
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(from_label, to_label)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_changes() {
        assert_eq!(FileChange::compute(None, "a", "x", "y"), FileChange::Create);
        assert_eq!(
            FileChange::compute(Some("a\n"), "a\n", "x", "y"),
            FileChange::Unchanged
        );
        match FileChange::compute(Some("a\nb\n"), "a\nc\n", "old", "new") {
            FileChange::Update { diff } => {
                assert!(diff.contains("--- old"));
                assert!(diff.contains("+++ new"));
                assert!(diff.contains("-b"));
                assert!(diff.contains("+c"));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }
}
