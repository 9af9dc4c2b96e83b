//! The seam to whatever interacts with the user.

use serde::{Deserialize, Serialize};

/// What to do when an install would change an existing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteMode {
    /// Show the diff and ask.
    #[default]
    Prompt,
    Always,
    Never,
}

/// Everything needed to present a pending overwrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverwriteRequest<'a> {
    pub old_content: &'a str,
    pub new_content: &'a str,
    pub from_label: &'a str,
    pub to_label: &'a str,
    /// Unified line diff of the two contents.
    pub diff: &'a str,
}

/// Decisions the install engine cannot make on its own.
///
/// Every method answers `None` or `false` to mean "no decision", which the
/// engine turns into an error or a skipped file.
pub trait Prompter: Send + Sync {
    /// Pick one of `registries` for an item name found in all of them.
    fn select_registry(&self, item: &str, registries: &[String]) -> Option<usize>;

    /// Install path for an item whose type has no configured path.
    fn install_path(&self, item: &str, item_type: &str) -> Option<String>;

    /// Accept or reject an overwrite.
    fn confirm_overwrite(&self, request: &OverwriteRequest<'_>) -> bool;
}

/// Declines every question.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn select_registry(&self, _item: &str, _registries: &[String]) -> Option<usize> {
        None
    }

    fn install_path(&self, _item: &str, _item_type: &str) -> Option<String> {
        None
    }

    fn confirm_overwrite(&self, _request: &OverwriteRequest<'_>) -> bool {
        false
    }
}
