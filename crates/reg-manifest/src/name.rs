//! Item name validation

use crate::error::{Error, Result};

/// Validate an item name.
///
/// Names start with an ASCII alphanumeric and continue with ASCII
/// alphanumerics, `-`, `_` or `.`. A `/` is never allowed because it
/// separates a registry qualifier from an item name in install
/// specifiers.
pub fn validate_item_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(c) if !c.is_ascii_alphanumeric() => {
            return Err(invalid("must start with a letter or digit"));
        }
        Some(_) => {}
    }

    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))) {
        return Err(invalid(&format!("character '{}' is not allowed", bad)));
    }

    Ok(())
}
