//! Import text substitution.
//!
//! Rewriting is purely textual: every quoted occurrence of an import
//! literal is replaced, keeping its quote character. The file is never
//! re-parsed.

use std::collections::HashMap;

use regex::{Captures, Regex};

/// Replace one import literal with another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRewrite {
    pub from: String,
    pub to: String,
}

impl ImportRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Apply every rewrite in a single pass, so a replacement is never
/// rewritten again by a later entry.
pub fn rewrite_imports(content: &str, rewrites: &[ImportRewrite]) -> String {
    let table: HashMap<&str, &str> = rewrites
        .iter()
        .filter(|r| r.from != r.to)
        .map(|r| (r.from.as_str(), r.to.as_str()))
        .collect();
    if table.is_empty() {
        return content.to_string();
    }

    let mut literals: Vec<&str> = table.keys().copied().collect();
    literals.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = literals
        .iter()
        .map(|l| regex::escape(l))
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(r#""(?:{0})"|'(?:{0})'|`(?:{0})`"#, alternation);

    // Only the compiled size limit can reject an escaped alternation.
    let Ok(re) = Regex::new(&pattern) else {
        tracing::warn!(rewrites = table.len(), "import rewrite pattern rejected");
        return content.to_string();
    };

    re.replace_all(content, |caps: &Captures<'_>| {
        let quoted = &caps[0];
        let quote = &quoted[..1];
        let literal = &quoted[1..quoted.len() - 1];
        match table.get(literal) {
            Some(to) => format!("{quote}{to}{quote}"),
            None => quoted.to_string(),
        }
    })
    .into_owned()
}
