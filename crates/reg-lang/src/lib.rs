//! Per-language import extraction for regkit.
//!
//! The build engine never parses source code itself. It asks a
//! [`LanguageResolver`] for the literal references in a file, then decides
//! what each reference points at using [`search::resolve_local`] and a
//! [`PathAliasMatcher`]. At install time the same resolver renders the
//! rewritten import text for the templates it produced.

pub mod alias;
pub mod error;
pub mod js;
pub mod resolver;
pub mod search;

pub use alias::PathAliasMatcher;
pub use error::{Error, Result};
pub use js::JsResolver;
pub use resolver::{LanguageResolver, Reference, ReferenceKind, ReferenceList, Resolvers};
pub use search::{LocalMatch, MatchKind, resolve_local};
