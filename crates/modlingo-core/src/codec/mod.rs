//! Format-preserving codec for commented JSON localization files.
//!
//! `parse` reads a document while tolerating `//` and `/* */` comments and a
//! byte-order mark. `merge` writes updated values back into the original
//! text, leaving every untouched line byte-for-byte as it was. Both share the
//! escape-aware [`lexer`].

pub mod lexer;
mod merge;
mod parse;


pub use merge::{merge, try_merge};
pub use parse::{parse, strip_comments};

const BOM: char = '\u{feff}';

/// Drop a leading byte-order mark, if any.
pub fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix(BOM).unwrap_or(raw)
}

/// Whether `raw` starts with a byte-order mark.
#[cfg(test)]
pub(crate) fn has_bom(raw: &str) -> bool {
    raw.starts_with(BOM)
}

/// Split a leading byte-order mark from the body.
pub(crate) fn split_bom(raw: &str) -> (&str, &str) {
    let body = strip_bom(raw);
    (&raw[..raw.len() - body.len()], body)
}
