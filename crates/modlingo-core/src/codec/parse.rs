use serde_json::Value;

use super::lexer::{scan_lines, Token};
use crate::document::LocalizationDocument;
use crate::error::ModlingoError;

/// Parse a commented JSON document into an ordered key/value mapping.
///
/// Comments and a leading byte-order mark are removed; the remainder must be
/// a valid JSON object. Malformed input is reported, never patched up.
pub fn parse(raw: &str) -> Result<LocalizationDocument, ModlingoError> {
    let cleaned = strip_comments(super::strip_bom(raw));
    if cleaned.is_empty() {
        return Err(ModlingoError::Parse("document is empty".into()));
    }

    let value: Value = serde_json::from_str(&cleaned)
        .map_err(|e| ModlingoError::Parse(format!("invalid JSON after comment removal: {e}")))?;

    match value {
        Value::Object(map) => Ok(LocalizationDocument::from_map(map)),
        other => Err(ModlingoError::Parse(format!(
            "expected a top-level object, found {}",
            json_type_name(&other)
        ))),
    }
}

/// Remove every comment, then drop lines left empty.
pub fn strip_comments(text: &str) -> String {
    let mut kept = Vec::new();
    for line in scan_lines(text) {
        let comments: Vec<&Token> = line.tokens.iter().filter(|t| t.is_comment()).collect();
        let cleaned = if comments.is_empty() {
            line.text.trim().to_string()
        } else {
            let mut buf = String::with_capacity(line.text.len());
            let mut cursor = 0;
            for c in comments {
                buf.push_str(&line.text[cursor..c.start]);
                buf.push(' ');
                cursor = c.end;
            }
            buf.push_str(&line.text[cursor..]);
            buf.trim().to_string()
        };
        if !cleaned.is_empty() {
            kept.push(cleaned);
        }
    }
    kept.join("\n")
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
