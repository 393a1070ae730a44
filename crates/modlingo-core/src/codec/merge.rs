use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use super::lexer::{scan_lines, RawLine, Token, TokenKind};
use crate::document::LocalizationDocument;
use crate::error::ModlingoError;

/// Location of a non-comment token: line index and token index in that line.
#[derive(Debug, Clone, Copy)]
struct At {
    line: usize,
    tok: usize,
}

/// Byte-range replacement within one line.
#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    text: String,
}

/// Write `updated` back into `original_raw`, touching only changed values.
///
/// Falls back to a plain four-space-indented object if the line merge fails.
pub fn merge(updated: &LocalizationDocument, original_raw: &str) -> String {
    match try_merge(updated, original_raw) {
        Ok(text) => text,
        Err(e) => {
            warn!("codec: line merge failed, writing plain object instead: {e}");
            updated.to_pretty_json()
        }
    }
}

/// Line-oriented merge.
///
/// For each top-level `"key": value` whose key is in `updated` and whose value
/// differs, only the value token is replaced; indentation, separators and
/// same-line comments stay as written. A comma after a rewritten value is kept
/// only when another member follows before the closing brace. Members whose
/// value is an object or array, or starts on a later line, are left alone.
/// Keys absent from the original text are not added.
pub fn try_merge(
    updated: &LocalizationDocument,
    original_raw: &str,
) -> Result<String, ModlingoError> {
    let (bom, body) = super::split_bom(original_raw);
    let lines = scan_lines(body);
    let sig = significant_tokens(&lines);
    let mut edits: BTreeMap<usize, Vec<Edit>> = BTreeMap::new();

    for k in 0..sig.len() {
        let key_at = sig[k];
        let key_tok = token(&lines, key_at);
        if key_tok.depth != 1 || !key_tok.is_string() || !is_punct_at(&lines, &sig, k + 1, ':') {
            continue;
        }
        let Some(&value_at) = sig.get(k + 2) else {
            continue;
        };

        let key_text = key_tok.text(lines[key_at.line].text);
        let key: String = serde_json::from_str(key_text).map_err(|e| {
            ModlingoError::Parse(format!(
                "line {}: cannot decode key {key_text}: {e}",
                key_at.line + 1
            ))
        })?;
        let Some(new_value) = updated.get(&key) else {
            continue;
        };
        if value_at.line != key_at.line {
            continue;
        }

        let value_tok = token(&lines, value_at);
        match value_tok.kind {
            TokenKind::String { terminated: false } => {
                return Err(ModlingoError::Parse(format!(
                    "line {}: unterminated string for key {key}",
                    value_at.line + 1
                )));
            }
            TokenKind::String { .. } | TokenKind::Bare => {}
            _ => continue,
        }

        let old_text = value_tok.text(lines[value_at.line].text);
        if serde_json::from_str::<Value>(old_text).ok().as_ref() == Some(new_value) {
            continue;
        }

        let line_edits = edits.entry(value_at.line).or_default();
        line_edits.push(Edit {
            start: value_tok.start,
            end: value_tok.end,
            text: serde_json::to_string(new_value)?,
        });

        if let Some(&comma_at) = sig.get(k + 3) {
            let comma = token(&lines, comma_at);
            if comma.is_punct(',') && comma_at.line == value_at.line && !starts_member(&lines, &sig, k + 4)
            {
                line_edits.push(Edit {
                    start: comma.start,
                    end: comma.end,
                    text: String::new(),
                });
            }
        }
    }

    let mut out = String::with_capacity(original_raw.len() + 64);
    out.push_str(bom);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        match edits.remove(&i) {
            None => out.push_str(line.text),
            Some(mut list) => {
                list.sort_by_key(|e| e.start);
                let mut cursor = 0;
                for e in list {
                    out.push_str(&line.text[cursor..e.start]);
                    out.push_str(&e.text);
                    cursor = e.end;
                }
                out.push_str(&line.text[cursor..]);
            }
        }
    }

    // Never hand back text that would fail to load again.
    super::parse(&out)?;
    Ok(out)
}

fn significant_tokens(lines: &[RawLine<'_>]) -> Vec<At> {
    lines
        .iter()
        .enumerate()
        .flat_map(|(line, raw)| {
            raw.tokens
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.is_comment())
                .map(move |(tok, _)| At { line, tok })
        })
        .collect()
}

fn token<'l>(lines: &'l [RawLine<'_>], at: At) -> &'l Token {
    &lines[at.line].tokens[at.tok]
}

fn is_punct_at(lines: &[RawLine<'_>], sig: &[At], idx: usize, c: char) -> bool {
    sig.get(idx)
        .map(|&at| token(lines, at).is_punct(c))
        .unwrap_or(false)
}

/// Whether `sig[idx]` opens another `"key":` member.
fn starts_member(lines: &[RawLine<'_>], sig: &[At], idx: usize) -> bool {
    sig.get(idx)
        .map(|&at| token(lines, at).is_string())
        .unwrap_or(false)
        && is_punct_at(lines, sig, idx + 1, ':')
}
