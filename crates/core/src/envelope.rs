// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Record description envelope.
//!
//! The external store has no schema, so typed data rides in the description
//! field: a title line, a blank line, then `key: value` lines in a fixed
//! order with `null` standing in for missing values. Parsing is lenient:
//! keys are case-folded, whitespace is trimmed, unknown keys are kept and
//! ignored by callers.

use std::collections::HashMap;

/// Sentinel written for missing values and parsed back to empty.
pub const NULL_SENTINEL: &str = "null";

/// Format a description envelope from a title and ordered fields.
///
/// `None` values emit the `null` sentinel so the key order stays fixed
/// regardless of which fields are populated.
pub fn format_envelope(title: &str, fields: &[(&str, Option<&str>)]) -> String {
    let mut out = String::with_capacity(64 + fields.len() * 24);
    out.push_str(title);
    out.push('\n');
    out.push('\n');
    for (key, value) in fields {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value.unwrap_or(NULL_SENTINEL));
        out.push('\n');
    }
    out
}

/// A leniently parsed envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEnvelope {
    pub title: String,
    fields: HashMap<String, String>,
}

impl ParsedEnvelope {
    /// Look up a field by case-folded key. `null` values come back as the
    /// empty string.
    pub fn get(&self, key: &str) -> &str {
        self.fields
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Like [`get`](Self::get) but distinguishing absent from empty.
    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.fields
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(&key.to_ascii_lowercase())
    }
}

/// Parse a description envelope.
///
/// The first line is the title; everything after the first blank line is
/// scanned for `key: value` pairs. Lines without a colon are skipped.
pub fn parse_envelope(text: &str) -> ParsedEnvelope {
    let mut lines = text.lines();
    let title = lines.next().unwrap_or("").trim().to_string();

    let mut fields = HashMap::new();
    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        if key.is_empty() || key.contains(' ') {
            continue;
        }
        let value = value.trim();
        let value = if value == NULL_SENTINEL { "" } else { value };
        fields.entry(key).or_insert_with(|| value.to_string());
    }
    ParsedEnvelope { title, fields }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
