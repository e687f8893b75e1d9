//! Batch note file parsing.
//!
//! # Responsibility
//! - Parse the `Project <Name> [<Type>]: <text>` batch format.
//! - Enforce the allowed entry-type set and skip invalid blocks.
//!
//! # Invariants
//! - Comment lines (leading `#`) are ignored; inline `#tags` inside note
//!   bodies are untouched here and split later by core.
//! - Entry bodies may span multiple lines up to the next `Project` header.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Project\s+(.+?)\s*\[(\w+)\]:\s*(.*)$").expect("valid header regex"));

/// Entry types accepted by the batch format, with canonical casing.
const ALLOWED_ENTRY_TYPES: &[(&str, &str)] = &[
    ("meeting", "Meeting"),
    ("legal", "Legal"),
    ("financial", "Financial"),
    ("dd", "DD"),
    ("note", "Note"),
];

/// One parsed batch block, note body still carrying inline tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub project_name: String,
    pub entry_type: String,
    pub note: String,
}

/// Parse result: accepted entries plus skip warnings for invalid blocks.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchParse {
    pub entries: Vec<BatchEntry>,
    pub warnings: Vec<String>,
}

/// Parses a batch file body into entries.
///
/// Blocks start at a `Project <Name> [<Type>]:` header and run until the
/// next header. Text before the first header is ignored. Blocks with an
/// entry type outside the allowed set are skipped with a warning.
pub fn parse_batch(content: &str) -> BatchParse {
    let mut parse = BatchParse::default();
    let mut current: Option<BatchEntry> = None;

    for line in content.lines() {
        if line.trim_start().starts_with('#') {
            continue;
        }

        if let Some(captures) = HEADER_RE.captures(line) {
            flush(&mut parse, current.take());
            current = Some(BatchEntry {
                project_name: captures[1].trim().to_string(),
                entry_type: captures[2].to_string(),
                note: captures[3].trim().to_string(),
            });
            continue;
        }

        if let Some(entry) = current.as_mut() {
            if !entry.note.is_empty() {
                entry.note.push('\n');
            }
            entry.note.push_str(line.trim_end());
        }
    }
    flush(&mut parse, current.take());

    parse
}

fn flush(parse: &mut BatchParse, entry: Option<BatchEntry>) {
    let Some(mut entry) = entry else {
        return;
    };

    entry.note = entry.note.trim().to_string();
    match canonical_entry_type(&entry.entry_type) {
        Some(canonical) => {
            entry.entry_type = canonical.to_string();
            parse.entries.push(entry);
        }
        None => parse.warnings.push(format!(
            "skipping entry for '{}': invalid entry type '{}' (allowed: meeting, legal, financial, dd, note)",
            entry.project_name, entry.entry_type
        )),
    }
}

fn canonical_entry_type(raw: &str) -> Option<&'static str> {
    let normalized = raw.trim().to_lowercase();
    ALLOWED_ENTRY_TYPES
        .iter()
        .find(|(lower, _)| *lower == normalized)
        .map(|(_, canonical)| *canonical)
}
