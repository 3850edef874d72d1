//! Download filename derivation from the poster's name field.
//!
//! Whitespace runs become a single `_`, characters that are unsafe in file
//! names on common filesystems are dropped, and an empty result falls back to
//! the configured default stem:
//!
//! - `"Ava Chen"` → `Ava_Chen.jpg`
//! - `"  José   María "` → `José_María.jpg`
//! - `"a/b:c"` → `abc.jpg`
//! - `""` → `poster.jpg`

use crate::imaging::ExportFormat;

/// Characters rejected by at least one mainstream filesystem.
const UNSAFE: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitized filename stem for `name`, or `None` when nothing usable remains.
pub fn sanitize_stem(name: &str) -> Option<String> {
    let mut stem = String::with_capacity(name.len());
    let mut pending_gap = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            pending_gap = true;
            continue;
        }
        if ch.is_control() || UNSAFE.contains(&ch) {
            continue;
        }
        if pending_gap && !stem.is_empty() {
            stem.push('_');
        }
        pending_gap = false;
        stem.push(ch);
    }
    // Leading dots would make hidden files
    let stem = stem.trim_start_matches('.');
    (!stem.is_empty()).then(|| stem.to_string())
}

/// Full download filename: sanitized stem (or `default_stem`) plus extension.
pub fn download_filename(name: &str, default_stem: &str, format: ExportFormat) -> String {
    let stem = sanitize_stem(name).unwrap_or_else(|| default_stem.to_string());
    format!("{stem}.{}", format.extension())
}
