//! Name list files (whitelist).
//!
//! One entry per line. Entries are trimmed and lowercased so lookups can
//! compare against a lowercased endpoint name. Blank lines and lines
//! starting with `#` are ignored.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

/// Parse list text into a set of lowercased names.
pub fn parse_name_list(content: &str) -> HashSet<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_lowercase)
        .collect()
}

/// Load a name list from disk. A missing file yields an empty set.
pub fn load_name_list(path: &Path) -> std::io::Result<HashSet<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let names = parse_name_list(&content);
            tracing::info!(path = %path.display(), entries = names.len(), "Name list loaded");
            Ok(names)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Name list not found, using empty list");
            Ok(HashSet::new())
        }
        Err(e) => Err(e),
    }
}
