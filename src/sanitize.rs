// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - File name sanitization for note files

/// Characters rejected by at least one common filesystem. Control characters are
/// rejected separately.
const ILLEGAL_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Extension appended when the user supplies none.
pub const DEFAULT_EXTENSION: &str = ".txt";

/// Normalize a user-supplied name into a safe file base name.
///
/// Only the last path segment survives, illegal characters become `_`, and a
/// `.txt` extension is added when the name has none. An empty result means
/// "no valid name" and must never be used as a file.
pub fn sanitize(raw: &str) -> String {
    let trimmed = raw.trim();
    let last_segment = trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if last_segment.is_empty() {
        return String::new();
    }

    let mut name: String = last_segment
        .chars()
        .map(|c| if is_illegal(c) { '_' } else { c })
        .collect();

    if !has_extension(&name) {
        name.push_str(DEFAULT_EXTENSION);
    }
    name
}

fn is_illegal(c: char) -> bool {
    c.is_control() || ILLEGAL_CHARS.contains(&c)
}

/// True when the name has a dot followed by at least one character.
fn has_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .map_or(false, |(_, ext)| !ext.is_empty())
}
