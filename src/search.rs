// SPDX-License-Identifier: GPL-3.0-or-later
// rpnotes - Fuzzy filtering of the notes list

use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32Str};

/// Filter file names by fuzzy match, best match first. An empty query keeps
/// the original order.
pub fn filter_names(names: &[String], query: &str, matcher: &mut Matcher) -> Vec<String> {
    if query.is_empty() {
        return names.to_vec();
    }

    let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
    pattern
        .match_list(names, matcher)
        .into_iter()
        .map(|(name, _)| name.clone())
        .collect()
}

/// Character indices of `name` matched by `query`, for highlighting.
pub fn get_match_indices(name: &str, query: &str, matcher: &mut Matcher) -> Vec<u32> {
    if query.is_empty() || name.is_empty() {
        return Vec::new();
    }

    let pattern = Pattern::parse(query, CaseMatching::Ignore, Normalization::Smart);
    let mut buf = Vec::new();
    let haystack = Utf32Str::new(name, &mut buf);
    let mut indices = Vec::new();
    if pattern.indices(haystack, matcher, &mut indices).is_some() {
        indices.sort_unstable();
        indices.dedup();
    }
    indices
}
