//! Number rules for numbered-list contest posts.
//!
//! A contest post is a numbered list. A line reading `7.` with nothing after
//! the marker is an open slot; once claimed it reads `7. Name`. Comments claim
//! slots by mentioning numbers anywhere in their text.
//!
//! Everything here is pure text processing. The live post text is the only
//! input; nothing is cached between calls.

use std::sync::LazyLock;

use regex::Regex;

/// Maximal digit runs bounded by ASCII word boundaries (`7th` and `a7` don't
/// match, `nº7` and `café5` do).
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)[0-9]+(?-u:\b)").expect("number pattern is valid")
});

/// Extract every number mentioned in a comment, in order of appearance.
///
/// Leading zeros are ignored (`07` is 7) and duplicates are kept. Digit runs
/// too large for a `u64` are dropped: they can never name a list slot.
pub fn extract_numbers(text: &str) -> Vec<u64> {
    NUMBER_PATTERN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Whether `number` is still open in the post.
///
/// True iff some line, trimmed, is exactly `"{number}."`.
pub fn is_available(post_text: &str, number: u64) -> bool {
    let marker = marker(number);
    post_text.split('\n').any(|line| line.trim() == marker)
}

/// Write `name` next to `number`, returning the new post text.
///
/// Only one line is rewritten: the first open `"{number}."` line if there is
/// one, otherwise the first line whose trimmed text starts with the marker.
/// Every other line, blank lines included, is passed through unchanged. The
/// rewritten line keeps a trailing `\r` so CRLF posts stay CRLF.
///
/// Availability is not checked here; the caller decides whether the slot may
/// be taken.
pub fn apply_name(post_text: &str, number: u64, name: &str) -> String {
    let marker = marker(number);
    let lines: Vec<&str> = post_text.split('\n').collect();

    let target = lines
        .iter()
        .position(|line| line.trim() == marker)
        .or_else(|| lines.iter().position(|line| line.trim().starts_with(&marker)));

    let Some(target) = target else {
        return post_text.to_string();
    };

    let name = single_line(name);
    let ending = if lines[target].ends_with('\r') { "\r" } else { "" };
    let replacement = format!("{marker} {name}{ending}");

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| if i == target { replacement.as_str() } else { *line })
        .collect::<Vec<_>>()
        .join("\n")
}

fn marker(number: u64) -> String {
    format!("{number}.")
}

/// Collapse line breaks so a name can't split the list.
fn single_line(name: &str) -> String {
    name.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
