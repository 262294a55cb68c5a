//! Rule-based summarization and text preparation
//!
//! The summary is a human-readable synopsis, not risk-bearing: when the
//! learned summarizer is unavailable these heuristics produce the fallback.

/// Truncation limit when the text has too few usable sentences
const SHORT_TEXT_MAX_CHARS: usize = 200;
/// Minimum sentence length considered meaningful
const MIN_SENTENCE_CHARS: usize = 10;

/// Produce a summary without any model: first two meaningful sentences
///
/// Sentences shorter than 10 characters are skipped; if fewer than three
/// usable sentences exist, the raw content is returned truncated instead.
pub fn fallback_summary(content: &str, max_chars: usize) -> String {
    let sentences: Vec<&str> = content
        .split('.')
        .map(str::trim)
        .filter(|s| s.len() > MIN_SENTENCE_CHARS)
        .collect();

    if sentences.len() <= 2 {
        return truncate_with_ellipsis(content.trim(), SHORT_TEXT_MAX_CHARS);
    }

    let summary = format!("{}.", sentences[..2].join(". "));
    truncate_with_ellipsis(&summary, max_chars)
}

/// Truncate to `max_chars` characters, appending "..." when shortened
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Truncate to a window without the ellipsis marker, for model input limits
pub fn clip_to_window(text: &str, window_chars: usize) -> &str {
    match text.char_indices().nth(window_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse whitespace and strip characters outside words and basic
/// punctuation before handing text to an external model
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || ".,;:!?".contains(*c))
        .collect()
}
