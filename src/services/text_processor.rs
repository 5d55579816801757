// Text Processing Service
// Shared tokenization used by every scorer, so all of them agree on
// what a "sentence" and a "word" is.

use regex::Regex;
use std::sync::OnceLock;

fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?。！？]+").expect("sentence break regex"))
}

/// Split text on runs of sentence terminators (ASCII and full-width).
/// Whitespace-only fragments are dropped; fragments are returned untrimmed.
pub fn split_sentences(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return vec![];
    }

    sentence_break_re()
        .split(text)
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Split on whitespace runs, dropping empty fragments.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Number of words in each sentence.
pub fn sentence_word_counts(sentences: &[&str]) -> Vec<usize> {
    sentences.iter().map(|s| s.split_whitespace().count()).collect()
}

/// Length in Unicode scalar values.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// First `max_chars` characters of `text`, never cutting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Single-line preview for console output.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut out = truncate_chars(text, max_chars).to_string();
    if char_len(text) > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}
