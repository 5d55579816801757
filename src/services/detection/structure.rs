// Structure Scorers
// Sentence-level signals: burstiness, structural patterns, readability
//
// Uniform sentence lengths, missing paragraph breaks, repeated sentence
// openings and extreme average lengths all push toward AI-likelihood.

use crate::services::text_processor::{
    char_len, sentence_word_counts, split_sentences, split_words, std_dev,
};
use std::collections::HashSet;

const MIN_SENTENCES: usize = 3;
const NEUTRAL: f64 = 0.5;

/// Sentence-length standard deviation (words) that maps to zero burstiness score
const BURSTINESS_STD_SCALE: f64 = 10.0;

const UNIFORM_LENGTH_STD: f64 = 2.5;
const UNIFORM_LENGTH_WEIGHT: f64 = 0.3;
const NO_PARAGRAPH_MIN_CHARS: usize = 400;
const NO_PARAGRAPH_WEIGHT: f64 = 0.2;
const OPENING_WORDS: usize = 2;
const OPENING_DIVERSITY_MIN: f64 = 0.6;
const OPENING_WEIGHT: f64 = 0.2;
const STRUCTURAL_CAP: f64 = 0.7;

const SENTENCE_LEN_RANGE: (f64, f64) = (8.0, 25.0);
const SENTENCE_LEN_WEIGHT: f64 = 0.3;
const WORD_LEN_RANGE: (f64, f64) = (4.0, 6.5);
const WORD_LEN_WEIGHT: f64 = 0.2;
const READABILITY_CAP: f64 = 0.5;

/// Low variability of sentence length scores high.
pub fn burstiness_score(text: &str) -> f64 {
    let sentences = split_sentences(text);
    if sentences.len() < MIN_SENTENCES {
        return NEUTRAL;
    }

    let std = std_dev(&lengths(&sentences));
    let normalized = (std / BURSTINESS_STD_SCALE).min(1.0);
    1.0 - normalized
}

/// Composite of length uniformity, absent paragraph breaks and repeated
/// sentence openings. Capped at 0.7.
pub fn structural_patterns_score(text: &str) -> f64 {
    let sentences = split_sentences(text);
    if sentences.len() < MIN_SENTENCES {
        return NEUTRAL;
    }

    let mut score = 0.0;

    if std_dev(&lengths(&sentences)) < UNIFORM_LENGTH_STD {
        score += UNIFORM_LENGTH_WEIGHT;
    }

    if !has_paragraph_break(text) && char_len(text) > NO_PARAGRAPH_MIN_CHARS {
        score += NO_PARAGRAPH_WEIGHT;
    }

    if opening_diversity(&sentences) < OPENING_DIVERSITY_MIN {
        score += OPENING_WEIGHT;
    }

    f64::min(score, STRUCTURAL_CAP)
}

/// Extreme average sentence or word length scores high. Capped at 0.5.
pub fn readability_score(text: &str) -> f64 {
    let sentences = split_sentences(text);
    let words = split_words(text);
    if sentences.is_empty() || words.is_empty() {
        return NEUTRAL;
    }

    let avg_sentence_len = words.len() as f64 / sentences.len() as f64;
    let non_ws_chars = text.chars().filter(|c| !c.is_whitespace()).count();
    let avg_word_len = non_ws_chars as f64 / words.len() as f64;

    let mut score = 0.0;
    if outside(avg_sentence_len, SENTENCE_LEN_RANGE) {
        score += SENTENCE_LEN_WEIGHT;
    }
    if outside(avg_word_len, WORD_LEN_RANGE) {
        score += WORD_LEN_WEIGHT;
    }

    f64::min(score, READABILITY_CAP)
}

fn lengths(sentences: &[&str]) -> Vec<f64> {
    sentence_word_counts(sentences)
        .into_iter()
        .map(|n| n as f64)
        .collect()
}

fn has_paragraph_break(text: &str) -> bool {
    text.contains("\n\n") || text.contains("\r\n\r\n")
}

/// Distinct two-word openings divided by sentence count.
fn opening_diversity(sentences: &[&str]) -> f64 {
    let openings: Vec<String> = sentences
        .iter()
        .map(|s| {
            split_words(s)
                .into_iter()
                .take(OPENING_WORDS)
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .collect();
    let unique: HashSet<&String> = openings.iter().collect();
    unique.len() as f64 / openings.len().max(1) as f64
}

fn outside(value: f64, (low, high): (f64, f64)) -> bool {
    value < low || value > high
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPETITIVE: &str = "The cat sat on the mat. The cat sat on the mat. The cat sat on the mat.";

    #[test]
    fn test_burstiness_needs_three_sentences() {
        assert_eq!(burstiness_score("One sentence. Two sentences."), 0.5);
        assert_eq!(burstiness_score("hi"), 0.5);
    }

    #[test]
    fn test_burstiness_uniform_lengths_score_one() {
        assert_eq!(burstiness_score(REPETITIVE), 1.0);
    }

    #[test]
    fn test_burstiness_varied_lengths() {
        // lengths 1, 21, 1 => std ~9.43
        let long = "word ".repeat(21);
        let text = format!("Short. {}. Tiny.", long.trim());
        let score = burstiness_score(&text);
        assert!(score > 0.0 && score < 0.1, "score = {}", score);
    }

    #[test]
    fn test_structural_guard() {
        assert_eq!(structural_patterns_score("Only one sentence here"), 0.5);
    }

    #[test]
    fn test_structural_uniform_and_repeated_openings() {
        // uniform (+0.3) and identical openings (+0.2); too short for the paragraph rule
        assert!((structural_patterns_score(REPETITIVE) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_structural_long_unbroken_text_hits_cap() {
        let text = REPETITIVE.repeat(8);
        assert!(char_len(&text) > 400);
        assert!((structural_patterns_score(&text) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_structural_paragraph_break_avoids_penalty() {
        let text = format!("{}\n\n{}", REPETITIVE.repeat(4), REPETITIVE.repeat(4));
        assert!((structural_patterns_score(&text) - 0.5).abs() < 1e-12);
        let crlf = format!("{}\r\n\r\n{}", REPETITIVE.repeat(4), REPETITIVE.repeat(4));
        assert!((structural_patterns_score(&crlf) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_structural_varied_text_scores_zero() {
        let text = "I left early. Then, after a long and winding walk along the river past the mill and the bakery, we finally reached home. Why?";
        assert_eq!(structural_patterns_score(text), 0.0);
    }

    #[test]
    fn test_readability_empty_is_neutral() {
        assert_eq!(readability_score(""), 0.5);
        assert_eq!(readability_score("..."), 0.5);
    }

    #[test]
    fn test_readability_short_words_short_sentences() {
        assert!((readability_score("hi") - 0.5).abs() < 1e-12);
        assert!((readability_score(REPETITIVE) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_readability_balanced_text_scores_zero() {
        // one 10-word sentence, avg word length 5.0
        let text = "words words words words words words words words words words";
        assert_eq!(readability_score(text), 0.0);
    }
}
