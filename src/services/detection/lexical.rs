// Lexical Scorers
// Character- and word-level signals: entropy, lexical diversity, repetition

use crate::services::text_processor::split_words;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Minimum letters before character entropy is meaningful
const ENTROPY_MIN_LETTERS: usize = 10;
/// Assumed upper bound of natural-language character entropy (bits)
const ENTROPY_CEILING_BITS: f64 = 4.5;

const DIVERSITY_MIN_WORDS: usize = 10;
const DIVERSITY_RATIO_SCALE: f64 = 1.5;

const REPETITION_MIN_WORDS: usize = 15;
/// A word may occur this many times before it is penalized
const REPETITION_FREE_OCCURRENCES: usize = 2;
const WORD_REPEAT_PENALTY: f64 = 0.1;
const BIGRAM_REPEAT_PENALTY: f64 = 0.05;

const NEUTRAL: f64 = 0.5;

/// Character-level Shannon entropy mapped to AI-likelihood.
/// Only ASCII letters are counted; lower entropy scores higher.
pub fn entropy_score(text: &str) -> f64 {
    let letters: Vec<char> = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase())
        .collect();
    if letters.len() < ENTROPY_MIN_LETTERS {
        return NEUTRAL;
    }

    let mut counts = [0usize; 26];
    for c in &letters {
        counts[(*c as u8 - b'a') as usize] += 1;
    }

    let total = letters.len() as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&n| n > 0)
        .map(|&n| {
            let p = n as f64 / total;
            -p * p.log2()
        })
        .sum();

    (1.0 - entropy / ENTROPY_CEILING_BITS).clamp(0.0, 1.0)
}

/// Type-token ratio over lower-cased words longer than one character.
pub fn lexical_diversity_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let words = words_longer_than(&lowered, 1);
    if words.len() < DIVERSITY_MIN_WORDS {
        return NEUTRAL;
    }

    let unique: HashSet<&str> = words.iter().copied().collect();
    let ratio = unique.len() as f64 / words.len() as f64;

    (1.0 - ratio * DIVERSITY_RATIO_SCALE).clamp(0.0, 1.0)
}

/// Penalty for words recurring beyond two occurrences and for repeated bigrams.
/// Neutral (too little data) is 0 here, not 0.5.
pub fn repetition_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let words = words_longer_than(&lowered, 2);
    if words.len() < REPETITION_MIN_WORDS {
        return 0.0;
    }

    let word_penalty: f64 = counts_in_first_seen_order(words.iter().copied())
        .into_iter()
        .filter(|&(_, count)| count > REPETITION_FREE_OCCURRENCES)
        .map(|(_, count)| (count - REPETITION_FREE_OCCURRENCES) as f64 * WORD_REPEAT_PENALTY)
        .sum();

    let bigrams = words.windows(2).map(|pair| (pair[0], pair[1]));
    let bigram_penalty: f64 = counts_in_first_seen_order(bigrams)
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(_, count)| count as f64 * BIGRAM_REPEAT_PENALTY)
        .sum();

    (word_penalty + bigram_penalty).min(1.0)
}

/// Occurrence counts ordered by first appearance, so float sums over them
/// are reproducible.
fn counts_in_first_seen_order<T, I>(items: I) -> Vec<(T, usize)>
where
    T: Eq + Hash + Copy,
    I: IntoIterator<Item = T>,
{
    let mut index: HashMap<T, usize> = HashMap::new();
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match index.get(&item) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(item, counts.len());
                counts.push((item, 1));
            }
        }
    }
    counts
}

fn words_longer_than(text: &str, min_chars: usize) -> Vec<&str> {
    split_words(text)
        .into_iter()
        .filter(|w| w.chars().count() > min_chars)
        .collect()
}
