// Punctuation Scorer
// Human writing tends to use a wider mix of punctuation and fewer commas per character.

use crate::services::text_processor::char_len;

const MIN_CHARS: usize = 50;
const LOW_VARIETY_CLASSES: usize = 3;
const LOW_VARIETY_MIN_CHARS: usize = 200;
const LOW_VARIETY_WEIGHT: f64 = 0.3;
const COMMA_DENSITY_MAX: f64 = 0.03;
const COMMA_DENSITY_WEIGHT: f64 = 0.2;
const PUNCTUATION_CAP: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PunctuationCounts {
    pub periods: usize,
    pub commas: usize,
    pub questions: usize,
    pub exclamations: usize,
    pub colons: usize,
    pub semicolons: usize,
}

impl PunctuationCounts {
    pub fn count(text: &str) -> Self {
        let mut counts = Self::default();
        for c in text.chars() {
            match c {
                '.' => counts.periods += 1,
                ',' => counts.commas += 1,
                '?' => counts.questions += 1,
                '!' => counts.exclamations += 1,
                ':' => counts.colons += 1,
                ';' => counts.semicolons += 1,
                _ => {}
            }
        }
        counts
    }

    /// Number of classes present at least once.
    pub fn variety(&self) -> usize {
        [
            self.periods,
            self.commas,
            self.questions,
            self.exclamations,
            self.colons,
            self.semicolons,
        ]
        .iter()
        .filter(|&&n| n > 0)
        .count()
    }
}

/// Low punctuation variety on longer text and heavy comma use score high.
/// Capped at 0.5.
pub fn punctuation_patterns_score(text: &str) -> f64 {
    let length = char_len(text);
    if length < MIN_CHARS {
        return 0.5;
    }

    let counts = PunctuationCounts::count(text);
    let mut score = 0.0;

    if counts.variety() < LOW_VARIETY_CLASSES && length > LOW_VARIETY_MIN_CHARS {
        score += LOW_VARIETY_WEIGHT;
    }

    let comma_density = counts.commas as f64 / length as f64;
    if comma_density > COMMA_DENSITY_MAX {
        score += COMMA_DENSITY_WEIGHT;
    }

    f64::min(score, PUNCTUATION_CAP)
}
