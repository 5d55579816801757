// Aggregation Logic
// Combines the seven metric scores into the final AI probability

use crate::models::{AnalysisResult, DetectedLanguage, MetricScores};
use crate::services::text_processor::{char_len, split_words};
use thiserror::Error;

pub const ENTROPY_WEIGHT: f64 = 0.20;
pub const BURSTINESS_WEIGHT: f64 = 0.15;
pub const LEXICAL_DIVERSITY_WEIGHT: f64 = 0.20;
pub const REPETITION_WEIGHT: f64 = 0.15;
pub const STRUCTURAL_PATTERNS_WEIGHT: f64 = 0.15;
pub const PUNCTUATION_PATTERNS_WEIGHT: f64 = 0.10;
pub const READABILITY_WEIGHT: f64 = 0.05;

/// Probability reported when no meaningful score can be produced
pub const FALLBACK_PROBABILITY: f64 = 0.5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("metric {metric} produced a non-finite value ({value})")]
    NonFinite { metric: &'static str, value: f64 },
}

/// Weighted sum of the raw metric scores (before clamping).
pub fn weighted_probability(scores: &MetricScores) -> f64 {
    scores.entropy * ENTROPY_WEIGHT
        + scores.burstiness * BURSTINESS_WEIGHT
        + scores.lexical_diversity * LEXICAL_DIVERSITY_WEIGHT
        + scores.repetition * REPETITION_WEIGHT
        + scores.structural_patterns * STRUCTURAL_PATTERNS_WEIGHT
        + scores.punctuation_patterns * PUNCTUATION_PATTERNS_WEIGHT
        + scores.readability * READABILITY_WEIGHT
}

/// Assemble a scored result. Probability and every metric are clamped to [0, 1]
/// independently; a NaN or infinite metric is rejected instead.
pub fn aggregate(
    scores: MetricScores,
    word_count: usize,
    characters: usize,
) -> Result<AnalysisResult, ScoringError> {
    for (metric, value) in scores.entries() {
        if !value.is_finite() {
            return Err(ScoringError::NonFinite { metric, value });
        }
    }

    let probability = weighted_probability(&scores);

    Ok(AnalysisResult {
        ai_probability: probability.clamp(0.0, 1.0),
        metrics: scores.clamped(),
        word_count,
        characters,
        detected_language: DetectedLanguage::Universal,
    })
}

/// Neutral result used for invalid input or failed scoring.
/// Counts are taken from whatever text was available.
pub fn fallback_result(text: &str) -> AnalysisResult {
    AnalysisResult {
        ai_probability: FALLBACK_PROBABILITY,
        metrics: MetricScores::NEUTRAL,
        word_count: split_words(text).len(),
        characters: char_len(text),
        detected_language: DetectedLanguage::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scores(value: f64) -> MetricScores {
        MetricScores {
            entropy: value,
            burstiness: value,
            lexical_diversity: value,
            repetition: value,
            structural_patterns: value,
            punctuation_patterns: value,
            readability: value,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = ENTROPY_WEIGHT
            + BURSTINESS_WEIGHT
            + LEXICAL_DIVERSITY_WEIGHT
            + REPETITION_WEIGHT
            + STRUCTURAL_PATTERNS_WEIGHT
            + PUNCTUATION_PATTERNS_WEIGHT
            + READABILITY_WEIGHT;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_scores_pass_through() {
        let result = aggregate(scores(0.4), 10, 50).unwrap();
        assert!((result.ai_probability - 0.4).abs() < 1e-12);
        assert_eq!(result.word_count, 10);
        assert_eq!(result.characters, 50);
        assert_eq!(result.detected_language, DetectedLanguage::Universal);
    }

    #[test]
    fn test_single_metric_weight() {
        let mut s = scores(0.0);
        s.punctuation_patterns = 1.0;
        let result = aggregate(s, 0, 0).unwrap();
        assert!((result.ai_probability - PUNCTUATION_PATTERNS_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let result = aggregate(scores(1.5), 1, 1).unwrap();
        assert_eq!(result.ai_probability, 1.0);
        assert_eq!(result.metrics.entropy, 1.0);

        let result = aggregate(scores(-0.5), 1, 1).unwrap();
        assert_eq!(result.ai_probability, 0.0);
        assert_eq!(result.metrics.readability, 0.0);
    }

    #[test]
    fn test_non_finite_metric_is_rejected() {
        let mut s = scores(0.5);
        s.burstiness = f64::NAN;
        let err = aggregate(s, 3, 10).unwrap_err();
        assert!(matches!(err, ScoringError::NonFinite { metric: "burstiness", .. }));
    }

    #[test]
    fn test_fallback_result() {
        let result = fallback_result("  two words ");
        assert_eq!(result.ai_probability, 0.5);
        assert_eq!(result.metrics, MetricScores::NEUTRAL);
        assert_eq!(result.metrics.repetition, 0.0);
        assert_eq!(result.word_count, 2);
        assert_eq!(result.characters, 12);
        assert_eq!(result.detected_language, DetectedLanguage::Unknown);

        let empty = fallback_result("");
        assert_eq!(empty.word_count, 0);
        assert_eq!(empty.characters, 0);
    }
}
