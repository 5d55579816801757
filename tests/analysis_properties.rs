//! Behavioural tests for the public `analyze` contract.
//!
//! Covers the range and determinism invariants for arbitrary input, the
//! neutral fallback for blank input, short-text guards, and three reference
//! scenarios (repetitive, human-style and tiny text).

use proptest::prelude::*;
use textprobe_lib::models::{DetectedLanguage, FallbackReason, MetricScores};
use textprobe_lib::services::detection::aggregation::{
    BURSTINESS_WEIGHT, ENTROPY_WEIGHT, LEXICAL_DIVERSITY_WEIGHT, PUNCTUATION_PATTERNS_WEIGHT,
    READABILITY_WEIGHT, REPETITION_WEIGHT, STRUCTURAL_PATTERNS_WEIGHT,
};
use textprobe_lib::services::detection::repetition_score;
use textprobe_lib::{analyze, analyze_outcome};

const REPETITIVE: &str = "The cat sat on the mat. The cat sat on the mat. The cat sat on the mat.";

const HUMAN_STYLE: &str = "I missed the bus again this morning. Honestly, who schedules a departure for 7:02 when every clock in my flat runs four minutes slow?

So I walked. The river path was flooded near the old mill, which meant climbing the embankment, slipping twice on wet clay, and arriving at the office with mud halfway up both trouser legs; nobody said a word about it, though Priya raised an eyebrow.

Lunch was better. We tried the new ramen place by the station and argued for an hour about whether broth should ever be sweet!

Tomorrow I am leaving early.";

fn assert_in_unit_range(metrics: &MetricScores) {
    for (name, value) in metrics.entries() {
        assert!((0.0..=1.0).contains(&value), "{} = {} out of range", name, value);
    }
}

#[test]
fn weights_sum_to_one() {
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
fn blank_input_returns_fallback() {
    for text in ["", "   ", "\n\n\t"] {
        let result = analyze(text);
        assert_eq!(result.detected_language, DetectedLanguage::Unknown);
        assert_eq!(result.ai_probability, 0.5);
        assert_eq!(result.metrics, MetricScores::NEUTRAL);
        assert_eq!(result.metrics.repetition, 0.0);
        assert_eq!(result.word_count, 0);
        assert_eq!(result.characters, 0);
    }

    let outcome = analyze_outcome(None);
    assert_eq!(outcome.fallback_reason(), Some(FallbackReason::InvalidInput));
    assert_eq!(outcome.result().detected_language, DetectedLanguage::Unknown);
}

#[test]
fn short_text_guards_are_neutral() {
    // fewer than 10 letters, fewer than 3 sentences, fewer than 15 qualifying words
    let result = analyze("Tiny note.");
    assert_eq!(result.metrics.entropy, 0.5);
    assert_eq!(result.metrics.burstiness, 0.5);
    assert_eq!(result.metrics.structural_patterns, 0.5);
    assert_eq!(result.metrics.repetition, 0.0);
}

#[test]
fn extra_repetitions_increase_repetition_score() {
    let base = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike november oscar papa";
    let repeated = format!("{} charlie charlie", base);
    assert!(repetition_score(&repeated) > repetition_score(base));

    let base_result = analyze(base);
    let repeated_result = analyze(&repeated);
    assert!(repeated_result.metrics.repetition > base_result.metrics.repetition);
}

#[test]
fn scenario_repetitive_text_scores_as_ai() {
    let result = analyze(REPETITIVE);
    assert_eq!(result.detected_language, DetectedLanguage::Universal);
    assert!(result.metrics.repetition > 0.3, "repetition = {}", result.metrics.repetition);
    assert!(
        result.metrics.structural_patterns > 0.3,
        "structural = {}",
        result.metrics.structural_patterns
    );
    assert!(result.ai_probability > 0.5, "ai_probability = {}", result.ai_probability);
    assert_eq!(result.word_count, 18);
    assert_eq!(result.characters, 71);
}

#[test]
fn scenario_human_style_text_scores_as_human() {
    let result = analyze(HUMAN_STYLE);
    assert_eq!(result.detected_language, DetectedLanguage::Universal);
    assert!(result.metrics.burstiness < 0.3, "burstiness = {}", result.metrics.burstiness);
    assert!(
        result.metrics.structural_patterns < 0.3,
        "structural = {}",
        result.metrics.structural_patterns
    );
    assert!(
        result.metrics.punctuation_patterns < 0.3,
        "punctuation = {}",
        result.metrics.punctuation_patterns
    );
    assert!(result.ai_probability < 0.5, "ai_probability = {}", result.ai_probability);
}

#[test]
fn scenario_tiny_text_uses_neutral_defaults() {
    let result = analyze("hi");
    assert_eq!(result.detected_language, DetectedLanguage::Universal);
    assert_eq!(result.metrics.entropy, 0.5);
    assert_eq!(result.metrics.burstiness, 0.5);
    assert_eq!(result.metrics.lexical_diversity, 0.5);
    assert_eq!(result.metrics.repetition, 0.0);
    assert_eq!(result.metrics.structural_patterns, 0.5);
    assert_eq!(result.metrics.punctuation_patterns, 0.5);
    assert_eq!(result.word_count, 1);
    assert_eq!(result.characters, 2);
}

#[test]
fn repeated_analysis_is_bit_identical() {
    let baseline = analyze(HUMAN_STYLE);
    let repetitive = analyze(REPETITIVE);
    for _ in 0..300 {
        assert_eq!(analyze(HUMAN_STYLE).ai_probability.to_bits(), baseline.ai_probability.to_bits());
        assert_eq!(analyze(REPETITIVE).ai_probability.to_bits(), repetitive.ai_probability.to_bits());
    }
    for (name, value) in analyze(HUMAN_STYLE).metrics.entries() {
        let expected = baseline
            .metrics
            .entries()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.to_bits());
        assert_eq!(Some(value.to_bits()), expected, "{} drifted", name);
    }
}

#[test]
fn result_serializes_with_camel_case_fields() {
    let json = serde_json::to_value(analyze(REPETITIVE)).unwrap();
    assert!(json.get("aiProbability").is_some());
    assert!(json.get("wordCount").is_some());
    assert_eq!(json["detectedLanguage"], "universal");
    assert!(json["metrics"].get("lexicalDiversity").is_some());
}

proptest! {
    #[test]
    fn prop_scores_stay_in_unit_range(text in "\\PC{0,600}") {
        let result = analyze(&text);
        prop_assert!((0.0..=1.0).contains(&result.ai_probability));
        assert_in_unit_range(&result.metrics);
    }

    #[test]
    fn prop_scores_stay_in_unit_range_for_prose(
        words in prop::collection::vec("[a-zA-Z]{1,12}[.,!?;:]?", 0..300),
        breaks in prop::collection::vec(any::<bool>(), 0..300),
    ) {
        let mut text = String::new();
        for (i, w) in words.iter().enumerate() {
            text.push_str(w);
            let paragraph = breaks.get(i).copied().unwrap_or(false) && w.ends_with('.');
            text.push_str(if paragraph { "\n\n" } else { " " });
        }
        let result = analyze(&text);
        prop_assert!((0.0..=1.0).contains(&result.ai_probability));
        assert_in_unit_range(&result.metrics);
        prop_assert!(result.metrics.structural_patterns <= 0.7);
        prop_assert!(result.metrics.punctuation_patterns <= 0.5);
        prop_assert!(result.metrics.readability <= 0.5);
    }

    #[test]
    fn prop_analysis_is_deterministic(text in "\\PC{0,400}") {
        let first = analyze(&text);
        let second = analyze(&text);
        prop_assert_eq!(first.ai_probability.to_bits(), second.ai_probability.to_bits());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_prose_analysis_is_bit_identical(
        vocabulary in prop::collection::vec("[a-zA-Z]{3,12}", 4..20),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 20..200),
    ) {
        let text = picks
            .iter()
            .enumerate()
            .map(|(i, pick)| {
                let word = pick.get(&vocabulary);
                if i % 9 == 8 { format!("{}.", word) } else { word.clone() }
            })
            .collect::<Vec<_>>()
            .join(" ");
        let first = analyze(&text);
        for _ in 0..5 {
            let again = analyze(&text);
            prop_assert_eq!(again.ai_probability.to_bits(), first.ai_probability.to_bits());
            for ((name, a), (_, b)) in again.metrics.entries().into_iter().zip(first.metrics.entries()) {
                prop_assert_eq!(a.to_bits(), b.to_bits(), "{} differs", name);
            }
        }
    }
}
