// Text Analyzer
// Entry point of the scoring engine: guard, score, aggregate, fall back

use crate::models::{AnalysisInput, AnalysisOutcome, AnalysisResult, FallbackReason, MetricScores};
use crate::services::text_processor::{char_len, split_words};
use tracing::{debug, warn};

use super::aggregation::{aggregate, fallback_result};
use super::lexical::{entropy_score, lexical_diversity_score, repetition_score};
use super::punctuation::punctuation_patterns_score;
use super::structure::{burstiness_score, readability_score, structural_patterns_score};

/// Run all seven scorers on already-trimmed text.
/// The scorers share no state and could run in any order.
pub fn compute_metrics(text: &str) -> MetricScores {
    MetricScores {
        entropy: entropy_score(text),
        burstiness: burstiness_score(text),
        lexical_diversity: lexical_diversity_score(text),
        repetition: repetition_score(text),
        structural_patterns: structural_patterns_score(text),
        punctuation_patterns: punctuation_patterns_score(text),
        readability: readability_score(text),
    }
}

/// Analyze text, reporting whether the result was scored or is the fallback.
/// `None` stands for a missing value at the caller's boundary.
pub fn analyze_outcome(text: Option<&str>) -> AnalysisOutcome {
    let Some(raw) = text else {
        return AnalysisOutcome::Fallback {
            reason: FallbackReason::InvalidInput,
            result: fallback_result(""),
        };
    };

    let clean = raw.trim();
    if clean.is_empty() {
        return AnalysisOutcome::Fallback {
            reason: FallbackReason::InvalidInput,
            result: fallback_result(""),
        };
    }

    let metrics = compute_metrics(clean);
    let word_count = split_words(clean).len();
    let characters = char_len(clean);

    match aggregate(metrics, word_count, characters) {
        Ok(result) => {
            debug!(
                ai_probability = result.ai_probability,
                entropy = result.metrics.entropy,
                burstiness = result.metrics.burstiness,
                lexical_diversity = result.metrics.lexical_diversity,
                repetition = result.metrics.repetition,
                structural_patterns = result.metrics.structural_patterns,
                punctuation_patterns = result.metrics.punctuation_patterns,
                readability = result.metrics.readability,
                word_count,
                characters,
                "analysis.scored"
            );
            AnalysisOutcome::Scored(result)
        }
        Err(e) => {
            warn!(characters, "analysis.fallback: {}", e);
            AnalysisOutcome::Fallback {
                reason: FallbackReason::ScoringFailed,
                result: fallback_result(clean),
            }
        }
    }
}

/// Score `text`. Never fails: invalid or unscorable input yields the neutral
/// fallback result with `detected_language = unknown`.
pub fn analyze(text: &str) -> AnalysisResult {
    analyze_outcome(Some(text)).into_result()
}

pub fn analyze_input(input: &AnalysisInput) -> AnalysisResult {
    analyze(&input.text)
}
