// Detection Module
// Heuristic AI-likelihood scoring organized into specialized submodules:
// - lexical: character entropy, lexical diversity, word/bigram repetition
// - structure: burstiness, structural patterns, readability
// - punctuation: punctuation variety and comma density
// - aggregation: weighted combination, clamping and the fallback result
// - analyzer: top-level entry point

pub mod lexical;
pub mod structure;
pub mod punctuation;
pub mod aggregation;
pub mod analyzer;

pub use lexical::{entropy_score, lexical_diversity_score, repetition_score};
pub use structure::{burstiness_score, readability_score, structural_patterns_score};
pub use punctuation::{punctuation_patterns_score, PunctuationCounts};
pub use aggregation::{aggregate, fallback_result, weighted_probability, ScoringError};
pub use analyzer::{analyze, analyze_input, analyze_outcome, compute_metrics};
