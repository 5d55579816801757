// TextProbe Core Services

pub mod text_processor;
pub mod config_store;
pub mod detection;
pub mod history;
pub mod users;
pub mod validation;

pub use text_processor::*;
pub use config_store::*;
pub use history::{HistoryError, HistoryStore, PageLimits};
pub use users::{IssuedSession, UserError, UserStore};
pub use validation::{validate_text, ValidationError, DEFAULT_MAX_TEXT_CHARS};

// Re-export detection module functions
pub use detection::{
    aggregate,
    analyze,
    analyze_input,
    analyze_outcome,
    compute_metrics,
    fallback_result,
    weighted_probability,
    ScoringError,
};
