// TextProbe Data Models
// Shapes shared by the scoring engine, the history store and the command surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============ Engine Input ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub text: String,
}

impl AnalysisInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

// ============ Metric Scores ============

/// The seven sub-metrics, each a normalized AI-likelihood in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricScores {
    pub entropy: f64,
    pub burstiness: f64,
    pub lexical_diversity: f64,
    pub repetition: f64,
    pub structural_patterns: f64,
    pub punctuation_patterns: f64,
    pub readability: f64,
}

impl MetricScores {
    /// Neutral values used by the fallback result. Repetition is neutral at 0.
    pub const NEUTRAL: MetricScores = MetricScores {
        entropy: 0.5,
        burstiness: 0.5,
        lexical_diversity: 0.5,
        repetition: 0.0,
        structural_patterns: 0.5,
        punctuation_patterns: 0.5,
        readability: 0.5,
    };

    /// Metric values keyed by their serialized names, in a stable order.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("entropy", self.entropy),
            ("burstiness", self.burstiness),
            ("lexicalDiversity", self.lexical_diversity),
            ("repetition", self.repetition),
            ("structuralPatterns", self.structural_patterns),
            ("punctuationPatterns", self.punctuation_patterns),
            ("readability", self.readability),
        ]
    }

    pub fn clamped(&self) -> Self {
        Self {
            entropy: self.entropy.clamp(0.0, 1.0),
            burstiness: self.burstiness.clamp(0.0, 1.0),
            lexical_diversity: self.lexical_diversity.clamp(0.0, 1.0),
            repetition: self.repetition.clamp(0.0, 1.0),
            structural_patterns: self.structural_patterns.clamp(0.0, 1.0),
            punctuation_patterns: self.punctuation_patterns.clamp(0.0, 1.0),
            readability: self.readability.clamp(0.0, 1.0),
        }
    }
}

impl Default for MetricScores {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

// ============ Analysis Result ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedLanguage {
    /// Scored successfully; the engine is language agnostic.
    Universal,
    /// Fallback result.
    Unknown,
}

impl DetectedLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Universal => "universal",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ai_probability: f64,
    pub metrics: MetricScores,
    pub word_count: usize,
    pub characters: usize,
    pub detected_language: DetectedLanguage,
}

impl AnalysisResult {
    pub fn is_fallback(&self) -> bool {
        self.detected_language == DetectedLanguage::Unknown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Missing or blank input; no scorer ran.
    InvalidInput,
    /// A scorer produced an unusable value.
    ScoringFailed,
}

/// Outcome of one engine invocation. Both arms carry a complete result.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Scored(AnalysisResult),
    Fallback {
        reason: FallbackReason,
        result: AnalysisResult,
    },
}

impl AnalysisOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            Self::Scored(result) => result,
            Self::Fallback { result, .. } => result,
        }
    }

    pub fn into_result(self) -> AnalysisResult {
        match self {
            Self::Scored(result) => result,
            Self::Fallback { result, .. } => result,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Self::Scored(_) => None,
            Self::Fallback { reason, .. } => Some(*reason),
        }
    }
}

// ============ Stored Detections ============

/// Metrics as persisted. `perplexity` is a reserved slot that nothing computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMetrics {
    #[serde(flatten)]
    pub scores: MetricScores,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perplexity: Option<f64>,
}

impl From<MetricScores> for StoredMetrics {
    fn from(scores: MetricScores) -> Self {
        Self {
            scores,
            perplexity: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRecord {
    pub id: Uuid,
    pub user_id: String,
    /// Leading slice of the submitted text; omitted from history listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub ai_probability: f64,
    pub metrics: StoredMetrics,
    pub word_count: usize,
    pub characters: usize,
    pub detected_language: DetectedLanguage,
    pub created_at: DateTime<Utc>,
}

impl DetectionRecord {
    pub fn without_text(&self) -> Self {
        Self {
            text: None,
            ..self.clone()
        }
    }
}

// ============ Users ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

// ============ Detection Request / Response ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResponse {
    pub id: Uuid,
    pub ai_probability: f64,
    pub metrics: MetricScores,
    pub word_count: usize,
    pub characters: usize,
    pub detected_language: DetectedLanguage,
    pub timestamp: DateTime<Utc>,
}

impl From<&DetectionRecord> for DetectionResponse {
    fn from(record: &DetectionRecord) -> Self {
        Self {
            id: record.id,
            ai_probability: record.ai_probability,
            metrics: record.metrics.scores,
            word_count: record.word_count,
            characters: record.characters,
            detected_language: record.detected_language,
            timestamp: record.created_at,
        }
    }
}

// ============ Batch Detection ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemRequest {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDetectRequest {
    pub items: Vec<BatchItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<DetectionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub count: usize,
    pub fail_count: usize,
    pub avg_probability: f64,
    pub max_probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchDetectResponse {
    pub items: Vec<BatchItemResponse>,
    pub summary: BatchSummary,
}

// ============ History ============

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub detections: Vec<DetectionRecord>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
