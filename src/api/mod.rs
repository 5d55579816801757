// Command Surface
// Front-end facing commands: validate, analyze, record history, report errors as strings

use crate::models::{
    AnalysisResult, AuthResponse, BatchDetectRequest, BatchDetectResponse, BatchItemResponse,
    BatchSummary, DeleteResponse, DetectRequest, DetectionResponse, HealthResponse, HistoryPage,
    HistoryQuery, LoginRequest, ProfileResponse, RegisterRequest, UserProfile,
};
use crate::services::config_store::{AppConfig, ConfigStore};
use crate::services::detection::{analyze, fallback_result};
use crate::services::history::{HistoryError, HistoryStore, PageLimits};
use crate::services::users::{UserError, UserStore};
use crate::services::validation::validate_text;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

/// Shared state handed to every command
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub history: HistoryStore,
    pub users: UserStore,
}

impl AppState {
    /// Build state from config; each store is file-backed when the config names a file.
    pub fn new(config: AppConfig) -> Result<Self, String> {
        let limits = page_limits(&config);
        let history = match &config.history.file {
            Some(path) => HistoryStore::open(path, limits).map_err(|e| e.to_string())?,
            None => HistoryStore::in_memory(limits),
        };
        let users = match &config.users.file {
            Some(path) => UserStore::open(path, config.users.session_days).map_err(|e| e.to_string())?,
            None => UserStore::in_memory(config.users.session_days),
        };
        Ok(Self { config, history, users })
    }

    pub fn with_stores(config: AppConfig, history: HistoryStore, users: UserStore) -> Self {
        Self { config, history, users }
    }
}

pub fn page_limits(config: &AppConfig) -> PageLimits {
    PageLimits {
        default_page_size: config.history.default_page_size,
        max_page_size: config.history.max_page_size,
    }
}

fn authenticate(state: &AppState, token: &str) -> Result<UserProfile, String> {
    state.users.authenticate(token).map_err(|e| {
        warn!("[AUTH] rejected token: {}", e);
        e.to_string()
    })
}

pub fn register(state: &AppState, request: RegisterRequest) -> Result<AuthResponse, String> {
    let session = state
        .users
        .register(&request.username, &request.email, &request.password)
        .map_err(|e| e.to_string())?;
    Ok(AuthResponse {
        message: "User created successfully".to_string(),
        token: session.token,
        user: session.user,
    })
}

pub fn login(state: &AppState, request: LoginRequest) -> Result<AuthResponse, String> {
    let session = state
        .users
        .login(&request.email, &request.password)
        .map_err(|e| e.to_string())?;
    info!(user_id = %session.user.id, "[AUTH] login");
    Ok(AuthResponse {
        message: "Login Successful".to_string(),
        token: session.token,
        user: session.user,
    })
}

pub fn get_profile(state: &AppState, token: &str) -> Result<ProfileResponse, String> {
    let user = authenticate(state, token)?;
    let user = state
        .users
        .profile(user.id)
        .ok_or_else(|| UserError::InvalidToken.to_string())?;
    Ok(ProfileResponse { user })
}

/// Run the engine on a blocking worker, optionally bounded by a deadline.
/// A crashed worker yields the fallback result; only the deadline is an error.
async fn run_analysis(text: String, timeout_ms: Option<u64>) -> Result<AnalysisResult, String> {
    let text: Arc<str> = Arc::from(text);
    let worker_text = Arc::clone(&text);
    let task = tokio::task::spawn_blocking(move || analyze(&worker_text));

    let joined = match timeout_ms {
        Some(ms) => tokio::time::timeout(Duration::from_millis(ms), task)
            .await
            .map_err(|_| format!("Analysis timed out after {} ms", ms))?,
        None => task.await,
    };

    match joined {
        Ok(result) => Ok(result),
        Err(e) => {
            warn!("[DETECT] analysis worker failed, using fallback: {}", e);
            Ok(fallback_result(text.trim()))
        }
    }
}

pub async fn detect_text(
    state: &AppState,
    token: &str,
    request: DetectRequest,
) -> Result<DetectionResponse, String> {
    let user = authenticate(state, token)?;
    let user_id = &user.id.to_string();
    let started = Instant::now();
    let detection = &state.config.detection;

    validate_text(&request.text, detection.max_text_chars).map_err(|e| e.to_string())?;

    let result = run_analysis(request.text.clone(), detection.timeout_ms).await?;
    let record = state
        .history
        .record(user_id, &request.text, &result, detection.preview_chars)
        .map_err(|e| e.to_string())?;

    info!(
        user_id,
        id = %record.id,
        ai_probability = record.ai_probability,
        word_count = record.word_count,
        language = record.detected_language.as_str(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "[DETECT] done"
    );

    Ok(DetectionResponse::from(&record))
}

/// Analyze several texts concurrently. Each item succeeds or fails on its own;
/// items come back in request order.
pub async fn detect_batch(
    state: &AppState,
    token: &str,
    request: BatchDetectRequest,
) -> Result<BatchDetectResponse, String> {
    let user = authenticate(state, token)?;
    let user_id = &user.id.to_string();
    let started = Instant::now();
    let detection = &state.config.detection;
    let semaphore = Arc::new(Semaphore::new(detection.batch_parallelism.max(1)));
    let mut outcomes: Vec<Option<Result<AnalysisResult, String>>> = vec![None; request.items.len()];
    let mut join_set = JoinSet::new();

    for (idx, item) in request.items.iter().enumerate() {
        if let Err(e) = validate_text(&item.text, detection.max_text_chars) {
            outcomes[idx] = Some(Err(e.to_string()));
            continue;
        }

        let semaphore = semaphore.clone();
        let text = item.text.clone();
        let timeout_ms = detection.timeout_ms;
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (idx, run_analysis(text, timeout_ms).await)
        });
    }

    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((idx, outcome)) => outcomes[idx] = Some(outcome),
            Err(e) => warn!("[BATCH] analysis task failed: {}", e),
        }
    }

    let mut items = Vec::with_capacity(request.items.len());
    for (item, outcome) in request.items.iter().zip(outcomes) {
        let outcome = outcome.unwrap_or_else(|| Err("Analysis task failed".to_string()));
        let recorded = outcome.and_then(|result| {
            state
                .history
                .record(user_id, &item.text, &result, detection.preview_chars)
                .map_err(|e| e.to_string())
        });
        items.push(match recorded {
            Ok(record) => BatchItemResponse {
                id: item.id.clone(),
                detection: Some(DetectionResponse::from(&record)),
                error: None,
            },
            Err(error) => BatchItemResponse {
                id: item.id.clone(),
                detection: None,
                error: Some(error),
            },
        });
    }

    let summary = summarize_batch(&items);
    info!(
        user_id,
        count = summary.count,
        fail_count = summary.fail_count,
        avg_probability = summary.avg_probability,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "[BATCH] done"
    );

    Ok(BatchDetectResponse { items, summary })
}

fn summarize_batch(items: &[BatchItemResponse]) -> BatchSummary {
    let probs: Vec<f64> = items
        .iter()
        .filter_map(|i| i.detection.as_ref().map(|d| d.ai_probability))
        .collect();
    let avg_probability = if probs.is_empty() {
        0.0
    } else {
        probs.iter().sum::<f64>() / probs.len() as f64
    };

    BatchSummary {
        count: items.len(),
        fail_count: items.len() - probs.len(),
        avg_probability,
        max_probability: probs.iter().copied().fold(0.0, f64::max),
    }
}

pub async fn get_history(
    state: &AppState,
    token: &str,
    query: HistoryQuery,
) -> Result<HistoryPage, String> {
    let user = authenticate(state, token)?;
    Ok(state.history.list(&user.id.to_string(), query))
}

pub async fn delete_detection(
    state: &AppState,
    token: &str,
    id: &str,
) -> Result<DeleteResponse, String> {
    let user = authenticate(state, token)?;
    let user_id = user.id.to_string();
    let id = Uuid::parse_str(id).map_err(|_| HistoryError::NotFound.to_string())?;
    state.history.delete(&user_id, id).map_err(|e| e.to_string())?;
    info!(user_id, %id, "[HISTORY] deleted");
    Ok(DeleteResponse {
        message: "Detection deleted successfully".to_string(),
    })
}

pub fn get_config(store: &ConfigStore) -> Result<AppConfig, String> {
    store.load().map_err(|e| e.to_string())
}

pub fn save_config(store: &ConfigStore, config: &AppConfig) -> Result<(), String> {
    store.save(config).map_err(|e| e.to_string())
}

pub fn health() -> HealthResponse {
    HealthResponse {
        status: "OK".to_string(),
        timestamp: chrono::Utc::now(),
    }
}
