// Detection History Service
// Per-user record of past analyses, newest first, optionally backed by a JSON file

use crate::models::{AnalysisResult, DetectionRecord, HistoryPage, HistoryQuery, Pagination};
use crate::services::text_processor::truncate_chars;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Detection not found")]
    NotFound,
    #[error("History I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("History file is invalid: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Default)]
struct HistoryInner {
    /// Insertion order; listings reverse it
    records: Vec<DetectionRecord>,
}

#[derive(Debug, Clone)]
pub struct HistoryStore {
    inner: Arc<RwLock<HistoryInner>>,
    file: Option<PathBuf>,
    limits: PageLimits,
}

impl HistoryStore {
    pub fn in_memory(limits: PageLimits) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryInner::default())),
            file: None,
            limits,
        }
    }

    /// Open a file-backed store. A missing file starts an empty history.
    pub fn open(path: impl Into<PathBuf>, limits: PageLimits) -> Result<Self, HistoryError> {
        let path = path.into();
        let records: Vec<DetectionRecord> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };
        info!(path = %path.display(), records = records.len(), "history.opened");

        Ok(Self {
            inner: Arc::new(RwLock::new(HistoryInner { records })),
            file: Some(path),
            limits,
        })
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Store the result of one analysis. Only the first `preview_chars`
    /// characters of the submitted text are kept.
    pub fn record(
        &self,
        user_id: &str,
        text: &str,
        result: &AnalysisResult,
        preview_chars: usize,
    ) -> Result<DetectionRecord, HistoryError> {
        let record = DetectionRecord {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            text: Some(truncate_chars(text, preview_chars).to_string()),
            ai_probability: result.ai_probability,
            metrics: result.metrics.into(),
            word_count: result.word_count,
            characters: result.characters,
            detected_language: result.detected_language,
            created_at: chrono::Utc::now(),
        };

        let mut inner = self.write();
        inner.records.push(record.clone());
        if let Err(e) = self.persist(&inner) {
            inner.records.pop();
            return Err(e);
        }
        debug!(user_id, id = %record.id, "history.recorded");
        Ok(record)
    }

    /// Newest-first page of a user's detections, with the stored text omitted.
    pub fn list(&self, user_id: &str, query: HistoryQuery) -> HistoryPage {
        let page = query.page.filter(|&p| p > 0).unwrap_or(1);
        let limit = query
            .limit
            .filter(|&l| l > 0)
            .unwrap_or(self.limits.default_page_size)
            .min(self.limits.max_page_size)
            .max(1);

        let inner = self.read();
        let owned: Vec<&DetectionRecord> = inner
            .records
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id)
            .collect();
        let total = owned.len();

        let detections = owned
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .map(DetectionRecord::without_text)
            .collect();

        HistoryPage {
            detections,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        }
    }

    pub fn get(&self, user_id: &str, id: Uuid) -> Option<DetectionRecord> {
        self.read()
            .records
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned()
    }

    /// Delete a detection owned by `user_id`.
    pub fn delete(&self, user_id: &str, id: Uuid) -> Result<(), HistoryError> {
        let mut inner = self.write();
        let pos = inner
            .records
            .iter()
            .position(|r| r.id == id && r.user_id == user_id)
            .ok_or(HistoryError::NotFound)?;
        let removed = inner.records.remove(pos);
        if let Err(e) = self.persist(&inner) {
            inner.records.insert(pos, removed);
            return Err(e);
        }
        debug!(user_id, %id, "history.deleted");
        Ok(())
    }

    pub fn count(&self, user_id: &str) -> usize {
        self.read().records.iter().filter(|r| r.user_id == user_id).count()
    }

    fn persist(&self, inner: &HistoryInner) -> Result<(), HistoryError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&inner.records)?;
        fs::write(path, content)?;
        Ok(())
    }

    // A panic while holding the lock leaves the records intact, so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HistoryInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HistoryInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
