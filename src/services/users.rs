// User Registry Service
// Accounts with salted password hashes and bearer session tokens

use crate::models::UserProfile;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

const HASH_ROUNDS: u32 = 10_000;
const MIN_PASSWORD_CHARS: usize = 6;
pub const DEFAULT_SESSION_DAYS: i64 = 7;

#[derive(Error, Debug)]
pub enum UserError {
    #[error("User already exists with this email or username")]
    AlreadyExists,
    #[error("Invalid Credentials")]
    InvalidCredentials,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Validation Error: {0}")]
    Validation(String),
    #[error("User store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("User file is invalid: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    id: Uuid,
    username: String,
    email: String,
    salt: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Only the digest of a token is kept, never the token itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    token_digest: String,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersInner {
    #[serde(default)]
    users: Vec<UserRecord>,
    #[serde(default)]
    sessions: Vec<Session>,
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone)]
pub struct UserStore {
    inner: Arc<RwLock<UsersInner>>,
    file: Option<PathBuf>,
    session_ttl: Duration,
}

impl UserStore {
    pub fn in_memory(session_days: i64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(UsersInner::default())),
            file: None,
            session_ttl: Duration::days(session_days.clamp(1, 3650)),
        }
    }

    /// Open a file-backed registry. A missing file starts empty.
    pub fn open(path: impl Into<PathBuf>, session_days: i64) -> Result<Self, UserError> {
        let path = path.into();
        let inner: UsersInner = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                UsersInner::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            UsersInner::default()
        };
        info!(path = %path.display(), users = inner.users.len(), "users.opened");

        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            file: Some(path),
            session_ttl: Duration::days(session_days.clamp(1, 3650)),
        })
    }

    /// Create an account and sign it in. Username and email must both be unused.
    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<IssuedSession, UserError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();
        validate_registration(username, &email, password)?;

        let mut inner = self.write();
        if inner
            .users
            .iter()
            .any(|u| u.email == email || u.username == username)
        {
            return Err(UserError::AlreadyExists);
        }

        let salt = random_hex();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email,
            password_hash: hash_password(&salt, password),
            salt,
            created_at: Utc::now(),
        };
        let (token, session) = self.new_session(record.id);

        inner.users.push(record.clone());
        inner.sessions.push(session);
        if let Err(e) = self.persist(&inner) {
            inner.sessions.pop();
            inner.users.pop();
            return Err(e);
        }
        info!(user_id = %record.id, username = %record.username, "users.registered");

        Ok(IssuedSession {
            token,
            user: record.profile(),
        })
    }

    /// Check credentials and issue a new session. Unknown email and wrong
    /// password are indistinguishable to the caller.
    pub fn login(&self, email: &str, password: &str) -> Result<IssuedSession, UserError> {
        let email = email.trim().to_lowercase();
        let mut inner = self.write();
        let user = inner
            .users
            .iter()
            .find(|u| u.email == email)
            .filter(|u| digests_match(&hash_password(&u.salt, password), &u.password_hash))
            .map(UserRecord::profile)
            .ok_or(UserError::InvalidCredentials)?;

        let now = Utc::now();
        let before = inner.sessions.len();
        inner.sessions.retain(|s| s.expires_at > now);
        let pruned = before - inner.sessions.len();

        let (token, session) = self.new_session(user.id);
        inner.sessions.push(session);
        // Pruned sessions were expired anyway, so only the new one is undone.
        if let Err(e) = self.persist(&inner) {
            inner.sessions.pop();
            return Err(e);
        }
        debug!(user_id = %user.id, pruned, "users.logged_in");

        Ok(IssuedSession { token, user })
    }

    /// Resolve a bearer token to its user.
    pub fn authenticate(&self, token: &str) -> Result<UserProfile, UserError> {
        let digest = token_digest(token.trim());
        let now = Utc::now();
        let inner = self.read();
        let session = inner
            .sessions
            .iter()
            .find(|s| s.token_digest == digest && s.expires_at > now)
            .ok_or(UserError::InvalidToken)?;
        inner
            .users
            .iter()
            .find(|u| u.id == session.user_id)
            .map(UserRecord::profile)
            .ok_or(UserError::InvalidToken)
    }

    pub fn profile(&self, user_id: Uuid) -> Option<UserProfile> {
        self.read()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(UserRecord::profile)
    }

    pub fn count(&self) -> usize {
        self.read().users.len()
    }

    fn new_session(&self, user_id: Uuid) -> (String, Session) {
        let token = random_hex();
        let session = Session {
            token_digest: token_digest(&token),
            user_id,
            expires_at: Utc::now() + self.session_ttl,
        };
        (token, session)
    }

    fn persist(&self, inner: &UsersInner) -> Result<(), UserError> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(inner)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, UsersInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UsersInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), UserError> {
    if username.is_empty() {
        return Err(UserError::Validation("Username is required".to_string()));
    }
    let valid_email = email
        .split_once('@')
        .map_or(false, |(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid_email {
        return Err(UserError::Validation("Please enter a valid email".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(UserError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

fn random_hex() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Iterated salted SHA-256.
fn hash_password(salt: &str, password: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..HASH_ROUNDS {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt.as_bytes())
            .finalize();
    }
    format!("{:x}", digest)
}

fn token_digest(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Compare without short-circuiting on the first differing byte.
fn digests_match(a: &str, b: &str) -> bool {
    a.len() == b.len() && a.bytes().zip(b.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
