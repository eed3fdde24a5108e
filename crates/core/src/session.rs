//! Session domain types and the storage trait.
//!
//! A session is a saved conversation: a numeric id (milliseconds since the
//! epoch at creation), a creation timestamp, and the ordered messages.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::message::{Message, Role};

/// Unique identifier for a session. Immutable after creation and the sole key
/// of the session's backing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i64);

impl SessionId {
    /// Id for a session created right now.
    pub fn generate() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// The id one millisecond later. Used to step past a collision.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A persisted conversation.
///
/// Field order here is the on-disk field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,

    /// ISO-8601 creation timestamp. Caller-supplied values are kept verbatim.
    pub created_at: String,

    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    /// A new, empty session stamped with the current time.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            created_at: now_timestamp(),
            messages: Vec::new(),
        }
    }

    /// Human-readable title for session pickers.
    ///
    /// Uses the first user message, collapsed to one line and cut at
    /// `max_len` characters; falls back to the creation date.
    pub fn title(&self, max_len: usize) -> String {
        if self.messages.is_empty() {
            return format!("New Chat - {}", self.display_date());
        }

        match self.messages.iter().find(|m| m.role == Role::User) {
            Some(msg) => {
                let content = msg.content.replace('\n', " ");
                let content = content.trim();
                if content.chars().count() > max_len {
                    let truncated: String = content.chars().take(max_len).collect();
                    format!("💬 {truncated}...")
                } else {
                    format!("💬 {content}")
                }
            }
            None => format!("📝 Chat - {}", self.display_date()),
        }
    }

    /// `created_at` rendered as e.g. `Jan 5, 3:07 PM`, or verbatim when it
    /// does not parse.
    fn display_date(&self) -> String {
        const FORMAT: &str = "%b %-d, %-I:%M %p";

        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.created_at) {
            return ts.format(FORMAT).to_string();
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(&self.created_at, "%Y-%m-%dT%H:%M:%S%.f") {
            return ts.format(FORMAT).to_string();
        }
        self.created_at.clone()
    }
}

/// Current time as an RFC 3339 timestamp with millisecond precision.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Persistence for sessions.
///
/// Implementations perform no per-id locking: two concurrent updates to the
/// same id race and the last writer wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// A human-readable name for this store (e.g. "file").
    fn name(&self) -> &str;

    /// All sessions, keyed by id.
    async fn list(&self) -> Result<BTreeMap<SessionId, Session>, StoreError>;

    /// One session, or `None` when absent.
    async fn get(&self, id: SessionId) -> Result<Option<Session>, StoreError>;

    /// Create and persist a new empty session.
    async fn create(&self) -> Result<Session, StoreError>;

    /// Replace (or create) the session with this id. A full overwrite: the
    /// given messages become the whole history, and `created_at` defaults to
    /// now when not supplied.
    async fn update(
        &self,
        id: SessionId,
        created_at: Option<String>,
        messages: Vec<Message>,
    ) -> Result<Session, StoreError>;

    /// Remove a session. Returns whether anything was removed.
    async fn delete(&self, id: SessionId) -> Result<bool, StoreError>;
}
