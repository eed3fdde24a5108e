//! File-based session store: one pretty-printed JSON file per session.
//!
//! Layout: `{dir}/session_{id}.json`, UTF-8, 2-space indentation, non-ASCII
//! kept literal. Files are human-inspectable and can be edited or removed by
//! hand while the service is stopped.
//!
//! The directory is assumed to be owned by a single process.

use async_trait::async_trait;
use navigator_core::error::StoreError;
use navigator_core::message::Message;
use navigator_core::session::{Session, SessionId, SessionStore, now_timestamp};
use std::collections::BTreeMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const FILE_PREFIX: &str = "session_";
const FILE_EXTENSION: &str = ".json";

/// In-flight writes are staged under hidden names that listing never picks up.
const TEMP_PREFIX: &str = ".session_";
const TEMP_SUFFIX: &str = ".tmp";

/// How many successive ids `create` tries before giving up.
const MAX_CREATE_ATTEMPTS: usize = 16;

/// A directory of session files.
pub struct FileSessionStore {
    dir: PathBuf,
    skip_malformed: bool,
    io_timeout: Duration,
}

impl FileSessionStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            skip_malformed: false,
            io_timeout: Duration::from_secs(10),
        }
    }

    /// Skip unparseable files when listing instead of failing the listing.
    pub fn with_skip_malformed(mut self, skip: bool) -> Self {
        self.skip_malformed = skip;
        self
    }

    /// Bound every storage operation by `timeout`.
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing session `id`.
    pub fn session_path(&self, id: SessionId) -> PathBuf {
        self.dir.join(format!("{FILE_PREFIX}{id}{FILE_EXTENSION}"))
    }

    fn is_session_file(name: &str) -> bool {
        name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION)
    }

    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.io_timeout, op)
            .await
            .map_err(|_| StoreError::Timeout {
                secs: self.io_timeout.as_secs(),
            })?
    }

    async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StoreError::Write {
                path: self.dir.clone(),
                reason: format!("Failed to create sessions directory: {e}"),
            })
    }

    fn encode(session: &Session, path: &Path) -> Result<String, StoreError> {
        serde_json::to_string_pretty(session).map_err(|e| StoreError::Write {
            path: path.to_path_buf(),
            reason: format!("Failed to serialize session: {e}"),
        })
    }

    fn decode(content: &str, path: &Path) -> Result<Session, StoreError> {
        serde_json::from_str(content).map_err(|e| StoreError::Read {
            path: path.to_path_buf(),
            reason: format!("Malformed session file: {e}"),
        })
    }

    /// Stage `content` in a fresh temp file next to `path`, then move it into
    /// place. Each write gets its own temp file, so concurrent writers never
    /// share one, and readers see either the previous file or the complete
    /// new one. With `overwrite` unset an existing `path` is left untouched and
    /// the move fails with `AlreadyExists`.
    fn persist_blocking(
        dir: &Path,
        path: &Path,
        content: &[u8],
        overwrite: bool,
    ) -> std::io::Result<()> {
        use std::io::Write as _;

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;

        let persisted = if overwrite {
            tmp.persist(path)
        } else {
            tmp.persist_noclobber(path)
        };
        persisted.map(|_| ()).map_err(|e| e.error)
    }

    /// Run [`Self::persist_blocking`] off the async runtime.
    ///
    /// The blocking task runs to completion even if the caller is cancelled
    /// by the I/O timeout, so a timed-out write never leaves a partial file.
    async fn persist(
        &self,
        path: &Path,
        content: String,
        overwrite: bool,
    ) -> std::io::Result<()> {
        let dir = self.dir.clone();
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            Self::persist_blocking(&dir, &path, content.as_bytes(), overwrite)
        })
        .await
        .map_err(std::io::Error::other)?
    }

    async fn list_inner(&self) -> Result<BTreeMap<SessionId, Session>, StoreError> {
        let mut sessions = BTreeMap::new();

        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(sessions),
            Err(e) => {
                return Err(StoreError::Read {
                    path: self.dir.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let dir_err = |e: std::io::Error| StoreError::Read {
            path: self.dir.clone(),
            reason: e.to_string(),
        };

        while let Some(entry) = entries.next_entry().await.map_err(dir_err)? {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !Self::is_session_file(name) {
                continue;
            }

            let path = entry.path();
            let read = match tokio::fs::read_to_string(&path).await {
                Ok(content) => Self::decode(&content, &path),
                // Deleted since the directory was scanned.
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => Err(StoreError::Read {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
            };

            match read {
                Ok(session) => {
                    sessions.insert(session.id, session);
                }
                Err(e) if self.skip_malformed => {
                    warn!(error = %e, "Skipping unreadable session file");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(dir = %self.dir.display(), count = sessions.len(), "Sessions listed");
        Ok(sessions)
    }

    async fn get_inner(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        let path = self.session_path(id);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Self::decode(&content, &path).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read {
                path,
                reason: e.to_string(),
            }),
        }
    }

    async fn create_inner(&self) -> Result<Session, StoreError> {
        self.ensure_dir().await?;

        let mut id = SessionId::generate();
        for _ in 0..MAX_CREATE_ATTEMPTS {
            let session = Session::new(id);
            let path = self.session_path(id);
            let content = Self::encode(&session, &path)?;

            let persisted = self.persist(&path, content, false).await;
            match persisted {
                Ok(()) => {
                    info!(session_id = %id, "Session created");
                    return Ok(session);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(session_id = %id, "Session id taken, trying the next millisecond");
                    id = id.next();
                }
                Err(e) => {
                    return Err(StoreError::Write {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(StoreError::Write {
            path: self.dir.clone(),
            reason: format!("No free session id after {MAX_CREATE_ATTEMPTS} attempts"),
        })
    }

    async fn update_inner(
        &self,
        id: SessionId,
        created_at: Option<String>,
        messages: Vec<Message>,
    ) -> Result<Session, StoreError> {
        self.ensure_dir().await?;

        let session = Session {
            id,
            created_at: created_at.unwrap_or_else(now_timestamp),
            messages,
        };
        let path = self.session_path(id);
        let content = Self::encode(&session, &path)?;
        if let Err(e) = self.persist(&path, content, true).await {
            return Err(StoreError::Write {
                path,
                reason: e.to_string(),
            });
        }

        debug!(session_id = %id, messages = session.messages.len(), "Session saved");
        Ok(session)
    }

    async fn delete_inner(&self, id: SessionId) -> Result<bool, StoreError> {
        let path = self.session_path(id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(session_id = %id, "Session deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Write {
                path,
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn list(&self) -> Result<BTreeMap<SessionId, Session>, StoreError> {
        self.bounded(self.list_inner()).await
    }

    async fn get(&self, id: SessionId) -> Result<Option<Session>, StoreError> {
        self.bounded(self.get_inner(id)).await
    }

    async fn create(&self) -> Result<Session, StoreError> {
        self.bounded(self.create_inner()).await
    }

    async fn update(
        &self,
        id: SessionId,
        created_at: Option<String>,
        messages: Vec<Message>,
    ) -> Result<Session, StoreError> {
        self.bounded(self.update_inner(id, created_at, messages))
            .await
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StoreError> {
        self.bounded(self.delete_inner(id)).await
    }
}
