use crate::client::{SessionKey, StoredSession};
use async_trait::async_trait;
use likeboost_common::session::{SessionStore, SessionStoreError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// File-backed session store: one JSON document mapping session labels to
/// sessions.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place.
///
/// Example
/// ```ignore
/// use likeboost::client::{CredentialSession, FileAuthStore};
/// let store = FileAuthStore::new("/tmp/likeboost-session.json");
/// let session = CredentialSession::new(store.into(), reqwest::Client::new().into(), base, key);
/// ```
#[derive(Debug)]
pub struct FileAuthStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

type Sessions = BTreeMap<SessionKey, StoredSession>;

impl FileAuthStore {
    /// Create a new file store at the given path. The file is created on
    /// the first write.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Sessions, SessionStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(data) if data.is_empty() => Ok(Sessions::new()),
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Sessions::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, sessions: &Sessions) -> Result<(), SessionStoreError> {
        let buf = serde_json::to_vec_pretty(sessions)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &buf).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore<SessionKey, StoredSession> for FileAuthStore {
    async fn get(&self, key: &SessionKey) -> Option<StoredSession> {
        let _guard = self.lock.lock().await;
        match self.load().await {
            Ok(mut sessions) => sessions.remove(key),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable session file");
                None
            }
        }
    }

    async fn set(&self, key: SessionKey, session: StoredSession) -> Result<(), SessionStoreError> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.load().await?;
        sessions.insert(key, session);
        self.save(&sessions).await
    }

    async fn del(&self, key: &SessionKey) -> Result<(), SessionStoreError> {
        let _guard = self.lock.lock().await;
        let mut sessions = self.load().await?;
        if sessions.remove(key).is_none() {
            return Ok(());
        }
        if sessions.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Ok(_) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(SessionStoreError::from(e)),
            };
        }
        self.save(&sessions).await
    }
}
