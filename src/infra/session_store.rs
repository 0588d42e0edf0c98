//! Key-value persistence of the signed-in session.
//!
//! The record lives under a fixed namespace in a small JSON file and holds
//! four scalar fields: user id, username, role name and a logged-in flag.
//! Passwords are never written here.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SESSION_NAMESPACE;
use crate::domain::{Session, UserRole};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Persisted session fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub user_id: i64,
    pub username: String,
    pub role: String,
    pub is_logged_in: bool,
}

impl From<&Session> for StoredSession {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username.clone(),
            role: session.role.as_str().to_string(),
            is_logged_in: true,
        }
    }
}

impl StoredSession {
    /// The live session, if this record says someone is signed in
    pub fn into_session(self) -> Option<Session> {
        self.is_logged_in.then(|| Session {
            user_id: self.user_id,
            username: self.username,
            role: UserRole::from(self.role.as_str()),
        })
    }
}

/// Session persistence trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the stored session, if any
    async fn load(&self) -> AppResult<Option<StoredSession>>;

    /// Overwrite the stored session
    async fn save(&self, session: &StoredSession) -> AppResult<()>;

    /// Forget the stored session
    async fn clear(&self) -> AppResult<()>;
}

/// JSON file backed session store
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_namespaces(&self) -> AppResult<BTreeMap<String, StoredSession>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_namespaces(&self, namespaces: &BTreeMap<String, StoredSession>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(namespaces)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> AppResult<Option<StoredSession>> {
        let mut namespaces = self.read_namespaces().await?;
        Ok(namespaces.remove(SESSION_NAMESPACE))
    }

    async fn save(&self, session: &StoredSession) -> AppResult<()> {
        let mut namespaces = self.read_namespaces().await?;
        namespaces.insert(SESSION_NAMESPACE.to_string(), session.clone());
        self.write_namespaces(&namespaces).await
    }

    async fn clear(&self) -> AppResult<()> {
        let mut namespaces = self.read_namespaces().await?;
        if namespaces.remove(SESSION_NAMESPACE).is_some() {
            self.write_namespaces(&namespaces).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("shopkeeper-{}-{}", std::process::id(), name))
            .join("session.json")
    }

    fn stored() -> StoredSession {
        StoredSession {
            user_id: 42,
            username: "morgan".to_string(),
            role: "MANAGER".to_string(),
            is_logged_in: true,
        }
    }

    #[tokio::test]
    async fn test_missing_file_loads_nothing() {
        let store = FileSessionStore::new(temp_path("missing"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let path = temp_path("save-load");
        let store = FileSessionStore::new(&path);

        store.save(&stored()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(stored()));

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains(SESSION_NAMESPACE));
        assert!(!raw.contains("password"));

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_logged_out_record_has_no_session() {
        let mut record = stored();
        assert_eq!(record.clone().into_session().unwrap().role, UserRole::Manager);

        record.is_logged_in = false;
        assert!(record.into_session().is_none());
    }
}
