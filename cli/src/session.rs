//! The signed-in session, kept next to the recipe cache as `session.json`.

use anyhow::{Context, Result};
use recipeready_core::{FileStorage, LocalStorage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

const SESSION_KEY: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
    pub email: String,
}

pub struct SessionStore {
    storage: FileStorage,
}

impl SessionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            storage: FileStorage::new(data_dir),
        }
    }

    /// The saved session, if any. An unreadable file counts as signed out.
    pub fn load(&self) -> Result<Option<Session>> {
        let Some(raw) = self.storage.get_item(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_string_pretty(session)?;
        self.storage
            .set_item(SESSION_KEY, &json)
            .context("Failed to save session")
    }

    pub fn clear(&self) -> Result<()> {
        self.storage
            .remove_item(SESSION_KEY)
            .context("Failed to remove session")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = SessionStore::new(temp_dir.path());
        assert_eq!(store.load().unwrap(), None);

        let session = Session {
            token: "abc".to_string(),
            user_id: Uuid::new_v4(),
            email: "cook@example.com".to_string(),
        };
        store.save(&session).unwrap();
        assert!(temp_dir.path().join("session.json").exists());
        assert_eq!(store.load().unwrap(), Some(session));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_session_is_signed_out() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("session.json"), "nope").unwrap();
        let store = SessionStore::new(temp_dir.path());
        assert_eq!(store.load().unwrap(), None);
    }
}
