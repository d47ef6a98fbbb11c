//! Session store.

use crate::db::Database;
use crate::error::Result;
use serde::Deserialize;

/// Signed-in identity, handed to every API call that needs one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// Username the token was issued for.
    pub username: String,
}

/// Persists the session across runs.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    /// Create a session store over the local database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Read the session saved on this device, if any.
    pub fn load(&self) -> Result<Option<Session>> {
        Ok(self.db.get_session()?.map(|s| Session {
            token: s.token,
            username: s.username,
        }))
    }

    /// Remember a session after a successful login.
    pub fn save(&self, session: &Session) -> Result<()> {
        self.db.save_session(&session.token, &session.username)?;
        tracing::debug!(username = %session.username, "Session saved");
        Ok(())
    }

    /// Drop the token and username. Local progress and preferences stay.
    pub fn clear(&self) -> Result<bool> {
        let existed = self.db.clear_session()?;
        if existed {
            tracing::debug!("Session cleared");
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::PREF_READER_THEME;

    fn session(token: &str, username: &str) -> Session {
        Session {
            token: token.to_string(),
            username: username.to_string(),
        }
    }

    #[test]
    fn save_and_load() {
        let store = SessionStore::new(Database::open_memory().unwrap());
        assert!(store.load().unwrap().is_none());

        store.save(&session("tok-1", "alice")).unwrap();
        assert_eq!(store.load().unwrap(), Some(session("tok-1", "alice")));

        store.save(&session("tok-2", "bob")).unwrap();
        assert_eq!(store.load().unwrap(), Some(session("tok-2", "bob")));
    }

    #[test]
    fn clear_keeps_local_progress_and_theme() {
        let db = Database::open_memory().unwrap();
        let store = SessionStore::new(db.clone());

        store.save(&session("tok-1", "alice")).unwrap();
        db.set_local_progress("book-1", 7).unwrap();
        db.set_preference(PREF_READER_THEME, "sepia").unwrap();

        assert!(store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
        assert!(!store.clear().unwrap());

        assert_eq!(db.get_local_progress("book-1").unwrap().unwrap().page, 7);
        assert_eq!(
            db.get_preference(PREF_READER_THEME).unwrap().as_deref(),
            Some("sepia")
        );
    }
}
