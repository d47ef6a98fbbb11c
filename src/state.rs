//! Application state shared by every command.

use crate::api::ApiClient;
use crate::config::Config;
use crate::db::Database;
use crate::document::{self, DocumentCache};
use crate::error::{AppError, Result};
use crate::library::book::LibraryBook;
use crate::reader::{Navigation, PageTurn, PersistOutcome, Reader, Theme};
use crate::session::{Session, SessionStore};
use std::sync::Arc;

/// What opening a book led to.
#[derive(Debug)]
pub enum OpenedBook {
    /// The book could not be fetched (deleted, private); show the library.
    Unavailable,
    /// The book is open.
    Reading {
        /// Reader positioned on the resume page, or after `turn`.
        reader: Reader,
        /// Outcome of the requested navigation, if any.
        turn: Option<PageTurn>,
    },
}

/// Everything a command needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<Config>,
    /// Client-local database.
    pub db: Database,
    /// Downloaded documents.
    pub documents: DocumentCache,
    sessions: SessionStore,
    api: ApiClient,
}

impl AppState {
    /// Open local state and restore the saved session.
    pub fn new(config: Config, db: Database) -> Result<Self> {
        let sessions = SessionStore::new(db.clone());
        let session = sessions.load()?;
        let api = ApiClient::new(&config.api.base_url, config.api.timeout())?.with_session(session);
        let documents = DocumentCache::new(config.storage.cache_dir.clone());

        Ok(Self {
            config: Arc::new(config),
            db,
            documents,
            sessions,
            api,
        })
    }

    /// API client carrying the current session.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Current session, if signed in.
    pub fn session(&self) -> Option<&Session> {
        self.api.session()
    }

    /// Signed-in username.
    pub fn username(&self) -> Option<&str> {
        self.session().map(|s| s.username.as_str())
    }

    /// Fail early when nobody is signed in.
    pub fn require_session(&self) -> Result<&Session> {
        self.session().ok_or(AppError::Unauthorized)
    }

    /// Adopt a fresh session and remember it.
    pub fn sign_in(&mut self, session: Session) -> Result<()> {
        self.sessions.save(&session)?;
        self.api = self.api.clone().with_session(Some(session));
        Ok(())
    }

    /// Drop the session. Returns whether one existed.
    pub fn sign_out(&mut self) -> Result<bool> {
        let existed = self.sessions.clear()?;
        self.api = self.api.clone().with_session(None);
        Ok(existed)
    }

    /// Sign out after the API rejected the token.
    pub fn force_logout(&mut self) {
        tracing::warn!(username = ?self.username(), "Forcing logout");
        if let Err(e) = self.sign_out() {
            tracing::error!(error = %e, "Failed to clear session");
        }
    }

    /// Pass a command result through, ending the session first when the
    /// API rejected the token.
    pub fn end_session_on_rejection<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result
            && e.is_auth_rejection()
        {
            self.force_logout();
        }
        result
    }

    /// Fetch a book, load its document and apply `nav`.
    ///
    /// A book that cannot be fetched is [`OpenedBook::Unavailable`]; only a
    /// rejected token is an error. A missing document leaves navigation
    /// disabled.
    pub async fn open_book(&self, book_id: &str, nav: Option<Navigation>) -> Result<OpenedBook> {
        self.require_session()?;

        let book = match self.api.get_book(book_id).await {
            Ok(book) => book,
            Err(e) if e.is_auth_rejection() => return Err(e),
            Err(e) => {
                tracing::warn!(book = %book_id, error = %e, "Failed to load book");
                return Ok(OpenedBook::Unavailable);
            }
        };

        let book = LibraryBook::classify(book, self.username());
        let mut reader = Reader::open(book, &self.db);

        match self.load_document(reader.book()).await {
            Ok(pages) => reader.document_loaded(pages),
            Err(e) if e.is_auth_rejection() => return Err(e),
            Err(e) => {
                tracing::warn!(book = %book_id, error = %e, "Document unavailable, navigation disabled");
            }
        }

        let turn = match nav {
            Some(nav) => {
                let turn = reader.navigate(nav, &self.api, &self.db).await;
                if let PageTurn::Moved {
                    persisted: PersistOutcome::Rejected,
                    ..
                } = turn
                {
                    return Err(AppError::Unauthorized);
                }
                Some(turn)
            }
            None => None,
        };

        Ok(OpenedBook::Reading { reader, turn })
    }

    /// Download the document and count its pages, falling back to a cached copy.
    async fn load_document(&self, book: &LibraryBook) -> Result<u32> {
        let url = book.info().file_url(self.api.base_url());

        let path = match self.api.download(&url).await {
            Ok(bytes) => self.documents.store(book.id(), &bytes).await?,
            Err(e) if e.is_auth_rejection() => return Err(e),
            Err(e) => match self.documents.cached(book.id()) {
                Some(path) => {
                    tracing::info!(error = %e, "Download failed, using cached document");
                    path
                }
                None => return Err(e),
            },
        };

        let info = document::inspect_file(path.clone()).await?;
        tracing::debug!(path = %path.display(), pages = info.page_count, "Document loaded");
        Ok(info.page_count)
    }

    /// Reader theme in effect.
    pub fn theme(&self) -> Theme {
        Theme::load(&self.db, self.config.reader.default_theme).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load theme");
            self.config.reader.default_theme
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        let mut config = Config::default();
        config.api.base_url = "http://127.0.0.1:9/".to_string();
        AppState::new(config, Database::open_memory().unwrap()).unwrap()
    }

    #[test]
    fn starts_signed_out() {
        let state = state();
        assert!(state.session().is_none());
        assert!(matches!(state.require_session(), Err(AppError::Unauthorized)));
        assert_eq!(state.api().base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn restores_saved_session() {
        let db = Database::open_memory().unwrap();
        db.save_session("tok", "alice").unwrap();
        let state = AppState::new(Config::default(), db).unwrap();
        assert_eq!(state.username(), Some("alice"));
        assert_eq!(state.api().session().map(|s| s.token.as_str()), Some("tok"));
    }

    #[test]
    fn sign_in_and_forced_logout() {
        let mut state = state();
        state
            .sign_in(Session {
                token: "tok".to_string(),
                username: "alice".to_string(),
            })
            .unwrap();
        assert_eq!(state.username(), Some("alice"));
        assert!(state.db.get_session().unwrap().is_some());

        state.force_logout();
        assert!(state.session().is_none());
        assert!(state.db.get_session().unwrap().is_none());
    }

    #[test]
    fn rejection_ends_session_other_errors_do_not() {
        let mut state = state();
        state
            .sign_in(Session {
                token: "tok".to_string(),
                username: "alice".to_string(),
            })
            .unwrap();

        let result: Result<()> = Err(AppError::NotFound("b1".to_string()));
        assert!(state.end_session_on_rejection(result).is_err());
        assert!(state.session().is_some());

        let result: Result<()> = Err(AppError::Unauthorized);
        assert!(state.end_session_on_rejection(result).is_err());
        assert!(state.session().is_none());
        assert!(state.db.get_session().unwrap().is_none());
    }

    #[test]
    fn theme_defaults_from_config() {
        let mut config = Config::default();
        config.reader.default_theme = Theme::Light;
        let state = AppState::new(config, Database::open_memory().unwrap()).unwrap();
        assert_eq!(state.theme(), Theme::Light);

        Theme::Sepia.save(&state.db).unwrap();
        assert_eq!(state.theme(), Theme::Sepia);
    }
}
