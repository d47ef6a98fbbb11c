//! Reading progress reconciliation.
//!
//! Owned books resume from, and save to, the server. Shared books resume
//! from, and save to, this device only. The server value of a shared book
//! is never read or written.

use crate::db::Database;
use crate::error::Result;
use crate::library::book::LibraryBook;
use std::future::Future;

/// Device-local progress for books the viewer does not own.
pub trait LocalProgress {
    /// Saved page for a book, if any.
    fn get(&self, book_id: &str) -> Result<Option<u32>>;

    /// Save the page for a book.
    fn set(&self, book_id: &str, page: u32) -> Result<()>;
}

/// Server-side progress for books the viewer owns.
pub trait RemoteProgress {
    /// Persist the owner's current page.
    fn set_current_page(&self, book_id: &str, page: u32) -> impl Future<Output = Result<()>>;
}

impl LocalProgress for Database {
    fn get(&self, book_id: &str) -> Result<Option<u32>> {
        Ok(self.get_local_progress(book_id)?.map(|entry| entry.page))
    }

    fn set(&self, book_id: &str, page: u32) -> Result<()> {
        self.set_local_progress(book_id, page)
    }
}

/// Result of persisting a page change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The page was stored.
    Saved,
    /// Storing failed; the displayed page is kept anyway.
    Failed,
    /// The API rejected the session token; the caller must sign out.
    Rejected,
}

/// A requested page move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Relative move, usually -1 or +1.
    Offset(i64),
    /// Jump to a page.
    GoTo(u32),
}

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTurn {
    /// Out of range, or the page count is not known yet.
    Ignored,
    /// The displayed page changed.
    Moved {
        /// New page.
        page: u32,
        /// Whether the new page was stored.
        persisted: PersistOutcome,
    },
}

/// Page to open a book at.
pub fn initial_page(book: &LibraryBook, local: &impl LocalProgress) -> u32 {
    match book {
        LibraryBook::Owned(owned) => owned.current_page.filter(|&p| p >= 1).unwrap_or(1),
        LibraryBook::Shared(shared) => match local.get(&shared.info.id) {
            Ok(page) => page.filter(|&p| p >= 1).unwrap_or(1),
            Err(e) => {
                tracing::warn!(book = %shared.info.id, error = %e, "Failed to read local progress");
                1
            }
        },
    }
}

/// Store a new page where it belongs for this book.
///
/// Failures are logged, never retried; the next page change overwrites.
/// A rejected token is reported as [`PersistOutcome::Rejected`] so the
/// session can be ended.
pub async fn on_page_change(
    book: &LibraryBook,
    new_page: u32,
    remote: &impl RemoteProgress,
    local: &impl LocalProgress,
) -> PersistOutcome {
    let result = match book {
        LibraryBook::Owned(owned) => remote.set_current_page(&owned.info.id, new_page).await,
        LibraryBook::Shared(shared) => local.set(&shared.info.id, new_page),
    };

    match result {
        Ok(()) => {
            tracing::debug!(book = %book.id(), page = new_page, owned = book.is_owned(), "Progress saved");
            PersistOutcome::Saved
        }
        Err(e) if e.is_auth_rejection() => {
            tracing::warn!(book = %book.id(), page = new_page, "Progress not saved, session rejected");
            PersistOutcome::Rejected
        }
        Err(e) => {
            tracing::warn!(book = %book.id(), page = new_page, error = %e, "Failed to save progress");
            PersistOutcome::Failed
        }
    }
}

/// An open book and where the reader is in it.
#[derive(Debug, Clone)]
pub struct Reader {
    book: LibraryBook,
    page: u32,
    total_pages: Option<u32>,
}

impl Reader {
    /// Open a book at its resume page. The page count is unknown until the
    /// document is loaded.
    pub fn open(book: LibraryBook, local: &impl LocalProgress) -> Self {
        let page = initial_page(&book, local);
        Self {
            book,
            page,
            total_pages: None,
        }
    }

    /// The open book.
    pub fn book(&self) -> &LibraryBook {
        &self.book
    }

    /// Displayed page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Page count, once the document has loaded.
    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    /// Record the page count of the loaded document.
    ///
    /// A resume page past the end (stale progress on a replaced file) is
    /// pulled back to the last page for display only.
    pub fn document_loaded(&mut self, total_pages: u32) {
        if total_pages == 0 {
            tracing::warn!(book = %self.book.id(), "Document has no pages");
            return;
        }

        self.total_pages = Some(total_pages);
        if self.page > total_pages {
            self.page = total_pages;
        }
    }

    /// Whether a previous page exists.
    pub fn can_go_back(&self) -> bool {
        self.total_pages.is_some() && self.page > 1
    }

    /// Whether a next page exists.
    pub fn can_go_forward(&self) -> bool {
        self.total_pages.is_some_and(|total| self.page < total)
    }

    /// Page a navigation would land on, if it is allowed.
    pub fn target(&self, nav: Navigation) -> Option<u32> {
        let total = self.total_pages?;
        let target = match nav {
            Navigation::Offset(offset) => i64::from(self.page).checked_add(offset)?,
            Navigation::GoTo(page) => i64::from(page),
        };

        (1..=i64::from(total))
            .contains(&target)
            .then(|| target as u32)
    }

    /// Move to another page and store it.
    ///
    /// The displayed page changes before persistence and stays changed if
    /// persistence fails.
    pub async fn navigate(
        &mut self,
        nav: Navigation,
        remote: &impl RemoteProgress,
        local: &impl LocalProgress,
    ) -> PageTurn {
        let Some(page) = self.target(nav) else {
            tracing::debug!(book = %self.book.id(), ?nav, "Navigation ignored");
            return PageTurn::Ignored;
        };

        self.page = page;
        let persisted = on_page_change(&self.book, page, remote, local).await;
        PageTurn::Moved { page, persisted }
    }
}
