//! Library view: the signed-in user's books or a friend's public ones.

pub mod book;
pub mod storage;
pub mod upload;

use crate::library::book::{Book, LibraryBook, UserRef};
use crate::library::storage::StorageUsage;
use crate::reader::LocalProgress;

/// Whose books are on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewMode {
    /// The signed-in user's own collection.
    Own,
    /// A friend's public books, read-only.
    Friend(UserRef),
}

/// A list of books as the library view shows them.
#[derive(Debug, Clone)]
pub struct Collection {
    mode: ViewMode,
    books: Vec<LibraryBook>,
}

impl Collection {
    /// The viewer's own collection.
    pub fn own(books: Vec<Book>) -> Self {
        Self {
            mode: ViewMode::Own,
            books: books.into_iter().map(LibraryBook::owned).collect(),
        }
    }

    /// A friend's public books.
    pub fn friend(friend: UserRef, books: Vec<Book>) -> Self {
        Self {
            mode: ViewMode::Friend(friend),
            books: books.into_iter().map(LibraryBook::shared).collect(),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> &ViewMode {
        &self.mode
    }

    /// All books.
    pub fn books(&self) -> &[LibraryBook] {
        &self.books
    }

    /// Whether the collection has no books at all.
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Upload and delete are only offered on the own collection.
    pub fn can_manage(&self) -> bool {
        self.mode == ViewMode::Own
    }

    /// Section heading.
    pub fn heading(&self) -> String {
        match &self.mode {
            ViewMode::Own => "Your Collection".to_string(),
            ViewMode::Friend(friend) => format!("{}'s Public Books", friend.username),
        }
    }

    /// Books whose title contains `query`, ignoring case.
    pub fn filter(&self, query: &str) -> Vec<&LibraryBook> {
        let query = query.trim().to_lowercase();
        self.books
            .iter()
            .filter(|b| query.is_empty() || b.title().to_lowercase().contains(&query))
            .collect()
    }

    /// Usage meter, shown for the own collection only.
    pub fn storage_usage(&self, quota_mb: f64) -> Option<StorageUsage> {
        self.can_manage().then(|| {
            StorageUsage::from_sizes(self.books.iter().map(|b| b.info().file_size), quota_mb)
        })
    }

    /// Message for a collection with no books.
    pub fn empty_message(&self) -> &'static str {
        match self.mode {
            ViewMode::Own => "Your library is empty. Upload a PDF to start reading!",
            ViewMode::Friend(_) => "This user hasn't uploaded any public books yet.",
        }
    }
}

/// Message for a search that matched nothing.
pub fn no_match_message(query: &str) -> String {
    format!("No books found matching \"{}\".", query)
}

/// Progress line under a book card.
pub fn progress_label(book: &LibraryBook, local: &impl LocalProgress) -> String {
    match book {
        LibraryBook::Owned(owned) => {
            format!(
                "Last read: Page {}",
                owned.current_page.filter(|&p| p >= 1).unwrap_or(1)
            )
        }
        LibraryBook::Shared(shared) => match local.get(&shared.info.id) {
            Ok(Some(page)) => format!("You're on Page {}", page),
            Ok(None) => "Not started yet".to_string(),
            Err(e) => {
                tracing::warn!(book = %shared.info.id, error = %e, "Failed to read local progress");
                "Not started yet".to_string()
            }
        },
    }
}
