//! Book model.

use serde::{Deserialize, Serialize};

/// A user as the API references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    /// User ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Username.
    pub username: String,
}

/// Book owner, either a bare ID or a populated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    /// Populated owner.
    User(UserRef),
    /// Owner ID only.
    Id(String),
}

/// Book record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier for the book.
    #[serde(rename = "_id")]
    pub id: String,

    /// Book title.
    pub title: String,

    /// Uploader.
    #[serde(default)]
    pub owner: Option<OwnerRef>,

    /// Whether accepted friends can read it.
    #[serde(default)]
    pub is_public: bool,

    /// Reference to the PDF, absolute URL or path relative to the API.
    #[serde(rename = "pdfUrl")]
    pub file_ref: String,

    /// Reference to the cover image.
    #[serde(rename = "coverImage", default)]
    pub cover_ref: Option<String>,

    /// File size in bytes.
    #[serde(default)]
    pub file_size: Option<u64>,

    /// Owner's last page. Meaningless for anyone else.
    #[serde(default)]
    pub current_page: Option<u32>,

    /// Whether the requester owns the book, when the API says so.
    #[serde(default)]
    pub is_owner: Option<bool>,
}

/// Everything about a book except the reading position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInfo {
    /// Book ID.
    pub id: String,
    /// Book title.
    pub title: String,
    /// Uploader.
    pub owner: Option<OwnerRef>,
    /// Whether accepted friends can read it.
    pub is_public: bool,
    /// Reference to the PDF.
    pub file_ref: String,
    /// Reference to the cover image.
    pub cover_ref: Option<String>,
    /// File size in bytes.
    pub file_size: Option<u64>,
}

impl BookInfo {
    /// URL of the PDF.
    pub fn file_url(&self, base_url: &str) -> String {
        resolve_reference(base_url, &self.file_ref)
    }

    /// URL of the cover, if the book has one.
    pub fn cover_url(&self, base_url: &str) -> Option<String> {
        self.cover_ref
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(|r| resolve_reference(base_url, r))
    }

    /// Public/private badge.
    pub fn visibility_label(&self) -> &'static str {
        if self.is_public { "Public" } else { "Private" }
    }
}

/// A book the viewer uploaded. Its progress lives on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedBook {
    /// Book details.
    pub info: BookInfo,
    /// Page saved on the server.
    pub current_page: Option<u32>,
}

/// Someone else's book. Its progress lives only on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedBook {
    /// Book details.
    pub info: BookInfo,
}

/// A book seen from the viewer's side.
///
/// The server page only survives classification for owned books, so a
/// shared book cannot resume from (or write to) the owner's position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibraryBook {
    /// Uploaded by the viewer.
    Owned(OwnedBook),
    /// Uploaded by a friend.
    Shared(SharedBook),
}

impl LibraryBook {
    /// Classify a book for `viewer`.
    ///
    /// The API's `isOwner` flag wins. Without it, a populated owner is
    /// compared by username. Anything undecidable is shared.
    pub fn classify(book: Book, viewer: Option<&str>) -> Self {
        let owned = match (book.is_owner, &book.owner, viewer) {
            (Some(flag), _, _) => flag,
            (None, Some(OwnerRef::User(owner)), Some(viewer)) => owner.username == viewer,
            _ => false,
        };

        if owned {
            Self::owned(book)
        } else {
            Self::shared(book)
        }
    }

    /// Treat a book as the viewer's own.
    pub fn owned(book: Book) -> Self {
        let current_page = book.current_page;
        LibraryBook::Owned(OwnedBook {
            info: BookInfo::from(book),
            current_page,
        })
    }

    /// Treat a book as someone else's.
    pub fn shared(book: Book) -> Self {
        LibraryBook::Shared(SharedBook {
            info: BookInfo::from(book),
        })
    }

    /// Book details.
    pub fn info(&self) -> &BookInfo {
        match self {
            LibraryBook::Owned(b) => &b.info,
            LibraryBook::Shared(b) => &b.info,
        }
    }

    /// Book ID.
    pub fn id(&self) -> &str {
        &self.info().id
    }

    /// Book title.
    pub fn title(&self) -> &str {
        &self.info().title
    }

    /// Whether the viewer owns this book.
    pub fn is_owned(&self) -> bool {
        matches!(self, LibraryBook::Owned(_))
    }
}

impl From<Book> for BookInfo {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            owner: book.owner,
            is_public: book.is_public,
            file_ref: book.file_ref,
            cover_ref: book.cover_ref,
            file_size: book.file_size,
        }
    }
}

/// Turn a stored file reference into a URL.
///
/// Absolute URLs are kept. Relative paths (possibly with Windows
/// separators) are joined onto the API base URL.
pub fn resolve_reference(base_url: &str, reference: &str) -> String {
    if reference.starts_with("http://") || reference.starts_with("https://") {
        return reference.to_string();
    }

    let path = reference.replace('\\', "/");
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book_json(extra: serde_json::Value) -> Book {
        let mut value = json!({
            "_id": "b1",
            "title": "Dune",
            "pdfUrl": "uploads\\dune.pdf",
            "currentPage": 42,
        });
        if let (Some(obj), Some(extra)) = (value.as_object_mut(), extra.as_object()) {
            obj.extend(extra.clone());
        }
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserializes_api_record() {
        let book = book_json(json!({
            "owner": "u1",
            "isPublic": true,
            "coverImage": "https://cdn.example.com/c.png",
            "fileSize": 2048,
            "isOwner": true,
        }));
        assert_eq!(book.id, "b1");
        assert!(book.is_public);
        assert_eq!(book.owner, Some(OwnerRef::Id("u1".to_string())));
        assert_eq!(book.file_size, Some(2048));
        assert_eq!(book.current_page, Some(42));
        assert_eq!(book.is_owner, Some(true));
    }

    #[test]
    fn owner_flag_decides() {
        let book = book_json(json!({ "isOwner": false }));
        assert!(!LibraryBook::classify(book, Some("alice")).is_owned());

        let book = book_json(json!({ "isOwner": true }));
        assert!(LibraryBook::classify(book, None).is_owned());
    }

    #[test]
    fn populated_owner_compared_by_username() {
        let owner = json!({ "owner": { "_id": "u1", "username": "alice" } });
        assert!(LibraryBook::classify(book_json(owner.clone()), Some("alice")).is_owned());
        assert!(!LibraryBook::classify(book_json(owner), Some("bob")).is_owned());
    }

    #[test]
    fn unknown_ownership_is_shared() {
        let book = book_json(json!({ "owner": "u1" }));
        assert!(!LibraryBook::classify(book, Some("alice")).is_owned());
        assert!(!LibraryBook::classify(book_json(json!({})), None).is_owned());
    }

    #[test]
    fn shared_book_drops_server_page() {
        match LibraryBook::shared(book_json(json!({}))) {
            LibraryBook::Shared(shared) => assert_eq!(shared.info.id, "b1"),
            LibraryBook::Owned(_) => panic!("expected shared book"),
        }
        match LibraryBook::owned(book_json(json!({}))) {
            LibraryBook::Owned(owned) => assert_eq!(owned.current_page, Some(42)),
            LibraryBook::Shared(_) => panic!("expected owned book"),
        }
    }

    #[test]
    fn resolves_references() {
        let base = "https://api.example.com/";
        assert_eq!(
            resolve_reference(base, "uploads\\dune.pdf"),
            "https://api.example.com/uploads/dune.pdf"
        );
        assert_eq!(
            resolve_reference(base, "/uploads/dune.pdf"),
            "https://api.example.com/uploads/dune.pdf"
        );
        assert_eq!(
            resolve_reference(base, "https://cdn.example.com/dune.pdf"),
            "https://cdn.example.com/dune.pdf"
        );

        let info = BookInfo::from(book_json(json!({ "coverImage": "" })));
        assert_eq!(info.cover_url(base), None);

        let info = BookInfo::from(book_json(json!({ "coverImage": "covers\\dune.png" })));
        assert_eq!(
            info.cover_url(base).as_deref(),
            Some("https://api.example.com/covers/dune.png")
        );
    }
}
