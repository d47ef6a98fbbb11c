//! PDF documents: page counting, embedded titles and the download cache.

use crate::error::{AppError, Result};
use lopdf::Document;
use std::path::{Path, PathBuf};

/// What the client needs to know about a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    /// Number of pages.
    pub page_count: u32,
    /// Title from the document info dictionary.
    pub title: Option<String>,
}

/// Inspect a PDF on disk.
pub fn inspect(path: &Path) -> Result<PdfInfo> {
    let doc = Document::load(path).map_err(|e| AppError::Pdf(e.to_string()))?;
    Ok(describe(&doc))
}

/// Inspect a PDF on disk from async code, off the runtime threads.
pub async fn inspect_file(path: PathBuf) -> Result<PdfInfo> {
    tokio::task::spawn_blocking(move || inspect(&path))
        .await
        .map_err(|e| AppError::Internal(format!("Document task failed: {}", e)))?
}

/// Inspect a PDF held in memory.
pub fn inspect_bytes(bytes: &[u8]) -> Result<PdfInfo> {
    let doc = Document::load_mem(bytes).map_err(|e| AppError::Pdf(e.to_string()))?;
    Ok(describe(&doc))
}

fn describe(doc: &Document) -> PdfInfo {
    PdfInfo {
        page_count: doc.get_pages().len() as u32,
        title: info_title(doc),
    }
}

fn info_title(doc: &Document) -> Option<String> {
    let info_ref = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let info = doc.get_dictionary(info_ref).ok()?;
    let text = decode_text(info.get(b"Title").ok()?)?;
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8 or Latin-1).
fn decode_text(obj: &lopdf::Object) -> Option<String> {
    match obj {
        lopdf::Object::String(bytes, _) => {
            if bytes.starts_with(&[0xFE, 0xFF]) {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks(2)
                    .map(|chunk| u16::from_be_bytes([chunk[0], chunk.get(1).copied().unwrap_or(0)]))
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                Some(
                    String::from_utf8(bytes.clone())
                        .unwrap_or_else(|_| bytes.iter().map(|&b| b as char).collect()),
                )
            }
        }
        lopdf::Object::Name(name) => String::from_utf8(name.clone()).ok(),
        _ => None,
    }
}

/// Downloaded documents, one file per book.
#[derive(Debug, Clone)]
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    /// Cache rooted at `dir`. Nothing is created until a document is stored.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where a book's document is kept.
    pub fn path_for(&self, book_id: &str) -> PathBuf {
        let name: String = book_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.pdf", name))
    }

    /// Previously downloaded copy, if any.
    pub fn cached(&self, book_id: &str) -> Option<PathBuf> {
        let path = self.path_for(book_id);
        path.is_file().then_some(path)
    }

    /// Save a downloaded document, replacing any older copy.
    pub async fn store(&self, book_id: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(book_id);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(book = %book_id, path = %path.display(), size = bytes.len(), "Document cached");
        Ok(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{Object, dictionary};

    /// Build a minimal PDF with `pages` blank pages.
    pub(crate) fn sample_pdf(pages: u32, title: Option<&str>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => pages_id,
                })
                .into()
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        if let Some(title) = title {
            let info_id = doc.add_object(dictionary! {
                "Title" => Object::string_literal(title),
            });
            doc.trailer.set("Info", info_id);
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn counts_pages() {
        let info = inspect_bytes(&sample_pdf(10, None)).unwrap();
        assert_eq!(info.page_count, 10);
        assert_eq!(info.title, None);
    }

    #[test]
    fn reads_embedded_title() {
        let info = inspect_bytes(&sample_pdf(2, Some("  Dune  "))).unwrap();
        assert_eq!(info.title.as_deref(), Some("Dune"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            inspect_bytes(b"not a pdf"),
            Err(AppError::Pdf(_))
        ));
    }

    #[test]
    fn decodes_utf16_titles() {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in "Été".encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        let obj = Object::String(bytes, lopdf::StringFormat::Literal);
        assert_eq!(decode_text(&obj).as_deref(), Some("Été"));
    }

    #[tokio::test]
    async fn cache_stores_and_finds() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DocumentCache::new(dir.path().join("docs"));
        assert!(cache.cached("abc/1").is_none());

        let path = cache.store("abc/1", &sample_pdf(3, None)).await.unwrap();
        assert_eq!(path, dir.path().join("docs").join("abc_1.pdf"));
        assert_eq!(cache.cached("abc/1"), Some(path.clone()));
        assert_eq!(inspect_file(path).await.unwrap().page_count, 3);
    }
}
