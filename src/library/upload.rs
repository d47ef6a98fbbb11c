//! Upload form.

use crate::document;
use crate::error::{AppError, Result};
use std::path::{Path, PathBuf};

/// Shown before a public upload goes out.
pub const PUBLIC_UPLOAD_WARNING: &str = "Careful! You are marking this book as PUBLIC. \
All your friends will be able to read this book. Proceed?";

/// A book about to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    /// Book title.
    pub title: String,
    /// PDF to upload.
    pub pdf: PathBuf,
    /// Optional cover image.
    pub cover: Option<PathBuf>,
    /// Visible to friends.
    pub is_public: bool,
}

impl UploadForm {
    /// Build a form. Without an explicit title, the PDF's embedded title is
    /// used, then the file name.
    pub async fn new(
        pdf: PathBuf,
        title: Option<String>,
        cover: Option<PathBuf>,
        is_public: bool,
    ) -> Self {
        let given = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let title = match given {
            Some(title) => Some(title),
            None => embedded_title(&pdf).await,
        }
        .or_else(|| {
            pdf.file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_default();

        Self {
            title,
            pdf,
            cover,
            is_public,
        }
    }

    /// Check the form before sending it.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || !self.pdf.is_file() {
            return Err(AppError::InvalidInput(
                "Please provide a title and a PDF file!".to_string(),
            ));
        }

        if !has_extension(&self.pdf, &["pdf"]) {
            return Err(AppError::InvalidInput(format!(
                "Not a PDF file: {}",
                self.pdf.display()
            )));
        }

        if let Some(cover) = &self.cover
            && !cover.is_file()
        {
            return Err(AppError::InvalidInput(format!(
                "Cover image not found: {}",
                cover.display()
            )));
        }

        Ok(())
    }

    /// Public uploads need an explicit yes.
    pub fn needs_confirmation(&self) -> bool {
        self.is_public
    }

    /// File name sent for the PDF part.
    pub fn pdf_file_name(&self) -> String {
        file_name(&self.pdf, "book.pdf")
    }
}

async fn embedded_title(pdf: &Path) -> Option<String> {
    match document::inspect_file(pdf.to_path_buf()).await {
        Ok(info) => info.title,
        Err(e) => {
            tracing::debug!(path = %pdf.display(), error = %e, "No embedded title");
            None
        }
    }
}

/// MIME type of a cover image, from its extension.
pub fn cover_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

pub(crate) fn file_name(path: &Path, fallback: &str) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(fallback)
        .to_string()
}

fn has_extension(path: &Path, allowed: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| allowed.iter().any(|a| e.eq_ignore_ascii_case(a)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::tests::sample_pdf;

    #[tokio::test]
    async fn title_prefers_flag_then_embedded_then_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let titled = dir.path().join("a.pdf");
        std::fs::write(&titled, sample_pdf(1, Some("Embedded"))).unwrap();
        let untitled = dir.path().join("plain-name.pdf");
        std::fs::write(&untitled, sample_pdf(1, None)).unwrap();

        let form =
            UploadForm::new(titled.clone(), Some(" Given ".to_string()), None, false).await;
        assert_eq!(form.title, "Given");

        let form = UploadForm::new(titled, Some("  ".to_string()), None, false).await;
        assert_eq!(form.title, "Embedded");

        let form = UploadForm::new(untitled, None, None, false).await;
        assert_eq!(form.title, "plain-name");
    }

    #[tokio::test]
    async fn validation() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("book.PDF");
        std::fs::write(&pdf, sample_pdf(1, None)).unwrap();
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "hello").unwrap();

        let form = UploadForm::new(pdf.clone(), Some("Book".to_string()), None, true).await;
        assert!(form.validate().is_ok());
        assert!(form.needs_confirmation());
        assert_eq!(form.pdf_file_name(), "book.PDF");

        let missing =
            UploadForm::new(dir.path().join("nope.pdf"), Some("X".into()), None, false).await;
        assert!(matches!(missing.validate(), Err(AppError::InvalidInput(_))));

        let not_pdf = UploadForm::new(txt, Some("X".into()), None, false).await;
        assert!(not_pdf.validate().is_err());

        let bad_cover = UploadForm::new(
            pdf,
            Some("X".into()),
            Some(dir.path().join("cover.png")),
            false,
        )
        .await;
        assert!(!bad_cover.needs_confirmation());
        assert!(bad_cover.validate().is_err());
    }

    #[test]
    fn cover_mime_types() {
        assert_eq!(cover_mime(Path::new("c.JPG")), "image/jpeg");
        assert_eq!(cover_mime(Path::new("c.png")), "image/png");
        assert_eq!(cover_mime(Path::new("c")), "application/octet-stream");
    }
}
