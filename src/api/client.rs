//! Remote API client.

use crate::api::models::{Credentials, ErrorPayload, Network, PageUpdate, UserSummary};
use crate::error::{AppError, Result};
use crate::library::book::Book;
use crate::library::upload::{UploadForm, cover_mime, file_name};
use crate::reader::RemoteProgress;
use crate::session::Session;
use reqwest::{RequestBuilder, Response, StatusCode, multipart};
use serde::de::DeserializeOwned;
use std::time::Duration;
use urlencoding::encode;

/// HTTP client for the library API.
///
/// Carries the session explicitly; calls that need one fail with
/// [`AppError::Unauthorized`] when it is missing or rejected.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Option<Session>,
}

impl ApiClient {
    /// Create a client without a session.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("shelf-rs/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session: None,
        })
    }

    /// Same client, acting as `session`.
    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    /// Session in use.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// API base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, req: RequestBuilder) -> Result<RequestBuilder> {
        let session = self.session.as_ref().ok_or(AppError::Unauthorized)?;
        Ok(req.bearer_auth(&session.token))
    }

    async fn execute(&self, req: RequestBuilder, authenticated: bool) -> Result<Response> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED && authenticated {
            tracing::warn!("API rejected the session token");
            return Err(AppError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .ok()
            .and_then(ErrorPayload::into_message)
            .unwrap_or_default();

        tracing::debug!(%status, %message, "API request failed");
        Err(AppError::Api { status, message })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.authorized(self.http.get(self.url(path)))?;
        Ok(self.execute(req, true).await?.json().await?)
    }

    async fn post_empty(&self, path: &str) -> Result<()> {
        let req = self.authorized(self.http.post(self.url(path)).json(&serde_json::json!({})))?;
        self.execute(req, true).await?;
        Ok(())
    }

    // ========== AUTH ==========

    /// Exchange credentials for a session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let req = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&Credentials { username, password });
        let session: Session = self.execute(req, false).await?.json().await?;
        tracing::info!(username = %session.username, "Logged in");
        Ok(session)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let req = self
            .http
            .post(self.url("/api/auth/signup"))
            .json(&Credentials { username, password });
        self.execute(req, false).await?;
        tracing::info!(username = %username, "Registered");
        Ok(())
    }

    // ========== BOOKS ==========

    /// The signed-in user's books.
    pub async fn list_books(&self) -> Result<Vec<Book>> {
        self.get_json("/api/books").await
    }

    /// One book, own or shared by a friend.
    pub async fn get_book(&self, book_id: &str) -> Result<Book> {
        match self
            .get_json(&format!("/api/books/{}", encode(book_id)))
            .await
        {
            Err(AppError::Api {
                status: StatusCode::NOT_FOUND,
                ..
            }) => Err(AppError::NotFound(book_id.to_string())),
            other => other,
        }
    }

    /// Upload a PDF with optional cover.
    pub async fn upload_book(&self, form: &UploadForm) -> Result<()> {
        let pdf = tokio::fs::read(&form.pdf).await?;
        let size = pdf.len();

        let mut body = multipart::Form::new().text("title", form.title.clone()).part(
            "pdfFile",
            multipart::Part::bytes(pdf)
                .file_name(form.pdf_file_name())
                .mime_str("application/pdf")?,
        );

        if let Some(cover) = &form.cover {
            let bytes = tokio::fs::read(cover).await?;
            body = body.part(
                "coverImage",
                multipart::Part::bytes(bytes)
                    .file_name(file_name(cover, "cover"))
                    .mime_str(cover_mime(cover))?,
            );
        }

        body = body.text("isPublic", form.is_public.to_string());

        let req = self.authorized(self.http.post(self.url("/api/books/upload")).multipart(body))?;
        self.execute(req, true).await?;

        tracing::info!(title = %form.title, size, public = form.is_public, "Book uploaded");
        Ok(())
    }

    /// Delete one of the user's books.
    pub async fn delete_book(&self, book_id: &str) -> Result<()> {
        let req = self.authorized(
            self.http
                .delete(self.url(&format!("/api/books/{}", encode(book_id)))),
        )?;
        self.execute(req, true).await?;
        tracing::info!(book = %book_id, "Book deleted");
        Ok(())
    }

    /// Save the owner's page on the server.
    pub async fn save_page(&self, book_id: &str, page: u32) -> Result<()> {
        let req = self.authorized(
            self.http
                .put(self.url(&format!("/api/books/{}/page", encode(book_id))))
                .json(&PageUpdate { current_page: page }),
        )?;
        self.execute(req, true).await?;
        Ok(())
    }

    /// Fetch a document. The token is only sent to the API's own host.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let mut req = self.http.get(url);
        let own_host = url.starts_with(&format!("{}/", self.base_url));
        if own_host && let Some(session) = &self.session {
            req = req.bearer_auth(&session.token);
        }

        let bytes = self.execute(req, own_host).await?.bytes().await?;
        tracing::debug!(url = %url, size = bytes.len(), "Document downloaded");
        Ok(bytes.to_vec())
    }

    // ========== SOCIAL ==========

    /// Search users by name.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>> {
        self.get_json(&format!("/api/social/search?q={}", encode(query)))
            .await
    }

    /// Ask someone to be friends.
    pub async fn send_friend_request(&self, user_id: &str) -> Result<()> {
        self.post_empty(&format!("/api/social/request/{}", encode(user_id)))
            .await
    }

    /// Accept a pending request.
    pub async fn accept_friend_request(&self, user_id: &str) -> Result<()> {
        self.post_empty(&format!("/api/social/accept/{}", encode(user_id)))
            .await
    }

    /// End a friendship.
    pub async fn unfriend(&self, user_id: &str) -> Result<()> {
        self.post_empty(&format!("/api/social/unfriend/{}", encode(user_id)))
            .await
    }

    /// Friends and pending requests.
    pub async fn network(&self) -> Result<Network> {
        self.get_json("/api/social/network").await
    }

    /// A friend's public books.
    pub async fn public_books(&self, friend_id: &str) -> Result<Vec<Book>> {
        self.get_json(&format!("/api/social/public-books/{}", encode(friend_id)))
            .await
    }
}

impl RemoteProgress for ApiClient {
    async fn set_current_page(&self, book_id: &str, page: u32) -> Result<()> {
        self.save_page(book_id, page).await
    }
}
