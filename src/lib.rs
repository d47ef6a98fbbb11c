//! shelf-rs: terminal client for a personal e-book library.
//!
//! The library lives on a remote HTTP API; this crate signs in, lists and
//! uploads PDFs, opens books for reading and shares them with friends.
//!
//! # Features
//!
//! - Session remembered on the device, dropped on logout or when the API
//!   rejects the token
//! - Upload with optional cover and public/private visibility
//! - Storage usage meter
//! - Reading progress saved on the server for your own books and on the
//!   device for books shared by friends
//! - Friend search, requests, accept/unfriend, browsing friends' public books
//! - Reader themes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Remote API client.
pub mod api;
/// Configuration and CLI.
pub mod config;
/// Client-local database.
pub mod db;
/// PDF inspection and download cache.
pub mod document;
/// Error types.
pub mod error;
/// Library view and book models.
pub mod library;
/// Reading view.
pub mod reader;
/// Session store.
pub mod session;
/// Social panel.
pub mod social;
/// Application state.
pub mod state;


pub use api::ApiClient;
pub use config::{Cli, Command, Config};
pub use db::Database;
pub use error::{AppError, Result};
pub use library::book::{Book, LibraryBook};
pub use session::Session;
pub use state::AppState;
