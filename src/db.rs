mod schema;

pub use schema::Database;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Session remembered on this device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// Bearer token issued by the API.
    pub token: String,
    /// Username the token belongs to.
    pub username: String,
    /// When the session was saved.
    pub created_at: i64,
}

/// Reading position for a book this device's user does not own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalProgressEntry {
    /// Book ID.
    pub book_id: String,
    /// Last page viewed.
    pub page: u32,
    /// Last update timestamp.
    pub updated_at: i64,
}

/// Preference key for the reader theme.
pub const PREF_READER_THEME: &str = "reader_theme";

/// Timestamp helper.
pub fn now_timestamp() -> i64 {
    Utc::now().timestamp()
}
