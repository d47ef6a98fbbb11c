//! Request and response bodies.

use crate::library::book::UserRef;
use serde::{Deserialize, Serialize};

/// Login and signup body.
#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    /// Username.
    pub username: &'a str,
    /// Password.
    pub password: &'a str,
}

/// Owner page update body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    /// New page.
    pub current_page: u32,
}

/// Error body returned by the API.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable error.
    #[serde(default)]
    pub error: Option<String>,
    /// Alternate field some endpoints use.
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorPayload {
    /// Best message in the payload.
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

/// A user search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// User ID.
    #[serde(rename = "_id")]
    pub id: String,
    /// Username.
    pub username: String,
    /// Already friends with the viewer.
    #[serde(default)]
    pub is_friend: bool,
    /// The viewer already sent a request.
    #[serde(default)]
    pub is_requested: bool,
}

/// Friends and incoming requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Accepted friends.
    #[serde(default)]
    pub friends: Vec<UserRef>,
    /// Pending requests sent to the viewer.
    #[serde(default)]
    pub requests: Vec<UserRef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_prefers_error_field() {
        let payload: ErrorPayload =
            serde_json::from_str(r#"{"error": "Already requested", "message": "x"}"#).unwrap();
        assert_eq!(payload.into_message().as_deref(), Some("Already requested"));

        let payload: ErrorPayload = serde_json::from_str(r#"{"message": " Nope "}"#).unwrap();
        assert_eq!(payload.into_message().as_deref(), Some("Nope"));

        let payload: ErrorPayload = serde_json::from_str(r#"{"error": ""}"#).unwrap();
        assert_eq!(payload.into_message(), None);
    }

    #[test]
    fn page_update_wire_name() {
        let body = serde_json::to_value(PageUpdate { current_page: 6 }).unwrap();
        assert_eq!(body, serde_json::json!({ "currentPage": 6 }));
    }

    #[test]
    fn network_tolerates_missing_lists() {
        let network: Network =
            serde_json::from_str(r#"{"friends": [{"_id": "u1", "username": "bob"}]}"#).unwrap();
        assert_eq!(network.friends.len(), 1);
        assert!(network.requests.is_empty());
    }
}
