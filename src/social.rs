//! Social panel: user search, friend requests and friends' libraries.

use crate::api::{ApiClient, Network, UserSummary};
use crate::error::Result;
use crate::library::Collection;
use crate::library::book::UserRef;

/// Shown before unfriending.
pub const UNFRIEND_WARNING: &str =
    "Are you sure you want to unfriend this user? You will lose access to their library.";

/// Relationship between the viewer and a search hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Already friends.
    Friends,
    /// Request sent, not yet accepted.
    Requested,
    /// A request can be sent.
    Available,
}

impl Relation {
    /// Of a search hit.
    pub fn of(user: &UserSummary) -> Self {
        if user.is_friend {
            Relation::Friends
        } else if user.is_requested {
            Relation::Requested
        } else {
            Relation::Available
        }
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Relation::Friends => "Friends",
            Relation::Requested => "Requested",
            Relation::Available => "+ Add Friend",
        }
    }
}

/// Mark a search hit as requested after a request went out.
pub fn mark_requested(results: &mut [UserSummary], user_id: &str) {
    for user in results.iter_mut().filter(|u| u.id == user_id) {
        user.is_requested = true;
    }
}

/// Social operations for the signed-in user.
pub struct SocialPanel<'a> {
    api: &'a ApiClient,
}

impl<'a> SocialPanel<'a> {
    /// Panel over an authenticated client.
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Search users. An empty query does nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<UserSummary>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.api.search_users(query).await
    }

    /// Send a friend request.
    pub async fn send_request(&self, user_id: &str) -> Result<()> {
        self.api.send_friend_request(user_id).await?;
        tracing::info!(user = %user_id, "Friend request sent");
        Ok(())
    }

    /// Send a friend request and mark the hit in `results`.
    pub async fn request(&self, results: &mut [UserSummary], user_id: &str) -> Result<()> {
        self.send_request(user_id).await?;
        mark_requested(results, user_id);
        Ok(())
    }

    /// Friends and pending requests.
    pub async fn network(&self) -> Result<Network> {
        self.api.network().await
    }

    /// Accept a request, then reload the network.
    pub async fn accept(&self, user_id: &str) -> Result<Network> {
        self.api.accept_friend_request(user_id).await?;
        tracing::info!(user = %user_id, "Friend request accepted");
        self.network().await
    }

    /// Unfriend, then reload the network.
    pub async fn unfriend(&self, user_id: &str) -> Result<Network> {
        self.api.unfriend(user_id).await?;
        tracing::info!(user = %user_id, "Unfriended");
        self.network().await
    }

    /// Switch the library view to a friend's public books.
    ///
    /// The friend's name comes from the network; a friend missing from it
    /// is shown by ID.
    pub async fn view_library(&self, friend_id: &str) -> Result<Collection> {
        let books = self.api.public_books(friend_id).await?;
        let friend = match self.network().await {
            Ok(network) => network.friends.into_iter().find(|f| f.id == friend_id),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to fetch network for friend name");
                None
            }
        }
        .unwrap_or_else(|| UserRef {
            id: friend_id.to_string(),
            username: friend_id.to_string(),
        });

        Ok(Collection::friend(friend, books))
    }
}
