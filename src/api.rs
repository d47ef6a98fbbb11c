//! Remote library API.

mod client;
pub mod models;

pub use client::ApiClient;
pub use models::{Network, UserSummary};
