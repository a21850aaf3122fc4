//! # Core Ports
//!
//! Contracts adapters must implement to plug into the board. Storage ports
//! return domain errors so callers never see driver types; the vote-token
//! codec is synchronous CPU-bound work and takes no `async`.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Entry, EntrySummary, NewEntry, NewUser, Reply, SiteSettings, User, VoteClaim};

/// Persistence contract for entries (submissions, comments, uploads).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn insert(&self, entry: NewEntry) -> Result<Entry>;

    async fn get(&self, id: i64) -> Result<Option<Entry>>;

    /// One submission row with author and aggregates, viewer-aware.
    async fn summary(&self, id: i64, viewer: Option<i64>) -> Result<Option<EntrySummary>>;

    /// All candidate submission rows, optionally filtered by author
    /// username. Unordered; ranking happens in the service layer.
    async fn list_submissions<'a>(
        &self,
        author: Option<&'a str>,
        viewer: Option<i64>,
    ) -> Result<Vec<EntrySummary>>;

    /// Direct comment replies to an entry, ordered by ascending id
    /// (stable creation order).
    async fn replies_to(&self, parent_id: i64) -> Result<Vec<Reply>>;

    /// Deletes an entry, all transitive children, and their votes in one
    /// transaction. Returns the number of entries removed.
    async fn delete_tree(&self, id: i64) -> Result<u64>;
}

/// Membership set recording who has voted on what.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait VoteStore: Send + Sync {
    /// Idempotent upsert keyed on (entry, user); casting an existing vote
    /// is not an error.
    async fn cast(&self, entry_id: i64, user_id: i64) -> Result<()>;

    /// Idempotent delete; retracting a missing vote is a no-op.
    async fn retract(&self, entry_id: i64, user_id: i64) -> Result<()>;

    /// 0 for entries nobody has voted on, never an error.
    async fn count(&self, entry_id: i64) -> Result<i64>;

    async fn has_voted(&self, entry_id: i64, user_id: i64) -> Result<bool>;
}

/// Account lookup and creation.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User>;

    async fn get(&self, id: i64) -> Result<Option<User>>;

    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;
}

/// Single-row site settings persistence.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` when the settings row has never been written.
    async fn load(&self) -> Result<Option<SiteSettings>>;

    async fn save(&self, settings: &SiteSettings) -> Result<()>;
}

/// Stateless vote-authorization token codec.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait VoteTokens: Send + Sync {
    /// Mints an opaque bearer token binding (entry, voter).
    fn encode(&self, entry_id: i64, user_id: i64) -> Result<String>;

    /// Recovers the claim, or `None` for anything malformed, truncated,
    /// tampered with, or otherwise unauthenticated. Fails closed.
    fn decode(&self, token: &str) -> Option<VoteClaim>;
}
