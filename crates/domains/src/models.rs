//! # Domain Models
//!
//! Core entities of the rusty-news board. Identifiers are `i64` row ids:
//! the vote-token wire format carries them as decimal strings, so they must
//! round-trip through `"<entryId>:<userId>"` exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What an entry is: a top-level submission, a reply, or an uploaded file
/// record (file handling itself lives outside this system).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Submission,
    Comment,
    Upload,
}

impl EntryKind {
    /// Storage encoding (0 = submission, 1 = comment, 2 = upload).
    pub fn as_i64(self) -> i64 {
        match self {
            EntryKind::Submission => 0,
            EntryKind::Comment => 1,
            EntryKind::Upload => 2,
        }
    }

    pub fn from_i64(raw: i64) -> Option<EntryKind> {
        match raw {
            0 => Some(EntryKind::Submission),
            1 => Some(EntryKind::Comment),
            2 => Some(EntryKind::Upload),
            _ => None,
        }
    }
}

/// A single board item: submission, comment, or upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub kind: EntryKind,
    pub title: String,
    /// External link for link-style submissions.
    pub url: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    /// `None` for top-level submissions; comments point at an existing entry.
    pub parent_id: Option<i64>,
}

impl Entry {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Fields required to persist a new entry. The id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub kind: EntryKind,
    pub title: String,
    pub url: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author_id: i64,
    pub parent_id: Option<i64>,
}

/// A registered account. Credentials are handled upstream and never stored
/// in this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub active: bool,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub active: bool,
    pub email: Option<String>,
}

/// Site-wide settings row. `gravity` is the decay exponent fed to the
/// score function; reads fall back to [`SiteSettings::defaults`] when the
/// row has never been written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    pub gravity: f64,
}

impl SiteSettings {
    pub const DEFAULT_GRAVITY: f64 = 1.5;

    pub fn defaults() -> Self {
        Self {
            title: "rusty-news".to_string(),
            description: String::new(),
            gravity: Self::DEFAULT_GRAVITY,
        }
    }
}

/// Identifier pair recovered from a decoded vote token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteClaim {
    pub entry_id: i64,
    pub user_id: i64,
}

/// Post-mutation outcome of a vote or unvote, echoed back to the caller.
/// The lowercase wire names are load-bearing; clients key on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    #[serde(rename = "entryid")]
    pub entry_id: i64,
    #[serde(rename = "userid")]
    pub user_id: i64,
    #[serde(rename = "totalvotes")]
    pub total_votes: i64,
}

/// A submission row joined with its author and aggregates, as returned by
/// listing queries. `viewer_voted` reflects the requesting user, or false
/// for anonymous viewers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntrySummary {
    #[serde(flatten)]
    pub entry: Entry,
    pub author: String,
    pub votes: i64,
    pub reply_count: i64,
    pub viewer_voted: bool,
}

/// A direct reply with its author's username resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub entry: Entry,
    pub author: String,
}
