//! rusty-news/crates/services/src/lib.rs
//!
//! Business logic composing the domain ports: gravity scoring, listing
//! ranking, comment-thread walking, vote application, entry lifecycle,
//! and site settings.

pub mod entries;
pub mod listing;
pub mod scoring;
pub mod settings;
pub mod threads;
pub mod votes;

pub use entries::{EntryService, NewComment, NewSubmission};
pub use listing::{
    rank_page, ListingMode, ListingService, Page, PageRequest, RankedEntry, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT,
};
pub use scoring::{age_hours, gravity_score};
pub use settings::SettingsService;
pub use threads::{CommentNode, ThreadService, MAX_PARENT_HOPS};
pub use votes::VoteService;
