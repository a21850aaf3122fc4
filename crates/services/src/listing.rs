//! # Listing Ranker
//!
//! Orders submission rows for the front page. `Top` ranks by gravity score
//! with creation time as the tiebreak; `Latest` bypasses scoring and sorts
//! by creation time alone. Pagination avoids total-count queries and infers
//! "more pages exist" from the returned page length.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use domains::{EntryStore, EntrySummary, Result, VoteTokens};

use crate::scoring::{age_hours, gravity_score};
use crate::settings::SettingsService;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: usize = 30;
/// Hard ceiling on caller-supplied page sizes.
pub const MAX_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingMode {
    Top,
    Latest,
}

#[derive(Debug, Clone)]
pub struct PageRequest {
    pub mode: ListingMode,
    pub offset: usize,
    pub limit: usize,
    /// Restrict the listing to one author's submissions.
    pub author: Option<String>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            mode: ListingMode::Top,
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
            author: None,
        }
    }
}

/// A listing row with its computed score attached.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub summary: EntrySummary,
    pub score: f64,
    /// Vote token minted for the viewer at render time; absent for
    /// anonymous requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_tok: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub limit: usize,
    /// True when the page came back exactly `limit` long. The last page of
    /// an exactly-divisible listing therefore also reports true; no count
    /// query is issued.
    pub has_more: bool,
}

/// Scores, orders, and slices candidate rows. Pure; `now` is passed in so
/// rankings are reproducible in tests.
pub fn rank_page(
    rows: Vec<EntrySummary>,
    now: DateTime<Utc>,
    gravity: f64,
    mode: ListingMode,
    offset: usize,
    limit: usize,
) -> Page<RankedEntry> {
    let mut ranked: Vec<RankedEntry> = rows
        .into_iter()
        .map(|summary| {
            let age = age_hours(summary.entry.created_at, now);
            let score = gravity_score(summary.votes, age, gravity);
            RankedEntry {
                summary,
                score,
                vote_tok: None,
            }
        })
        .collect();

    match mode {
        ListingMode::Top => ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.summary.entry.created_at.cmp(&a.summary.entry.created_at))
        }),
        ListingMode::Latest => {
            ranked.sort_by(|a, b| b.summary.entry.created_at.cmp(&a.summary.entry.created_at))
        }
    }

    let items: Vec<RankedEntry> = ranked.into_iter().skip(offset).take(limit).collect();
    let has_more = limit > 0 && items.len() == limit;
    Page {
        items,
        offset,
        limit,
        has_more,
    }
}

/// Assembles ranked listing pages from the entry store, stamping each row
/// with a fresh vote token when a viewer is signed in.
pub struct ListingService {
    entries: Arc<dyn EntryStore>,
    tokens: Arc<dyn VoteTokens>,
    settings: Arc<SettingsService>,
}

impl ListingService {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        tokens: Arc<dyn VoteTokens>,
        settings: Arc<SettingsService>,
    ) -> Self {
        Self {
            entries,
            tokens,
            settings,
        }
    }

    pub async fn page(
        &self,
        request: &PageRequest,
        viewer: Option<i64>,
    ) -> Result<Page<RankedEntry>> {
        let gravity = self.settings.current().await?.gravity;
        let rows = self
            .entries
            .list_submissions(request.author.as_deref(), viewer)
            .await?;

        let limit = request.limit.clamp(1, MAX_PAGE_LIMIT);
        let mut page = rank_page(rows, Utc::now(), gravity, request.mode, request.offset, limit);

        if let Some(user_id) = viewer {
            for item in &mut page.items {
                item.vote_tok = Some(self.tokens.encode(item.summary.entry.id, user_id)?);
            }
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::{Entry, EntryKind};

    fn summary(id: i64, votes: i64, age_hours: i64, now: DateTime<Utc>) -> EntrySummary {
        EntrySummary {
            entry: Entry {
                id,
                kind: EntryKind::Submission,
                title: format!("entry {id}"),
                url: None,
                body: String::new(),
                created_at: now - Duration::hours(age_hours),
                author_id: 1,
                parent_id: None,
            },
            author: "alice".to_string(),
            votes,
            reply_count: 0,
            viewer_voted: false,
        }
    }

    #[test]
    fn top_mode_orders_by_score_descending() {
        let now = Utc::now();
        // 50 votes at 48h decays below 10 fresh votes.
        let rows = vec![summary(1, 50, 48, now), summary(2, 10, 0, now)];
        let page = rank_page(rows, now, 1.5, ListingMode::Top, 0, 30);

        let ids: Vec<i64> = page.items.iter().map(|r| r.summary.entry.id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!(page.items[0].score > page.items[1].score);
    }

    #[test]
    fn equal_scores_tiebreak_on_created_at_descending() {
        let now = Utc::now();
        // Three zero-vote entries all score 0; newest first.
        let rows = vec![summary(1, 0, 5, now), summary(2, 0, 1, now), summary(3, 0, 3, now)];
        let page = rank_page(rows, now, 1.5, ListingMode::Top, 0, 30);

        let ids: Vec<i64> = page.items.iter().map(|r| r.summary.entry.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn latest_mode_ignores_votes() {
        let now = Utc::now();
        let rows = vec![summary(1, 500, 10, now), summary(2, 0, 1, now)];
        let page = rank_page(rows, now, 1.5, ListingMode::Latest, 0, 30);

        let ids: Vec<i64> = page.items.iter().map(|r| r.summary.entry.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn offset_and_limit_slice_the_ordered_listing() {
        let now = Utc::now();
        let rows: Vec<EntrySummary> = (1..=5).map(|id| summary(id, 0, id, now)).collect();
        let page = rank_page(rows, now, 1.5, ListingMode::Latest, 2, 2);

        let ids: Vec<i64> = page.items.iter().map(|r| r.summary.entry.id).collect();
        // Latest order is 1..5 by ascending age = ids 1,2,3,4,5; skip 2 take 2.
        assert_eq!(ids, vec![3, 4]);
        assert!(page.has_more);
    }

    #[test]
    fn short_final_page_reports_no_more() {
        let now = Utc::now();
        let rows: Vec<EntrySummary> = (1..=5).map(|id| summary(id, 0, id, now)).collect();
        let page = rank_page(rows, now, 1.5, ListingMode::Latest, 4, 2);

        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more);
    }

    #[test]
    fn offset_past_the_end_yields_empty_page() {
        let now = Utc::now();
        let rows = vec![summary(1, 3, 2, now)];
        let page = rank_page(rows, now, 1.5, ListingMode::Top, 10, 30);

        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }

    #[test]
    fn full_page_reports_more_even_when_listing_is_exhausted() {
        let now = Utc::now();
        let rows: Vec<EntrySummary> = (1..=4).map(|id| summary(id, 0, id, now)).collect();
        let page = rank_page(rows, now, 1.5, ListingMode::Latest, 2, 2);

        // Documented heuristic: exactly-limit-long page claims more.
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more);
    }
}
