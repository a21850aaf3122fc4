//! # Metrics
//!
//! Counters over the mutation paths, exported in Prometheus text format.
//! The registry is assembled once and never mutated afterwards, so
//! handlers share it behind a plain `Arc`.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::registry::Registry;

#[derive(Debug, Default)]
pub struct ApiMetrics {
    pub entries_created: Counter,
    pub entries_deleted: Counter,
    pub votes_cast: Counter,
    pub votes_retracted: Counter,
    pub vote_tokens_rejected: Counter,
}

impl ApiMetrics {
    /// Builds the counter set and the registry exposing it.
    pub fn new() -> (Self, Registry) {
        let metrics = Self::default();
        let mut registry = Registry::default();
        registry.register(
            "news_entries_created",
            "Submissions and comments accepted",
            metrics.entries_created.clone(),
        );
        registry.register(
            "news_entries_deleted",
            "Entries removed, reply subtrees included",
            metrics.entries_deleted.clone(),
        );
        registry.register(
            "news_votes_cast",
            "Votes applied to the ledger",
            metrics.votes_cast.clone(),
        );
        registry.register(
            "news_votes_retracted",
            "Votes removed from the ledger",
            metrics.votes_retracted.clone(),
        );
        registry.register(
            "news_vote_tokens_rejected",
            "Vote requests rejected before touching the ledger",
            metrics.vote_tokens_rejected.clone(),
        );
        (metrics, registry)
    }

    pub fn render(registry: &Registry) -> String {
        let mut buf = String::new();
        // fmt::Write on a String cannot fail.
        let _ = encode(&mut buf, registry);
        buf
    }
}
