//! # Application State
//!
//! Service handles shared across handlers. Cloning is cheap; everything
//! inside is an `Arc`.

use std::sync::Arc;

use prometheus_client::registry::Registry;

use domains::{EntryStore, SettingsStore, UserStore, VoteStore, VoteTokens};
use services::{EntryService, ListingService, SettingsService, ThreadService, VoteService};

use crate::metrics::ApiMetrics;

#[derive(Clone)]
pub struct AppState {
    pub entries: Arc<EntryService>,
    pub listing: Arc<ListingService>,
    pub threads: Arc<ThreadService>,
    pub votes: Arc<VoteService>,
    pub site: Arc<SettingsService>,
    pub metrics: Arc<ApiMetrics>,
    pub registry: Arc<Registry>,
}

impl AppState {
    /// Wires every service over the given ports. `admin_user_id` gates
    /// deletes and settings writes; `require_voter_match` pins vote tokens
    /// to the viewer they were minted for.
    pub fn new(
        entries: Arc<dyn EntryStore>,
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn VoteStore>,
        settings_store: Arc<dyn SettingsStore>,
        tokens: Arc<dyn VoteTokens>,
        admin_user_id: i64,
        require_voter_match: bool,
    ) -> Self {
        let site = Arc::new(SettingsService::new(settings_store, admin_user_id));
        let (metrics, registry) = ApiMetrics::new();
        Self {
            entries: Arc::new(EntryService::new(
                entries.clone(),
                users.clone(),
                admin_user_id,
            )),
            listing: Arc::new(ListingService::new(
                entries.clone(),
                tokens.clone(),
                site.clone(),
            )),
            threads: Arc::new(ThreadService::new(entries.clone())),
            votes: Arc::new(VoteService::new(
                entries,
                users,
                ledger,
                tokens,
                require_voter_match,
            )),
            site,
            metrics: Arc::new(metrics),
            registry: Arc::new(registry),
        }
    }
}
