//! rusty-news server binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_adapters::{router, AppState};
use auth_adapters::AeadVoteTokens;
use domains::{EntryStore, SettingsStore, SiteSettings, UserStore, VoteStore, VoteTokens};
use storage_adapters::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("rusty-news v{}", env!("CARGO_PKG_VERSION"));

    let config = configs::load().context("failed to load configuration")?;

    let store = Arc::new(
        SqliteStore::connect(&config.database.url, config.database.max_connections)
            .await
            .with_context(|| format!("failed to open database {}", config.database.url))?,
    );

    // First boot writes the configured site defaults; after that the stored
    // row is authoritative and edited through PUT /site.
    if SettingsStore::load(store.as_ref()).await?.is_none() {
        let initial = SiteSettings {
            title: config.site.default_title.clone(),
            description: String::new(),
            gravity: config.site.default_gravity,
        };
        SettingsStore::save(store.as_ref(), &initial).await?;
        tracing::info!(
            title = %initial.title,
            gravity = initial.gravity,
            "seeded initial site settings"
        );
    }

    let tokens: Arc<dyn VoteTokens> =
        Arc::new(AeadVoteTokens::new(&config.vote_tokens.passphrase));
    let entries: Arc<dyn EntryStore> = store.clone();
    let users: Arc<dyn UserStore> = store.clone();
    let ledger: Arc<dyn VoteStore> = store.clone();
    let settings: Arc<dyn SettingsStore> = store;

    let state = AppState::new(
        entries,
        users,
        ledger,
        settings,
        tokens,
        config.site.admin_user_id,
        config.vote_tokens.require_voter_match,
    );
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind to {}", config.server.bind))?;
    tracing::info!("listening on {}", config.server.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
