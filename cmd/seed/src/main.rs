//! Development database seeder.
//!
//! Fills a database with a handful of users, back-dated submissions, a few
//! comment threads, and a randomized vote spread, so a fresh checkout has a
//! front page worth ranking. Pass the database URL as the first argument;
//! defaults to `sqlite://rusty-news.db`.

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use rand::Rng;

use domains::{
    EntryKind, EntryStore, NewEntry, NewUser, SettingsStore, SiteSettings, UserStore, VoteStore,
};
use storage_adapters::SqliteStore;

const DEFAULT_DB_URL: &str = "sqlite://rusty-news.db";

/// Title, optional link, and age in hours for each seeded submission.
const STORIES: [(&str, Option<&str>, i64); 6] = [
    (
        "Writing a lock-free ring buffer",
        Some("https://example.org/ring-buffer"),
        1,
    ),
    (
        "SQLite as an application file format",
        Some("https://example.org/sqlite-format"),
        3,
    ),
    ("Show: a tiny gravity-ranked news board", None, 6),
    (
        "Profiling async executors in production",
        Some("https://example.org/profiling"),
        12,
    ),
    (
        "The case for boring technology",
        Some("https://example.org/boring"),
        24,
    ),
    ("Ask: how do you archive old threads?", None, 47),
];

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string());
    let store = SqliteStore::connect(&url, 1)
        .await
        .with_context(|| format!("failed to open database {url}"))?;

    // The admin account must land first so it gets row id 1.
    let mut users = Vec::new();
    for name in ["admin", "alice", "bob", "carol"] {
        users.push(ensure_user(&store, name).await?);
    }

    if SettingsStore::load(&store).await?.is_none() {
        SettingsStore::save(
            &store,
            &SiteSettings {
                title: "Rusty News".to_string(),
                description: "A gravity-ranked link board".to_string(),
                gravity: 1.0,
            },
        )
        .await?;
    }

    let now = Utc::now();
    let mut entry_ids = Vec::new();
    for (i, (title, url, age_hours)) in STORIES.iter().enumerate() {
        let author = users[1 + i % (users.len() - 1)];
        let entry = EntryStore::insert(
            &store,
            NewEntry {
                kind: EntryKind::Submission,
                title: title.to_string(),
                url: url.map(str::to_string),
                body: String::new(),
                created_at: now - Duration::hours(*age_hours),
                author_id: author,
                parent_id: None,
            },
        )
        .await?;
        entry_ids.push(entry.id);
    }

    // A short thread under the first story and a single reply on the second.
    let first_reply = reply(&store, entry_ids[0], users[2], "Solid writeup.", now, 50).await?;
    reply(
        &store,
        first_reply,
        users[1],
        "Agreed, the memory ordering section especially.",
        now,
        40,
    )
    .await?;
    reply(&store, entry_ids[1], users[3], "Using this daily.", now, 120).await?;

    let mut rng = rand::rng();
    let mut votes = 0u32;
    for &entry_id in &entry_ids {
        for &voter in &users {
            if rng.random_bool(0.5) {
                store.cast(entry_id, voter).await?;
                votes += 1;
            }
        }
    }

    tracing::info!(
        users = users.len(),
        entries = entry_ids.len(),
        votes,
        url,
        "seed complete"
    );
    Ok(())
}

async fn ensure_user(store: &SqliteStore, username: &str) -> Result<i64> {
    if let Some(existing) = store.get_by_username(username).await? {
        return Ok(existing.id);
    }
    let user = UserStore::insert(
        store,
        NewUser {
            username: username.to_string(),
            active: true,
            email: None,
        },
    )
    .await?;
    Ok(user.id)
}

async fn reply(
    store: &SqliteStore,
    parent_id: i64,
    author_id: i64,
    body: &str,
    now: chrono::DateTime<Utc>,
    minutes_ago: i64,
) -> Result<i64> {
    let entry = EntryStore::insert(
        store,
        NewEntry {
            kind: EntryKind::Comment,
            title: String::new(),
            url: None,
            body: body.to_string(),
            created_at: now - Duration::minutes(minutes_ago),
            author_id,
            parent_id: Some(parent_id),
        },
    )
    .await?;
    Ok(entry.id)
}
