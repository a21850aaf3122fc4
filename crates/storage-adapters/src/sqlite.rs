//! # SQLite Store
//!
//! Maps the relational rows onto the domain models and implements every
//! storage port over one connection pool. The embedded schema is applied
//! idempotently at connect time.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqlitePool, SqliteRow};
use sqlx::Row;

use domains::{
    AppError, Entry, EntryKind, EntrySummary, EntryStore, NewEntry, NewUser, Reply, Result,
    SettingsStore, SiteSettings, User, UserStore, VoteStore,
};

const SCHEMA: &str = include_str!("schema.sql");

/// Shared SELECT for summary rows: entry columns, author username, vote
/// and direct-reply aggregates, and the viewer's self-vote flag. The
/// first bind is always the viewer id (0 for anonymous, matching no row).
const SUMMARY_SELECT: &str = "\
SELECT e.entry_id, e.kind, e.title, e.url, e.body, e.created_at, e.author_id, e.parent_id,
       u.username,
       (SELECT COUNT(*) FROM entry_votes v WHERE v.entry_id = e.entry_id) AS votes,
       (SELECT COUNT(*) FROM entries c WHERE c.parent_id = e.entry_id AND c.kind = 1) AS reply_count,
       EXISTS(SELECT 1 FROM entry_votes sv WHERE sv.entry_id = e.entry_id AND sv.user_id = ?) AS viewer_voted
FROM entries e
JOIN users u ON u.user_id = e.author_id";

const DELETE_TREE_VOTES: &str = "\
WITH RECURSIVE subtree(id) AS (
    SELECT entry_id FROM entries WHERE entry_id = ?
    UNION ALL
    SELECT e.entry_id FROM entries e JOIN subtree s ON e.parent_id = s.id
)
DELETE FROM entry_votes WHERE entry_id IN (SELECT id FROM subtree)";

const DELETE_TREE_ENTRIES: &str = "\
WITH RECURSIVE subtree(id) AS (
    SELECT entry_id FROM entries WHERE entry_id = ?
    UNION ALL
    SELECT e.entry_id FROM entries e JOIN subtree s ON e.parent_id = s.id
)
DELETE FROM entries WHERE entry_id IN (SELECT id FROM subtree)";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and applies the
    /// schema. In-memory databases must use `max_connections = 1` so every
    /// query sees the connection that ran the schema.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| db_err("parse_db_url", e))?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| db_err("connect", e))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| db_err("apply_schema", e))?;

        tracing::info!(url, "sqlite store ready");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(op: &'static str, err: sqlx::Error) -> AppError {
    tracing::error!(op, error = %err, "storage operation failed");
    AppError::Storage(format!("{op}: {err}"))
}

fn entry_from_row(row: &SqliteRow) -> Entry {
    Entry {
        id: row.get("entry_id"),
        kind: EntryKind::from_i64(row.get("kind")).unwrap_or(EntryKind::Submission),
        title: row.get("title"),
        url: row.get("url"),
        body: row.get("body"),
        created_at: row.get("created_at"),
        author_id: row.get("author_id"),
        parent_id: row.get("parent_id"),
    }
}

fn summary_from_row(row: &SqliteRow) -> EntrySummary {
    EntrySummary {
        entry: entry_from_row(row),
        author: row.get("username"),
        votes: row.get("votes"),
        reply_count: row.get("reply_count"),
        viewer_voted: row.get("viewer_voted"),
    }
}

fn user_from_row(row: &SqliteRow) -> User {
    User {
        id: row.get("user_id"),
        username: row.get("username"),
        active: row.get("active"),
        email: row.get("email"),
    }
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn insert(&self, new: NewEntry) -> Result<Entry> {
        let result = sqlx::query(
            "INSERT INTO entries (kind, title, url, body, created_at, author_id, parent_id) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.kind.as_i64())
        .bind(new.title.as_str())
        .bind(new.url.as_deref())
        .bind(new.body.as_str())
        .bind(new.created_at)
        .bind(new.author_id)
        .bind(new.parent_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("insert_entry", e))?;

        Ok(Entry {
            id: result.last_insert_rowid(),
            kind: new.kind,
            title: new.title,
            url: new.url,
            body: new.body,
            created_at: new.created_at,
            author_id: new.author_id,
            parent_id: new.parent_id,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Entry>> {
        let row = sqlx::query(
            "SELECT entry_id, kind, title, url, body, created_at, author_id, parent_id \
             FROM entries WHERE entry_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("get_entry", e))?;
        Ok(row.as_ref().map(entry_from_row))
    }

    async fn summary(&self, id: i64, viewer: Option<i64>) -> Result<Option<EntrySummary>> {
        let sql = format!("{SUMMARY_SELECT} WHERE e.entry_id = ?");
        let row = sqlx::query(&sql)
            .bind(viewer.unwrap_or(0))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("get_summary", e))?;
        Ok(row.as_ref().map(summary_from_row))
    }

    async fn list_submissions<'a>(
        &self,
        author: Option<&'a str>,
        viewer: Option<i64>,
    ) -> Result<Vec<EntrySummary>> {
        // All candidates come back unranked; scoring and paging happen in
        // the service layer.
        let rows = match author {
            Some(username) => {
                let sql =
                    format!("{SUMMARY_SELECT} WHERE e.kind = 0 AND u.username = ? ORDER BY e.entry_id");
                sqlx::query(&sql)
                    .bind(viewer.unwrap_or(0))
                    .bind(username)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("{SUMMARY_SELECT} WHERE e.kind = 0 ORDER BY e.entry_id");
                sqlx::query(&sql)
                    .bind(viewer.unwrap_or(0))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(|e| db_err("list_submissions", e))?;

        Ok(rows.iter().map(summary_from_row).collect())
    }

    async fn replies_to(&self, parent_id: i64) -> Result<Vec<Reply>> {
        let rows = sqlx::query(
            "SELECT e.entry_id, e.kind, e.title, e.url, e.body, e.created_at, e.author_id, \
                    e.parent_id, u.username \
             FROM entries e \
             JOIN users u ON u.user_id = e.author_id \
             WHERE e.kind = 1 AND e.parent_id = ? \
             ORDER BY e.entry_id",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("replies_to", e))?;

        Ok(rows
            .iter()
            .map(|row| Reply {
                entry: entry_from_row(row),
                author: row.get("username"),
            })
            .collect())
    }

    async fn delete_tree(&self, id: i64) -> Result<u64> {
        // Votes first, then entries, one transaction: a partial failure
        // must not leave orphaned children or dangling votes.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("delete_tree_begin", e))?;

        sqlx::query(DELETE_TREE_VOTES)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("delete_tree_votes", e))?;

        let result = sqlx::query(DELETE_TREE_ENTRIES)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("delete_tree_entries", e))?;

        tx.commit()
            .await
            .map_err(|e| db_err("delete_tree_commit", e))?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl VoteStore for SqliteStore {
    async fn cast(&self, entry_id: i64, user_id: i64) -> Result<()> {
        // Upsert onto the composite key: concurrent casts converge to the
        // same single membership row regardless of interleaving.
        sqlx::query(
            "INSERT INTO entry_votes (entry_id, user_id) VALUES (?, ?) \
             ON CONFLICT(entry_id, user_id) DO NOTHING",
        )
        .bind(entry_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("cast_vote", e))?;
        Ok(())
    }

    async fn retract(&self, entry_id: i64, user_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM entry_votes WHERE entry_id = ? AND user_id = ?")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("retract_vote", e))?;
        Ok(())
    }

    async fn count(&self, entry_id: i64) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM entry_votes WHERE entry_id = ?")
            .bind(entry_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_err("count_votes", e))
    }

    async fn has_voted(&self, entry_id: i64, user_id: i64) -> Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM entry_votes WHERE entry_id = ? AND user_id = ?)",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("has_voted", e))
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn insert(&self, new: NewUser) -> Result<User> {
        let result = sqlx::query("INSERT INTO users (username, active, email) VALUES (?, ?, ?)")
            .bind(new.username.as_str())
            .bind(new.active)
            .bind(new.email.as_deref())
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    AppError::Conflict(format!("username {} already taken", new.username))
                }
                _ => db_err("insert_user", e),
            })?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: new.username,
            active: new.active,
            email: new.email,
        })
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT user_id, username, active, email FROM users WHERE user_id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("get_user", e))?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT user_id, username, active, email FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("get_user_by_username", e))?;
        Ok(row.as_ref().map(user_from_row))
    }
}

#[async_trait]
impl SettingsStore for SqliteStore {
    async fn load(&self) -> Result<Option<SiteSettings>> {
        let row = sqlx::query("SELECT title, description, gravity FROM site_settings WHERE site_id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_err("load_settings", e))?;

        Ok(row.map(|row| SiteSettings {
            title: row.get("title"),
            description: row.get("description"),
            gravity: row.get("gravity"),
        }))
    }

    async fn save(&self, settings: &SiteSettings) -> Result<()> {
        sqlx::query(
            "INSERT INTO site_settings (site_id, title, description, gravity) VALUES (1, ?, ?, ?) \
             ON CONFLICT(site_id) DO UPDATE SET title = excluded.title, \
             description = excluded.description, gravity = excluded.gravity",
        )
        .bind(settings.title.as_str())
        .bind(settings.description.as_str())
        .bind(settings.gravity)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("save_settings", e))?;
        Ok(())
    }
}
