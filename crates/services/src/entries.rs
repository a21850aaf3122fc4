//! # Entry Service
//!
//! Submission and comment creation, summary lookup, and cascading removal
//! with author/administrator authorization.

use std::sync::Arc;

use chrono::Utc;

use domains::{AppError, Entry, EntryKind, EntryStore, EntrySummary, NewEntry, Result, UserStore};

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub title: String,
    pub url: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub body: String,
}

pub struct EntryService {
    entries: Arc<dyn EntryStore>,
    users: Arc<dyn UserStore>,
    admin_user_id: i64,
}

impl EntryService {
    pub fn new(entries: Arc<dyn EntryStore>, users: Arc<dyn UserStore>, admin_user_id: i64) -> Self {
        Self {
            entries,
            users,
            admin_user_id,
        }
    }

    pub async fn submit(&self, author_id: i64, submission: NewSubmission) -> Result<Entry> {
        let title = submission.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        self.require_user(author_id).await?;

        let url = submission
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        let entry = self
            .entries
            .insert(NewEntry {
                kind: EntryKind::Submission,
                title,
                url,
                body: submission.body,
                created_at: Utc::now(),
                author_id,
                parent_id: None,
            })
            .await?;
        tracing::info!(entry_id = entry.id, author_id, "submission created");
        Ok(entry)
    }

    /// Creates a reply under `parent_id`. The parent may itself be a
    /// comment; only its existence is required.
    pub async fn comment(&self, author_id: i64, parent_id: i64, comment: NewComment) -> Result<Entry> {
        let body = comment.body.trim().to_string();
        if body.is_empty() {
            return Err(AppError::Validation(
                "comment body must not be empty".to_string(),
            ));
        }
        self.require_user(author_id).await?;
        let parent = self
            .entries
            .get(parent_id)
            .await?
            .ok_or_else(|| AppError::not_found("Entry", parent_id))?;

        let entry = self
            .entries
            .insert(NewEntry {
                kind: EntryKind::Comment,
                title: String::new(),
                url: None,
                body,
                created_at: Utc::now(),
                author_id,
                parent_id: Some(parent.id),
            })
            .await?;
        tracing::info!(
            entry_id = entry.id,
            parent_id = parent.id,
            author_id,
            "comment created"
        );
        Ok(entry)
    }

    /// Removes an entry and its whole reply subtree. Only the author or
    /// the configured administrator may do this. Returns the number of
    /// entries removed.
    pub async fn delete(&self, entry_id: i64, caller_id: i64) -> Result<u64> {
        let entry = self
            .entries
            .get(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Entry", entry_id))?;

        if entry.author_id != caller_id && caller_id != self.admin_user_id {
            return Err(AppError::Unauthorized(
                "only the author or an administrator may delete an entry".to_string(),
            ));
        }

        let removed = self.entries.delete_tree(entry_id).await?;
        tracing::info!(entry_id, caller_id, removed, "entry tree deleted");
        Ok(removed)
    }

    pub async fn get(&self, entry_id: i64) -> Result<Entry> {
        self.entries
            .get(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Entry", entry_id))
    }

    pub async fn summary(&self, entry_id: i64, viewer: Option<i64>) -> Result<EntrySummary> {
        self.entries
            .summary(entry_id, viewer)
            .await?
            .ok_or_else(|| AppError::not_found("Entry", entry_id))
    }

    async fn require_user(&self, user_id: i64) -> Result<()> {
        self.users
            .get(user_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("User", user_id))
    }
}
