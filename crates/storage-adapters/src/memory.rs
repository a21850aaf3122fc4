//! # In-Memory Store
//!
//! Lock-free maps behind the same ports as the SQLite adapter. Used by
//! service-level tests and available as a throwaway backend for demos.
//! Nothing survives a restart.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use domains::{
    AppError, Entry, EntryKind, EntrySummary, EntryStore, NewEntry, NewUser, Reply, Result,
    SettingsStore, SiteSettings, User, UserStore, VoteStore,
};

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<i64, Entry>,
    users: DashMap<i64, User>,
    votes: DashMap<(i64, i64), ()>,
    settings: Mutex<Option<SiteSettings>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn author_name(&self, author_id: i64) -> String {
        self.users
            .get(&author_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }

    fn summarize(&self, entry: &Entry, viewer: Option<i64>) -> EntrySummary {
        let votes = self
            .votes
            .iter()
            .filter(|kv| kv.key().0 == entry.id)
            .count() as i64;
        let reply_count = self
            .entries
            .iter()
            .filter(|kv| kv.kind == EntryKind::Comment && kv.parent_id == Some(entry.id))
            .count() as i64;
        let viewer_voted = viewer
            .map(|user_id| self.votes.contains_key(&(entry.id, user_id)))
            .unwrap_or(false);

        EntrySummary {
            entry: entry.clone(),
            author: self.author_name(entry.author_id),
            votes,
            reply_count,
            viewer_voted,
        }
    }

    /// Collects `root` and every transitive child by rescanning the map
    /// until the frontier empties.
    fn subtree_ids(&self, root: i64) -> Vec<i64> {
        let mut collected = vec![root];
        let mut frontier = vec![root];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for kv in self.entries.iter() {
                if let Some(parent) = kv.parent_id {
                    if frontier.contains(&parent) {
                        next.push(kv.id);
                    }
                }
            }
            collected.extend(&next);
            frontier = next;
        }
        collected
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn insert(&self, new: NewEntry) -> Result<Entry> {
        let entry = Entry {
            id: self.next_id(),
            kind: new.kind,
            title: new.title,
            url: new.url,
            body: new.body,
            created_at: new.created_at,
            author_id: new.author_id,
            parent_id: new.parent_id,
        };
        self.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    async fn get(&self, id: i64) -> Result<Option<Entry>> {
        Ok(self.entries.get(&id).map(|kv| kv.clone()))
    }

    async fn summary(&self, id: i64, viewer: Option<i64>) -> Result<Option<EntrySummary>> {
        Ok(self
            .entries
            .get(&id)
            .map(|kv| self.summarize(kv.value(), viewer)))
    }

    async fn list_submissions<'a>(
        &self,
        author: Option<&'a str>,
        viewer: Option<i64>,
    ) -> Result<Vec<EntrySummary>> {
        let mut rows: Vec<EntrySummary> = self
            .entries
            .iter()
            .filter(|kv| kv.kind == EntryKind::Submission)
            .map(|kv| self.summarize(kv.value(), viewer))
            .filter(|summary| author.map(|name| summary.author == name).unwrap_or(true))
            .collect();
        rows.sort_by_key(|summary| summary.entry.id);
        Ok(rows)
    }

    async fn replies_to(&self, parent_id: i64) -> Result<Vec<Reply>> {
        let mut rows: Vec<Reply> = self
            .entries
            .iter()
            .filter(|kv| kv.kind == EntryKind::Comment && kv.parent_id == Some(parent_id))
            .map(|kv| Reply {
                entry: kv.clone(),
                author: self.author_name(kv.author_id),
            })
            .collect();
        rows.sort_by_key(|reply| reply.entry.id);
        Ok(rows)
    }

    async fn delete_tree(&self, id: i64) -> Result<u64> {
        if !self.entries.contains_key(&id) {
            return Ok(0);
        }
        let doomed = self.subtree_ids(id);
        let mut removed = 0u64;
        for entry_id in &doomed {
            if self.entries.remove(entry_id).is_some() {
                removed += 1;
            }
        }
        self.votes.retain(|key, _| !doomed.contains(&key.0));
        Ok(removed)
    }
}

#[async_trait]
impl VoteStore for MemoryStore {
    async fn cast(&self, entry_id: i64, user_id: i64) -> Result<()> {
        self.votes.insert((entry_id, user_id), ());
        Ok(())
    }

    async fn retract(&self, entry_id: i64, user_id: i64) -> Result<()> {
        self.votes.remove(&(entry_id, user_id));
        Ok(())
    }

    async fn count(&self, entry_id: i64) -> Result<i64> {
        Ok(self
            .votes
            .iter()
            .filter(|kv| kv.key().0 == entry_id)
            .count() as i64)
    }

    async fn has_voted(&self, entry_id: i64, user_id: i64) -> Result<bool> {
        Ok(self.votes.contains_key(&(entry_id, user_id)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, new: NewUser) -> Result<User> {
        if self.users.iter().any(|kv| kv.username == new.username) {
            return Err(AppError::Conflict(format!(
                "username {} already taken",
                new.username
            )));
        }
        let user = User {
            id: self.next_id(),
            username: new.username,
            active: new.active,
            email: new.email,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|kv| kv.clone()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|kv| kv.username == username)
            .map(|kv| kv.clone()))
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn load(&self) -> Result<Option<SiteSettings>> {
        let guard = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    async fn save(&self, settings: &SiteSettings) -> Result<()> {
        let mut guard = self.settings.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(settings.clone());
        Ok(())
    }
}
