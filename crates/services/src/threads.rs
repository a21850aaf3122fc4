//! # Comment Threads
//!
//! Depth-first reply-tree walking over the flat parent-linked entry rows,
//! plus upward root lookup with a hop bound for corrupt chains.

use std::sync::Arc;

use serde::Serialize;

use domains::{AppError, Entry, EntryStore, Reply, Result};

/// Upper bound on upward parent-chain hops. A chain longer than this is
/// treated as corrupt (accidental cycle) and the walk stops at the
/// best-known ancestor instead of looping.
pub const MAX_PARENT_HOPS: usize = 100;

/// One walked reply tagged with its logical nesting depth. Direct replies
/// to the walk root are depth 0. Presentation may cap the visual indent;
/// the depth recorded here never is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub entry: Entry,
    pub author: String,
    /// Username of the entry this reply answers; the walk root's author
    /// for depth-0 nodes. Drives "@mention" rendering upstream.
    pub parent_author: String,
    pub depth: u32,
}

struct Frame {
    entry: Entry,
    author: String,
    parent_author: String,
    depth: u32,
}

pub struct ThreadService {
    entries: Arc<dyn EntryStore>,
}

impl ThreadService {
    pub fn new(entries: Arc<dyn EntryStore>) -> Self {
        Self { entries }
    }

    /// Walks every transitive reply under `root`, handing nodes to `sink`
    /// depth-first with siblings in ascending-id order. A storage failure
    /// aborts the remaining walk; nodes already handed over stay delivered.
    pub async fn walk<F>(&self, root: &Entry, root_author: &str, mut sink: F) -> Result<()>
    where
        F: FnMut(CommentNode),
    {
        let mut stack: Vec<Frame> = Vec::new();
        let first = self.entries.replies_to(root.id).await?;
        push_frames(&mut stack, first, root_author, 0);

        while let Some(frame) = stack.pop() {
            let entry_id = frame.entry.id;
            let author = frame.author.clone();
            sink(CommentNode {
                entry: frame.entry,
                author: frame.author,
                parent_author: frame.parent_author,
                depth: frame.depth,
            });

            let replies = self.entries.replies_to(entry_id).await?;
            push_frames(&mut stack, replies, &author, frame.depth + 1);
        }
        Ok(())
    }

    /// Collects the whole reply tree into a vector, in walk order.
    pub async fn thread(&self, root: &Entry, root_author: &str) -> Result<Vec<CommentNode>> {
        let mut nodes = Vec::new();
        self.walk(root, root_author, |node| nodes.push(node)).await?;
        Ok(nodes)
    }

    /// Walks up the parent chain to the top-level ancestor. Stops at a
    /// dangling parent reference or after [`MAX_PARENT_HOPS`] hops,
    /// returning the best-known ancestor in both cases.
    pub async fn find_root(&self, entry_id: i64) -> Result<Entry> {
        let mut current = self
            .entries
            .get(entry_id)
            .await?
            .ok_or_else(|| AppError::not_found("Entry", entry_id))?;

        for _ in 0..MAX_PARENT_HOPS {
            let Some(parent_id) = current.parent_id else {
                return Ok(current);
            };
            match self.entries.get(parent_id).await? {
                Some(parent) => current = parent,
                None => return Ok(current),
            }
        }

        tracing::warn!(
            entry_id,
            hops = MAX_PARENT_HOPS,
            "parent chain exceeded hop bound, returning best-known ancestor"
        );
        Ok(current)
    }
}

/// Pushes replies reversed so the first sibling is popped (and therefore
/// expanded) first, keeping the emitted order depth-first.
fn push_frames(stack: &mut Vec<Frame>, replies: Vec<Reply>, parent_author: &str, depth: u32) {
    for reply in replies.into_iter().rev() {
        stack.push(Frame {
            entry: reply.entry,
            author: reply.author,
            parent_author: parent_author.to_string(),
            depth,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{EntryKind, MockEntryStore};

    fn entry(id: i64, parent_id: Option<i64>) -> Entry {
        Entry {
            id,
            kind: if parent_id.is_some() {
                EntryKind::Comment
            } else {
                EntryKind::Submission
            },
            title: String::new(),
            url: None,
            body: format!("body {id}"),
            created_at: Utc::now(),
            author_id: id,
            parent_id,
        }
    }

    fn reply(id: i64, parent_id: i64, author: &str) -> Reply {
        Reply {
            entry: entry(id, Some(parent_id)),
            author: author.to_string(),
        }
    }

    /// Thread shape used below:
    ///   1 (root, alice)
    ///   ├── 2 (bob)
    ///   │   ├── 4 (dave)
    ///   │   └── 5 (erin)
    ///   └── 3 (carol)
    fn fixture_store() -> MockEntryStore {
        let mut store = MockEntryStore::new();
        store.expect_replies_to().returning(|parent_id| {
            Ok(match parent_id {
                1 => vec![reply(2, 1, "bob"), reply(3, 1, "carol")],
                2 => vec![reply(4, 2, "dave"), reply(5, 2, "erin")],
                _ => vec![],
            })
        });
        store
    }

    #[tokio::test]
    async fn walk_is_depth_first_with_siblings_by_id() {
        let service = ThreadService::new(Arc::new(fixture_store()));
        let nodes = service.thread(&entry(1, None), "alice").await.unwrap();

        let order: Vec<i64> = nodes.iter().map(|n| n.entry.id).collect();
        assert_eq!(order, vec![2, 4, 5, 3]);

        let depths: Vec<u32> = nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 0]);
    }

    #[tokio::test]
    async fn walk_tags_parent_authors() {
        let service = ThreadService::new(Arc::new(fixture_store()));
        let nodes = service.thread(&entry(1, None), "alice").await.unwrap();

        let parents: Vec<&str> = nodes.iter().map(|n| n.parent_author.as_str()).collect();
        assert_eq!(parents, vec!["alice", "bob", "bob", "alice"]);
    }

    #[tokio::test]
    async fn linear_chain_yields_depths_zero_and_one() {
        let mut store = MockEntryStore::new();
        store.expect_replies_to().returning(|parent_id| {
            Ok(match parent_id {
                1 => vec![reply(2, 1, "bob")],
                2 => vec![reply(3, 2, "carol")],
                _ => vec![],
            })
        });
        let service = ThreadService::new(Arc::new(store));
        let nodes = service.thread(&entry(1, None), "alice").await.unwrap();

        let depths: Vec<u32> = nodes.iter().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1]);
    }

    #[tokio::test]
    async fn walk_aborts_on_storage_error_after_partial_output() {
        let mut store = MockEntryStore::new();
        store.expect_replies_to().returning(|parent_id| match parent_id {
            1 => Ok(vec![reply(2, 1, "bob"), reply(3, 1, "carol")]),
            2 => Err(AppError::Storage("replies_to: disk gone".to_string())),
            _ => Ok(vec![]),
        });
        let service = ThreadService::new(Arc::new(store));

        let mut seen = Vec::new();
        let result = service
            .walk(&entry(1, None), "alice", |node| seen.push(node.entry.id))
            .await;

        assert!(matches!(result, Err(AppError::Storage(_))));
        // Node 2 was already delivered before its children failed to load.
        assert_eq!(seen, vec![2]);
    }

    #[tokio::test]
    async fn find_root_returns_parentless_entry_itself() {
        let mut store = MockEntryStore::new();
        store
            .expect_get()
            .returning(|id| Ok(if id == 1 { Some(entry(1, None)) } else { None }));
        let service = ThreadService::new(Arc::new(store));

        let root = service.find_root(1).await.unwrap();
        assert_eq!(root.id, 1);
    }

    #[tokio::test]
    async fn find_root_climbs_a_three_level_chain() {
        let mut store = MockEntryStore::new();
        store.expect_get().returning(|id| {
            Ok(match id {
                1 => Some(entry(1, None)),
                2 => Some(entry(2, Some(1))),
                3 => Some(entry(3, Some(2))),
                _ => None,
            })
        });
        let service = ThreadService::new(Arc::new(store));

        let root = service.find_root(3).await.unwrap();
        assert_eq!(root.id, 1);
    }

    #[tokio::test]
    async fn find_root_terminates_on_a_cycle() {
        // 2 -> 3 -> 2 -> ... introduced by hand-edited data.
        let mut store = MockEntryStore::new();
        store.expect_get().returning(|id| {
            Ok(match id {
                2 => Some(entry(2, Some(3))),
                3 => Some(entry(3, Some(2))),
                _ => None,
            })
        });
        let service = ThreadService::new(Arc::new(store));

        let root = service.find_root(2).await.unwrap();
        assert!(root.id == 2 || root.id == 3);
    }

    #[tokio::test]
    async fn find_root_stops_at_dangling_parent() {
        let mut store = MockEntryStore::new();
        store.expect_get().returning(|id| {
            Ok(match id {
                5 => Some(entry(5, Some(99))),
                _ => None,
            })
        });
        let service = ThreadService::new(Arc::new(store));

        let root = service.find_root(5).await.unwrap();
        assert_eq!(root.id, 5);
    }

    #[tokio::test]
    async fn find_root_of_missing_entry_is_not_found() {
        let mut store = MockEntryStore::new();
        store.expect_get().returning(|_| Ok(None));
        let service = ThreadService::new(Arc::new(store));

        let result = service.find_root(42).await;
        assert!(matches!(result, Err(AppError::NotFound(_, _))));
    }
}
