//! Listing, submission, thread, comment, and delete endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use domains::{Entry, EntrySummary};
use services::{
    CommentNode, ListingMode, NewComment, NewSubmission, Page, PageRequest, RankedEntry,
    DEFAULT_PAGE_LIMIT,
};

use crate::error::ApiResult;
use crate::extract::Viewer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
    /// `latest=1` orders by recency instead of gravity score.
    pub latest: Option<String>,
    /// Restrict the listing to one author's submissions.
    pub user: Option<String>,
}

/// Query-flag truthiness: present counts as set unless explicitly "0" or
/// "false", so `?latest`, `?latest=1`, and `?latest=true` all switch modes.
fn flag_is_set(raw: Option<&str>) -> bool {
    match raw {
        None => false,
        Some(value) => !(value == "0" || value.eq_ignore_ascii_case("false")),
    }
}

/// GET /entries
pub async fn list_entries(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Page<RankedEntry>>> {
    let request = PageRequest {
        mode: if flag_is_set(params.latest.as_deref()) {
            ListingMode::Latest
        } else {
            ListingMode::Top
        },
        offset: params.offset,
        limit: params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        author: params.user,
    };
    let page = state.listing.page(&request, viewer.0).await?;
    Ok(Json(page))
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub body: String,
}

/// POST /entries
pub async fn create_entry(
    State(state): State<AppState>,
    viewer: Viewer,
    Json(request): Json<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let author_id = viewer.require("submit")?;
    let entry = state
        .entries
        .submit(
            author_id,
            NewSubmission {
                title: request.title,
                url: request.url,
                body: request.body,
            },
        )
        .await?;
    state.metrics.entries_created.inc();
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Shortened pointer to a thread's top-level submission, attached when the
/// requested entry is itself a reply.
#[derive(Debug, Serialize)]
pub struct RootRef {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct ThreadResponse {
    #[serde(flatten)]
    pub summary: EntrySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_tok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<RootRef>,
    /// Depth-first reply tree; depth 0 are direct replies to this entry.
    pub comments: Vec<CommentNode>,
}

/// GET /entries/{id}
pub async fn get_entry(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> ApiResult<Json<ThreadResponse>> {
    let summary = state.entries.summary(id, viewer.0).await?;
    let comments = state.threads.thread(&summary.entry, &summary.author).await?;

    let root = if summary.entry.is_top_level() {
        None
    } else {
        let root = state.threads.find_root(id).await?;
        Some(RootRef {
            id: root.id,
            title: root.title,
        })
    };
    let vote_tok = viewer
        .0
        .map(|user_id| state.votes.issue_token(id, user_id))
        .transpose()?;

    Ok(Json(ThreadResponse {
        summary,
        vote_tok,
        root,
        comments,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

/// POST /entries/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
    Json(request): Json<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Entry>)> {
    let author_id = viewer.require("comment")?;
    let entry = state
        .entries
        .comment(author_id, id, NewComment { body: request.body })
        .await?;
    state.metrics.entries_created.inc();
    Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Entries removed, the requested one and its reply subtree.
    pub removed: u64,
}

/// DELETE /entries/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let caller_id = viewer.require("delete")?;
    let removed = state.entries.delete(id, caller_id).await?;
    state.metrics.entries_deleted.inc_by(removed);
    Ok(Json(DeleteResponse { removed }))
}
