//! Vote cast and retract endpoints.
//!
//! Both take the token in the `tok` query parameter, mirroring where
//! listing responses embed it. The service layer owns every authorization
//! decision; this layer only counts outcomes.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use domains::{AppError, VoteReceipt};

use crate::error::ApiResult;
use crate::extract::Viewer;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VoteParams {
    /// Hex vote token minted by a listing or thread response.
    pub tok: Option<String>,
}

/// POST /vote
pub async fn cast_vote(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<VoteParams>,
) -> ApiResult<Json<VoteReceipt>> {
    match state.votes.cast(params.tok.as_deref(), viewer.0).await {
        Ok(receipt) => {
            state.metrics.votes_cast.inc();
            Ok(Json(receipt))
        }
        Err(err) => {
            if matches!(err, AppError::Unauthorized(_)) {
                state.metrics.vote_tokens_rejected.inc();
            }
            Err(err.into())
        }
    }
}

/// POST /unvote
pub async fn retract_vote(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<VoteParams>,
) -> ApiResult<Json<VoteReceipt>> {
    match state.votes.retract(params.tok.as_deref(), viewer.0).await {
        Ok(receipt) => {
            state.metrics.votes_retracted.inc();
            Ok(Json(receipt))
        }
        Err(err) => {
            if matches!(err, AppError::Unauthorized(_)) {
                state.metrics.vote_tokens_rejected.inc();
            }
            Err(err.into())
        }
    }
}
