//! # Vote Service
//!
//! Casts and retracts votes. A mutation is applied only after the bearer
//! token authenticates cleanly and both referenced ids resolve to live
//! rows; any failure rejects the whole operation, never a partial apply.

use std::sync::Arc;

use domains::{
    AppError, EntryStore, Result, UserStore, VoteClaim, VoteReceipt, VoteStore, VoteTokens,
};

pub struct VoteService {
    entries: Arc<dyn EntryStore>,
    users: Arc<dyn UserStore>,
    ledger: Arc<dyn VoteStore>,
    tokens: Arc<dyn VoteTokens>,
    /// When set, the token's embedded voter id must equal the
    /// authenticated viewer. Off reproduces the legacy behavior of
    /// trusting the token alone.
    require_voter_match: bool,
}

impl VoteService {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        users: Arc<dyn UserStore>,
        ledger: Arc<dyn VoteStore>,
        tokens: Arc<dyn VoteTokens>,
        require_voter_match: bool,
    ) -> Self {
        Self {
            entries,
            users,
            ledger,
            tokens,
            require_voter_match,
        }
    }

    /// Mints a page-scoped token authorizing `user_id` to vote on
    /// `entry_id`.
    pub fn issue_token(&self, entry_id: i64, user_id: i64) -> Result<String> {
        self.tokens.encode(entry_id, user_id)
    }

    pub async fn cast(&self, token: Option<&str>, viewer: Option<i64>) -> Result<VoteReceipt> {
        let claim = self.authorize(token, viewer).await?;
        self.ledger.cast(claim.entry_id, claim.user_id).await?;
        let total_votes = self.ledger.count(claim.entry_id).await?;
        tracing::info!(
            entry_id = claim.entry_id,
            user_id = claim.user_id,
            total_votes,
            "vote cast"
        );
        Ok(VoteReceipt {
            entry_id: claim.entry_id,
            user_id: claim.user_id,
            total_votes,
        })
    }

    pub async fn retract(&self, token: Option<&str>, viewer: Option<i64>) -> Result<VoteReceipt> {
        let claim = self.authorize(token, viewer).await?;
        self.ledger.retract(claim.entry_id, claim.user_id).await?;
        let total_votes = self.ledger.count(claim.entry_id).await?;
        tracing::info!(
            entry_id = claim.entry_id,
            user_id = claim.user_id,
            total_votes,
            "vote retracted"
        );
        Ok(VoteReceipt {
            entry_id: claim.entry_id,
            user_id: claim.user_id,
            total_votes,
        })
    }

    /// Decode plus referential checks. The caller-visible rejection is the
    /// same for a garbled token and for one naming a missing entry or
    /// user; only the log line distinguishes them.
    async fn authorize(&self, token: Option<&str>, viewer: Option<i64>) -> Result<VoteClaim> {
        let token =
            token.ok_or_else(|| AppError::Unauthorized("vote token missing".to_string()))?;

        let Some(claim) = self.tokens.decode(token) else {
            tracing::debug!("vote token failed to decode");
            return Err(AppError::Unauthorized("invalid vote token".to_string()));
        };

        if self.require_voter_match && viewer != Some(claim.user_id) {
            tracing::warn!(
                token_user = claim.user_id,
                ?viewer,
                "vote token not issued to the calling identity"
            );
            return Err(AppError::Unauthorized(
                "vote token was not issued to this caller".to_string(),
            ));
        }

        if self.entries.get(claim.entry_id).await?.is_none() {
            tracing::warn!(entry_id = claim.entry_id, "vote token references missing entry");
            return Err(AppError::Unauthorized("invalid vote token".to_string()));
        }
        if self.users.get(claim.user_id).await?.is_none() {
            tracing::warn!(user_id = claim.user_id, "vote token references missing user");
            return Err(AppError::Unauthorized("invalid vote token".to_string()));
        }
        Ok(claim)
    }
}
