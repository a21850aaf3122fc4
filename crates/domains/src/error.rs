//! # AppError
//!
//! Centralized error handling for the rusty-news core.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Entry, User)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty title, malformed ids)
    #[error("validation error: {0}")]
    Validation(String),

    /// Security/auth failure (missing or invalid vote token, forbidden mutation)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Query/exec failure reported by a storage adapter
    #[error("storage error: {0}")]
    Storage(String),

    /// Infrastructure failure outside storage (e.g., token encryption)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(what: &str, id: i64) -> Self {
        AppError::NotFound(what.to_string(), id.to_string())
    }
}

/// A specialized Result type for rusty-news logic.
pub type Result<T> = std::result::Result<T, AppError>;
