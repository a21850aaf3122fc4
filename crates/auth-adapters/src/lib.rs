//! rusty-news/crates/auth-adapters/src/lib.rs
//!
//! Credential-shaped adapters. Session handling lives upstream; the one
//! credential this system mints itself is the AEAD vote token.

pub mod vote_token;

pub use vote_token::AeadVoteTokens;
