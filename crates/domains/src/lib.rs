//! rusty-news/crates/domains/src/lib.rs
//!
//! The central domain types and port definitions for rusty-news.

pub mod error;
pub mod models;
pub mod ports;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
