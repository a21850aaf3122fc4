//! HTTP request handlers.

pub mod entries;
pub mod ops;
pub mod site;
pub mod votes;

pub use entries::*;
pub use ops::*;
pub use site::*;
pub use votes::*;
