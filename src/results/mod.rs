//! Result types for a fetched search page
//!
//! Defines the organic result and snippet panel structures returned by the
//! result fetcher.

mod types;

pub use types::*;
