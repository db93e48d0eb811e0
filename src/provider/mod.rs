//! Search result provider
//!
//! The result fetcher seam plus the Google implementation that scrapes the
//! results page into a structured [`ResultPage`].

mod google;

pub use google::GoogleProvider;

use crate::results::ResultPage;
use anyhow::Result;
use async_trait::async_trait;

/// Trait for search result sources
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Fetch one results page for a committed (or long enough) query
    async fn fetch(&self, query: &str, page: u32, locale: &str) -> Result<ResultPage>;
}
