//! HTTP networking module
//!
//! Provides the HTTP client used by the suggestion and result fetchers.

mod client;
mod user_agent;

pub use client::{HttpClient, HttpResponse};
pub use user_agent::generate_user_agent;
