//! GSearch-RS: an embeddable Google search front end written in Rust
//!
//! Accepts query keystrokes from a host application, fetches autocomplete
//! suggestions and search results, merges them with locally persisted search
//! history, and projects the whole thing into render-ready list rows. The host
//! supplies the list widget, navigation, and a key/value store; this crate
//! supplies the orchestration.

pub mod cache;
pub mod config;
pub mod history;
pub mod locales;
pub mod network;
pub mod provider;
pub mod results;
pub mod session;
pub mod store;
pub mod suggest;
pub mod view;

pub use config::Settings;
pub use results::{OrganicResult, ResultPage, SnippetPanel};
pub use session::{SearchSession, Snapshot};
pub use store::{KeyValueStore, MemoryStore};
pub use view::{project, Row, RowAction, Section};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of history entries kept
pub const HISTORY_CAP: usize = 100;

/// Suggestions shown per query before the user asks for all of them
pub const SUGGESTION_DISPLAY_LIMIT: usize = 4;

/// Suggestions shown once the user expanded the list
pub const SUGGESTION_EXPANDED_LIMIT: usize = 100;

/// Queries longer than this trigger a speculative result fetch before commit
pub const RESULT_PREFETCH_LEN: usize = 5;

/// A persisted last-query record older than this is ignored at hydration
pub const LAST_QUERY_TTL_MS: i64 = 10 * 60 * 1000;
