//! Query orchestration
//!
//! [`SearchSession`] owns the query state machine: it decides when to fetch
//! suggestions versus results, supersedes stale in-flight fetches, folds
//! fetched data with persisted history, and hands the host an immutable
//! [`Snapshot`] to project into list rows.
//!
//! Each fetch kind has at most one in-flight request. Dispatching a new
//! fetch bumps that kind's generation counter and aborts the predecessor
//! task; a completion only touches shared state while its captured
//! generation is still current, so a superseded fetch can never clobber a
//! newer one even if its transport abort loses the race.

use crate::cache::{self, ResultPageCache, SuggestionCache};
use crate::config::Settings;
use crate::history::HistoryList;
use crate::network::HttpClient;
use crate::provider::{GoogleProvider, ResultFetcher};
use crate::results::ResultPage;
use crate::store::{
    decode_history, decode_last_query, encode_history, KeyValueStore, LastQueryRecord,
    KEY_HISTORY, KEY_LAST_QUERY, KEY_LOCALE,
};
use crate::suggest::{GoogleSuggest, SuggestionFetcher};
use crate::{LAST_QUERY_TTL_MS, RESULT_PREFETCH_LEN};
use anyhow::Result;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Immutable view of the session state, input to [`crate::view::project`]
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Current search bar text
    pub query: String,
    /// Last committed (searched) query
    pub committed_query: String,
    /// Zero-based results page
    pub page: u32,
    /// Active locale tag
    pub locale: String,
    /// Query whose suggestion list the user expanded, if any
    pub expanded_for: Option<String>,
    /// Persisted history, most recent first
    pub history: Vec<String>,
    /// Latest fetched suggestions (display-suppressed once committed)
    pub suggestions: Vec<String>,
    /// Latest fetched results page
    pub results: Option<ResultPage>,
    /// Whether any fetch is in flight
    pub loading: bool,
    /// Visible failure from the most recent suggestion fetch, if any
    pub suggest_error: Option<String>,
    /// Visible failure from the most recent result fetch, if any
    pub result_error: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    query: String,
    committed_query: String,
    page: u32,
    locale: String,
    expanded_for: Option<String>,
    history: HistoryList,
    suggestions: Vec<String>,
    results: Option<ResultPage>,
    loading_suggestions: bool,
    loading_results: bool,
    suggest_error: Option<String>,
    result_error: Option<String>,
}

/// One fetch kind's in-flight bookkeeping: generation counter, the cache key
/// of the current dispatch, and the running task
#[derive(Default)]
struct FetchSlot {
    generation: AtomicU64,
    key: Mutex<Option<String>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl FetchSlot {
    /// Start a new dispatch: supersede and abort any predecessor
    fn begin(&self, key: String) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.key.lock().unwrap() = Some(key);
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
        generation
    }

    /// Invalidate without a successor (fetch no longer wanted)
    fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.key.lock().unwrap() = None;
        if let Some(task) = self.task.lock().unwrap().take() {
            task.abort();
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn same_key(&self, key: &str) -> bool {
        self.key.lock().unwrap().as_deref() == Some(key)
    }

    fn attach(&self, task: JoinHandle<()>) {
        *self.task.lock().unwrap() = Some(task);
    }
}

struct SessionInner {
    store: Arc<dyn KeyValueStore>,
    suggest: Arc<dyn SuggestionFetcher>,
    provider: Arc<dyn ResultFetcher>,
    suggestion_cache: SuggestionCache,
    result_cache: ResultPageCache,
    state: RwLock<SessionState>,
    suggest_slot: FetchSlot,
    result_slot: FetchSlot,
    revision: watch::Sender<u64>,
}

impl SessionInner {
    fn bump(&self) {
        self.revision.send_modify(|r| *r = r.wrapping_add(1));
    }
}

/// The query orchestrator
pub struct SearchSession {
    inner: Arc<SessionInner>,
}

impl SearchSession {
    /// Create a session over explicit fetchers, for hosts and tests that
    /// supply their own
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        suggest: Arc<dyn SuggestionFetcher>,
        provider: Arc<dyn ResultFetcher>,
        settings: &Settings,
    ) -> Self {
        let (revision, _) = watch::channel(0u64);
        let state = SessionState {
            locale: settings.search.default_locale.clone(),
            ..Default::default()
        };

        Self {
            inner: Arc::new(SessionInner {
                store,
                suggest,
                provider,
                suggestion_cache: SuggestionCache::default(),
                result_cache: ResultPageCache::default(),
                state: RwLock::new(state),
                suggest_slot: FetchSlot::default(),
                result_slot: FetchSlot::default(),
                revision,
            }),
        }
    }

    /// Create a session wired to the Google fetchers
    pub fn with_google(store: Arc<dyn KeyValueStore>, settings: &Settings) -> Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        let suggest = Arc::new(GoogleSuggest::new(client.clone()));
        let provider = Arc::new(GoogleProvider::new(client));
        Ok(Self::new(store, suggest, provider, settings))
    }

    /// Receiver that changes whenever the snapshot would differ; the host
    /// re-projects rows on each change
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Take an immutable snapshot of the current state
    pub fn snapshot(&self) -> Snapshot {
        let state = self.inner.state.read().unwrap();
        Snapshot {
            query: state.query.clone(),
            committed_query: state.committed_query.clone(),
            page: state.page,
            locale: state.locale.clone(),
            expanded_for: state.expanded_for.clone(),
            history: state.history.entries().to_vec(),
            suggestions: state.suggestions.clone(),
            results: state.results.clone(),
            loading: state.loading_suggestions || state.loading_results,
            suggest_error: state.suggest_error.clone(),
            result_error: state.result_error.clone(),
        }
    }

    /// Load the persisted locale, history, and last query. A last-query
    /// record older than ten minutes is silently ignored; malformed
    /// payloads decode to defaults.
    pub async fn hydrate(&self) {
        let inner = &self.inner;
        let (locale, last_query, history) = futures::join!(
            inner.store.get(KEY_LOCALE),
            inner.store.get(KEY_LAST_QUERY),
            inner.store.get(KEY_HISTORY),
        );

        let locale = read_or_absent(locale, KEY_LOCALE);
        let last_query = read_or_absent(last_query, KEY_LAST_QUERY);
        let history = read_or_absent(history, KEY_HISTORY);

        {
            let mut state = inner.state.write().unwrap();

            if let Some(locale) = locale.filter(|l| !l.is_empty()) {
                state.locale = locale;
            }

            state.history = HistoryList::from_entries(decode_history(history.as_deref()));

            if let Some(record) = decode_last_query(last_query.as_deref()) {
                let now = Utc::now().timestamp_millis();
                if record.is_stale(now, LAST_QUERY_TTL_MS) {
                    debug!("ignoring stale last-query record '{}'", record.query);
                } else {
                    state.query = record.query.clone();
                    state.committed_query = record.query;
                    state.page = record.page;
                }
            }
        }

        inner.bump();
        sync_fetches(inner);
    }

    /// Update the search bar text without committing
    pub fn set_query_text(&self, text: &str) {
        {
            let mut state = self.inner.state.write().unwrap();
            if state.query == text {
                return;
            }
            state.query = text.to_string();
        }
        self.inner.bump();
        sync_fetches(&self.inner);
    }

    /// Commit the current text as the active search: reset pagination,
    /// record history, persist the last query
    pub async fn commit_search(&self) {
        let query = {
            let mut state = self.inner.state.write().unwrap();
            if state.query.is_empty() {
                return;
            }
            state.committed_query = state.query.clone();
            state.page = 0;
            state.query.clone()
        };
        self.inner.bump();
        sync_fetches(&self.inner);
        self.record_search(&query, 0).await;
    }

    /// Commit a suggestion (or history entry) as the active search
    pub async fn select_suggestion(&self, suggestion: &str) {
        {
            let mut state = self.inner.state.write().unwrap();
            state.query = suggestion.to_string();
            state.committed_query = suggestion.to_string();
            state.page = 0;
        }
        self.inner.bump();
        sync_fetches(&self.inner);
        self.record_search(suggestion, 0).await;
    }

    /// Opening a result commits its query, exactly like selecting it as a
    /// suggestion (this also resets pagination)
    pub async fn note_result_opened(&self) {
        let query = self.inner.state.read().unwrap().query.clone();
        if query.is_empty() {
            return;
        }
        self.select_suggestion(&query).await;
    }

    /// Advance to the next results page, re-committing the current text
    pub async fn next_page(&self) {
        self.turn_page(|page| page.saturating_add(1)).await;
    }

    /// Go back one results page; page 0 stays at page 0
    pub async fn prev_page(&self) {
        self.turn_page(|page| page.saturating_sub(1)).await;
    }

    async fn turn_page(&self, advance: impl FnOnce(u32) -> u32) {
        let (query, page) = {
            let mut state = self.inner.state.write().unwrap();
            if state.query.is_empty() {
                return;
            }
            state.page = advance(state.page);
            state.committed_query = state.query.clone();
            (state.query.clone(), state.page)
        };
        self.inner.bump();
        sync_fetches(&self.inner);
        self.record_search(&query, page).await;
    }

    /// Remove every occurrence of a query from the persisted history
    pub async fn remove_from_history(&self, query: &str) {
        let inner = &self.inner;

        let raw = read_or_absent(inner.store.get(KEY_HISTORY).await, KEY_HISTORY);
        let mut history = HistoryList::from_entries(decode_history(raw.as_deref()));
        history.remove(query);

        if let Err(err) = inner
            .store
            .set(KEY_HISTORY, encode_history(history.entries()))
            .await
        {
            warn!("failed to persist history: {}", err);
        }

        inner.state.write().unwrap().history = history;
        inner.bump();
    }

    /// Lift the display cap on suggestions for this exact query text
    pub fn expand_suggestions(&self, for_query: &str) {
        self.inner.state.write().unwrap().expanded_for = Some(for_query.to_string());
        self.inner.bump();
    }

    /// Change and persist the search locale; both fetch kinds depend on it
    pub async fn set_locale(&self, locale: &str) {
        self.inner.state.write().unwrap().locale = locale.to_string();
        self.inner.bump();
        sync_fetches(&self.inner);

        if let Err(err) = self.inner.store.set(KEY_LOCALE, locale.to_string()).await {
            warn!("failed to persist locale: {}", err);
        }
    }

    /// Abort any in-flight fetches; called automatically on drop
    pub fn close(&self) {
        self.inner.suggest_slot.invalidate();
        self.inner.result_slot.invalidate();
    }

    /// Persist the last-query record, then fold the query into the stored
    /// history (read, dedup to front, cap, rewrite) and mirror it in memory
    async fn record_search(&self, query: &str, page: u32) {
        let inner = &self.inner;

        let record = LastQueryRecord::new(query, page, Utc::now().timestamp_millis());
        let payload = serde_json::to_string(&record).unwrap_or_else(|_| "{}".to_string());
        if let Err(err) = inner.store.set(KEY_LAST_QUERY, payload).await {
            warn!("failed to persist last query: {}", err);
        }

        let raw = read_or_absent(inner.store.get(KEY_HISTORY).await, KEY_HISTORY);
        let mut history = HistoryList::from_entries(decode_history(raw.as_deref()));
        history.insert(query);

        if let Err(err) = inner
            .store
            .set(KEY_HISTORY, encode_history(history.entries()))
            .await
        {
            warn!("failed to persist history: {}", err);
        }

        inner.state.write().unwrap().history = history;
        inner.bump();
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.close();
    }
}

fn read_or_absent(
    result: std::result::Result<Option<String>, crate::store::StoreError>,
    key: &str,
) -> Option<String> {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!("store read for '{}' failed, treating as absent: {}", key, err);
            None
        }
    }
}

/// Reconcile the in-flight fetches with the current state
fn sync_fetches(inner: &Arc<SessionInner>) {
    sync_suggestions(inner);
    sync_results(inner);
}

fn sync_suggestions(inner: &Arc<SessionInner>) {
    let (query, committed, locale) = {
        let state = inner.state.read().unwrap();
        (
            state.query.clone(),
            state.committed_query.clone(),
            state.locale.clone(),
        )
    };

    // Suggestions only make sense for a non-empty, uncommitted query.
    // Slot transitions happen under the state write lock so an in-flight
    // completion, which re-checks its generation under the same lock, can
    // never interleave with a supersession.
    if query.is_empty() || query == committed {
        let mut state = inner.state.write().unwrap();
        inner.suggest_slot.invalidate();
        state.loading_suggestions = false;
        return;
    }

    let key = cache::suggestion_key(&query, &locale);
    if inner.suggest_slot.same_key(&key) {
        return;
    }

    let generation = {
        let mut state = inner.state.write().unwrap();
        let generation = inner.suggest_slot.begin(key.clone());
        state.loading_suggestions = true;
        generation
    };
    debug!("dispatching suggestion fetch for '{}'", query);

    let this = Arc::clone(inner);
    let task = tokio::spawn(async move {
        let outcome = match this.suggestion_cache.get(&key).await {
            Some(hit) => {
                debug!("suggestion cache hit for '{}'", query);
                Ok(hit)
            }
            None => match this.suggest.fetch(&query, &locale).await {
                Ok(list) => {
                    this.suggestion_cache.set(key, list.clone()).await;
                    Ok(list)
                }
                Err(err) => Err(err),
            },
        };

        {
            let mut state = this.state.write().unwrap();
            if !this.suggest_slot.is_current(generation) {
                return;
            }
            state.loading_suggestions = false;
            match outcome {
                Ok(list) => {
                    state.suggestions = list;
                    state.suggest_error = None;
                }
                Err(err) => {
                    warn!("suggestion fetch for '{}' failed: {:#}", query, err);
                    state.suggest_error = Some(format!("suggestions: {:#}", err));
                }
            }
        }
        this.bump();
    });
    inner.suggest_slot.attach(task);
}

fn sync_results(inner: &Arc<SessionInner>) {
    let (query, committed, page, locale) = {
        let state = inner.state.read().unwrap();
        (
            state.query.clone(),
            state.committed_query.clone(),
            state.page,
            state.locale.clone(),
        )
    };

    // Committed queries fetch results; long enough uncommitted queries
    // prefetch them speculatively
    let wanted =
        !query.is_empty() && (query.chars().count() > RESULT_PREFETCH_LEN || query == committed);
    if !wanted {
        let mut state = inner.state.write().unwrap();
        inner.result_slot.invalidate();
        state.loading_results = false;
        return;
    }

    let key = cache::result_key(&query, page, &locale);
    if inner.result_slot.same_key(&key) {
        return;
    }

    let generation = {
        let mut state = inner.state.write().unwrap();
        let generation = inner.result_slot.begin(key.clone());
        state.loading_results = true;
        generation
    };
    debug!("dispatching result fetch for '{}' page {}", query, page);

    let this = Arc::clone(inner);
    let task = tokio::spawn(async move {
        let outcome = match this.result_cache.get(&key).await {
            Some(hit) => {
                debug!("result cache hit for '{}' page {}", query, page);
                Ok(hit)
            }
            None => match this.provider.fetch(&query, page, &locale).await {
                Ok(results) => {
                    this.result_cache.set(key, results.clone()).await;
                    Ok(results)
                }
                Err(err) => Err(err),
            },
        };

        {
            let mut state = this.state.write().unwrap();
            if !this.result_slot.is_current(generation) {
                return;
            }
            state.loading_results = false;
            match outcome {
                Ok(results) => {
                    state.results = Some(results);
                    state.result_error = None;
                }
                Err(err) => {
                    warn!("result fetch for '{}' failed: {:#}", query, err);
                    state.result_error = Some(format!("results: {:#}", err));
                }
            }
        }
        this.bump();
    });
    inner.result_slot.attach(task);
}
