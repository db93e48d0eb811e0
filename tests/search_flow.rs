//! End-to-end flow: a session wired to mock Google endpoints and an
//! in-memory store, exercised the way a host application would drive it.

use std::sync::Arc;
use std::time::Duration;

use gsearch_rs::network::HttpClient;
use gsearch_rs::provider::GoogleProvider;
use gsearch_rs::store::{KeyValueStore, MemoryStore, KEY_HISTORY, KEY_LOCALE};
use gsearch_rs::suggest::GoogleSuggest;
use gsearch_rs::{project, RowAction, SearchSession, Settings, Snapshot};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

async fn mock_google() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/complete/search"))
        .and(query_param("q", "cat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"["cat",["cats","cat food","cat breeds"],[],{}]"#),
        )
        .mount(&server)
        .await;

    let results_html = r#"
        <html><body>
          <div class="g">
            <a href="https://en.wikipedia.org/wiki/Cat"><h3>Cat - Wikipedia</h3></a>
            <div class="VwiC3b">The cat is a domesticated species.</div>
          </div>
        </body></html>
    "#;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_html))
        .mount(&server)
        .await;

    server
}

fn session_against(server: &MockServer, store: Arc<MemoryStore>) -> SearchSession {
    let client = HttpClient::new().expect("client");
    let suggest = Arc::new(
        GoogleSuggest::new(client.clone())
            .with_base_url(format!("{}/complete/search", server.uri())),
    );
    let provider =
        Arc::new(GoogleProvider::new(client).with_base_url(format!("{}/search", server.uri())));
    SearchSession::new(store, suggest, provider, &Settings::default())
}

async fn wait_for(session: &SearchSession, check: impl Fn(&Snapshot) -> bool) {
    let mut rx = session.subscribe();
    for _ in 0..200 {
        if check(&session.snapshot()) {
            return;
        }
        let _ = tokio::time::timeout(Duration::from_millis(25), rx.changed()).await;
    }
    panic!("session never reached the expected state");
}

#[tokio::test]
async fn typing_then_committing_produces_result_rows() {
    init_tracing();
    let server = mock_google().await;
    let store = Arc::new(MemoryStore::new());
    let session = session_against(&server, store.clone());
    session.hydrate().await;

    // Empty query: history (empty) and the preferences entry point
    let sections = project(&session.snapshot());
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Search history");
    assert!(sections[0].rows.is_empty());
    assert_eq!(sections[1].rows[0].title, "Change Search Locale");

    // Typing fetches suggestions
    session.set_query_text("cat");
    wait_for(&session, |s| !s.suggestions.is_empty()).await;

    let sections = project(&session.snapshot());
    assert_eq!(sections[0].title, "Suggestions");
    let titles: Vec<_> = sections[0].rows.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["cat", "cats", "cat food", "cat breeds"]);

    // Committing fetches results and records history
    session.commit_search().await;
    wait_for(&session, |s| s.results.is_some()).await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.history, vec!["cat"]);

    let sections = project(&snapshot);
    let results = sections.last().unwrap();
    assert_eq!(results.title, "Results");
    assert_eq!(results.subtitle.as_deref(), Some("Page 1"));
    assert!(results
        .rows
        .iter()
        .any(|r| r.title == "Cat - Wikipedia"
            && r.actions
                .contains(&RowAction::OpenUrl("https://en.wikipedia.org/wiki/Cat".to_string()))));

    // Suggestions are suppressed once the query is committed
    assert!(sections[0].rows.is_empty());

    let stored = store.get(KEY_HISTORY).await.unwrap().unwrap();
    assert!(stored.contains("cat"));
}

#[tokio::test]
async fn history_survives_a_new_session() {
    init_tracing();
    let server = mock_google().await;
    let store = Arc::new(MemoryStore::new());

    {
        let session = session_against(&server, store.clone());
        session.set_query_text("cat");
        session.commit_search().await;
    }

    let session = session_against(&server, store);
    session.hydrate().await;

    // The last query was committed moments ago, so it is restored whole
    let snapshot = session.snapshot();
    assert_eq!(snapshot.query, "cat");
    assert_eq!(snapshot.committed_query, "cat");
    assert_eq!(snapshot.history, vec!["cat"]);
}

#[tokio::test]
async fn locale_change_reaches_store_and_fetches() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/complete/search"))
        .and(query_param("hl", "fr-FR"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"["chat",["chaton"],[],{}]"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let session = session_against(&server, store.clone());

    session.set_locale("fr-FR").await;
    session.set_query_text("chat");
    wait_for(&session, |s| s.suggestions == vec!["chaton"]).await;

    assert_eq!(
        store.get(KEY_LOCALE).await.unwrap(),
        Some("fr-FR".to_string())
    );
}
