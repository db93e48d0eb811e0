//! Fetcher tests against a local mock HTTP server.

use gsearch_rs::network::HttpClient;
use gsearch_rs::provider::{GoogleProvider, ResultFetcher};
use gsearch_rs::suggest::{GoogleSuggest, SuggestionFetcher};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> HttpClient {
    HttpClient::new().expect("client")
}

#[tokio::test]
async fn suggest_parses_autocomplete_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/complete/search"))
        .and(query_param("q", "cat"))
        .and(query_param("output", "chrome"))
        .and(query_param("hl", "en"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"["cat",["cats","cat food","caterpillar"],[],{}]"#),
        )
        .mount(&server)
        .await;

    let suggest = GoogleSuggest::new(client())
        .with_base_url(format!("{}/complete/search", server.uri()));

    let suggestions = suggest.fetch("cat", "en").await.expect("fetch");
    assert_eq!(suggestions, vec!["cats", "cat food", "caterpillar"]);
}

#[tokio::test]
async fn suggest_empty_query_skips_network() {
    // No mock server at all: an empty query must resolve without a request
    let suggest = GoogleSuggest::new(client()).with_base_url("http://127.0.0.1:1/unused");

    let suggestions = suggest.fetch("", "en").await.expect("fetch");
    assert!(suggestions.is_empty());
}

#[tokio::test]
async fn suggest_surfaces_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/complete/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let suggest = GoogleSuggest::new(client())
        .with_base_url(format!("{}/complete/search", server.uri()));

    assert!(suggest.fetch("cat", "en").await.is_err());
}

#[tokio::test]
async fn provider_parses_organic_results() {
    let server = MockServer::start().await;
    let html = r#"
        <html><body>
          <div class="g">
            <a href="https://en.wikipedia.org/wiki/Cat"><h3>Cat - Wikipedia</h3></a>
            <div class="VwiC3b">The cat is a domesticated species.</div>
          </div>
          <div class="g">
            <a href="/url?q=https://cats.example/care&sa=U"><h3>Cat care</h3></a>
            <div class="VwiC3b">How to care for your cat.</div>
          </div>
        </body></html>
    "#;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "cat"))
        .and(query_param("hl", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let provider =
        GoogleProvider::new(client()).with_base_url(format!("{}/search", server.uri()));

    let page = provider.fetch("cat", 0, "en").await.expect("fetch");
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].title, "Cat - Wikipedia");
    assert_eq!(page.results[0].url, "https://en.wikipedia.org/wiki/Cat");
    // Redirect-wrapped URL is unwrapped
    assert_eq!(page.results[1].url, "https://cats.example/care");
    assert_eq!(
        page.results[1].description.as_deref(),
        Some("How to care for your cat.")
    );
}

#[tokio::test]
async fn provider_requests_paged_offset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("start", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
        .mount(&server)
        .await;

    let provider =
        GoogleProvider::new(client()).with_base_url(format!("{}/search", server.uri()));

    let page = provider.fetch("cat", 2, "en").await.expect("fetch");
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn provider_surfaces_http_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider =
        GoogleProvider::new(client()).with_base_url(format!("{}/search", server.uri()));

    assert!(provider.fetch("cat", 0, "en").await.is_err());
}
