//! Google search results scraper

use super::ResultFetcher;
use crate::network::HttpClient;
use crate::results::{
    Dictionary, FeaturedSnippet, KnowledgePanel, LocationInfo, OrganicResult, ResultPage,
    TimeInfo, Translation,
};
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use tracing::debug;
use url::Url;

const RESULTS_PER_PAGE: u32 = 10;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.g, div[data-text-ad]").unwrap());
static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static SNIPPET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.VwiC3b, span.aCOpRe").unwrap());

static DID_YOU_MEAN_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.gL9Hy, a#fprsl").unwrap());

static DICT_WORD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span[data-dobid='hdw']").unwrap());
static DICT_PHONETIC_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.S23sjd").unwrap());
static DICT_DEFINITION_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div[data-dobid='dfn']").unwrap());
static DICT_EXAMPLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.eIKIsc").unwrap());

static FEATURED_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.xpdopen").unwrap());
static FEATURED_DESC_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.hgKElc").unwrap());

static KNOWLEDGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.kp-wholepage").unwrap());
static KNOWLEDGE_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());
static KNOWLEDGE_DESC_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.kno-rdesc span").unwrap());
static KNOWLEDGE_IMAGE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("g-img img[src]").unwrap());

static LOCATION_TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.desktop-title-content").unwrap());
static LOCATION_MAP_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img#lu_map").unwrap());

static TIME_HOURS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.gsrt.vk_bk").unwrap());
static TIME_DATE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("div.vk_gy").unwrap());

static TRANSLATION_TEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#tw-target-text").unwrap());
static TRANSLATION_SOURCE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#tw-sl [data-name], #tw-sl span.source-language").unwrap());
static TRANSLATION_TARGET_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#tw-tl [data-name], #tw-tl span.target-language").unwrap());
static TRANSLATION_SOURCE_TEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("#tw-source-text").unwrap());

/// Google web search scraped over HTTP
pub struct GoogleProvider {
    client: HttpClient,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            base_url: "https://www.google.com/search".to_string(),
        }
    }

    /// Override the endpoint, for tests against a local mock server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ResultFetcher for GoogleProvider {
    async fn fetch(&self, query: &str, page: u32, locale: &str) -> Result<ResultPage> {
        let mut params = HashMap::new();
        params.insert("q".to_string(), query.to_string());
        params.insert("hl".to_string(), locale.to_string());
        params.insert("num".to_string(), RESULTS_PER_PAGE.to_string());
        if page > 0 {
            params.insert("start".to_string(), (page * RESULTS_PER_PAGE).to_string());
        }

        let response = self
            .client
            .get_with_params(&self.base_url, params, locale)
            .await?;

        if !response.is_success() {
            anyhow::bail!("search provider returned HTTP {}", response.status);
        }

        let parsed = parse_result_page(&response.text);
        debug!(
            "parsed {} organic results for '{}' page {}",
            parsed.results.len(),
            query,
            page
        );
        Ok(parsed)
    }
}

/// Parse a full results page. Scraping is best-effort: panels that are
/// absent or use unrecognized markup simply stay `None`.
pub fn parse_result_page(html: &str) -> ResultPage {
    let document = Html::parse_document(html);

    ResultPage {
        results: parse_organic(&document),
        did_you_mean: parse_did_you_mean(&document),
        dictionary: parse_dictionary(&document),
        featured_snippet: parse_featured(&document),
        knowledge_panel: parse_knowledge(&document),
        location: parse_location(&document),
        time: parse_time(&document),
        translation: parse_translation(&document),
    }
}

fn parse_organic(document: &Html) -> Vec<OrganicResult> {
    let mut results = Vec::new();

    for element in document.select(&RESULT_SELECTOR) {
        let title = element
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| t.text().collect::<String>())
            .unwrap_or_default();

        if title.is_empty() {
            continue;
        }

        let href = element
            .select(&LINK_SELECTOR)
            .next()
            .and_then(|a| a.value().attr("href"));

        let Some(url) = href.and_then(clean_result_url) else {
            continue;
        };

        let description = element
            .select(&SNIPPET_SELECTOR)
            .next()
            .map(|s| s.text().collect::<String>());

        let mut result = OrganicResult::new(url, title);
        if let Some(description) = description {
            result = result.with_description(description);
        }
        if is_sponsored(&element, &result.url) {
            result = result.sponsored();
        }

        results.push(result);
    }

    results
}

/// Unwrap Google's `/url?q=` indirection and drop non-result hrefs
fn clean_result_url(href: &str) -> Option<String> {
    if href.starts_with('#') {
        return None;
    }
    if href.starts_with("/url?") {
        let full = format!("https://www.google.com{}", href);
        let parsed = Url::parse(&full).ok()?;
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "q")
            .map(|(_, v)| v.into_owned());
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    None
}

fn is_sponsored(element: &ElementRef<'_>, url: &str) -> bool {
    if element.value().attr("data-text-ad").is_some() {
        return true;
    }
    if url.contains("googleadservices.com") {
        return true;
    }
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().id() == Some("tads"))
}

fn select_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_did_you_mean(document: &Html) -> Option<String> {
    select_text(document, &DID_YOU_MEAN_SELECTOR)
}

fn parse_dictionary(document: &Html) -> Option<Dictionary> {
    let dictionary = Dictionary {
        word: select_text(document, &DICT_WORD_SELECTOR),
        phonetic: select_text(document, &DICT_PHONETIC_SELECTOR),
        definitions: document
            .select(&DICT_DEFINITION_SELECTOR)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        examples: document
            .select(&DICT_EXAMPLE_SELECTOR)
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    };

    (!dictionary.is_empty()).then_some(dictionary)
}

fn parse_featured(document: &Html) -> Option<FeaturedSnippet> {
    let block = document.select(&FEATURED_SELECTOR).next()?;

    let title = block
        .select(&TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())?;

    let description = block
        .select(&FEATURED_DESC_SELECTOR)
        .next()
        .map(|d| d.text().collect::<String>().trim().to_string());

    let url = block
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(clean_result_url);

    Some(FeaturedSnippet {
        title: Some(title),
        description,
        url,
    })
}

fn parse_knowledge(document: &Html) -> Option<KnowledgePanel> {
    let block = document.select(&KNOWLEDGE_SELECTOR).next()?;

    let title = block
        .select(&KNOWLEDGE_TITLE_SELECTOR)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())?;

    let description = block
        .select(&KNOWLEDGE_DESC_SELECTOR)
        .next()
        .map(|d| d.text().collect::<String>().trim().to_string());

    let url = block
        .select(&LINK_SELECTOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(clean_result_url);

    let image_url = block
        .select(&KNOWLEDGE_IMAGE_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(String::from);

    Some(KnowledgePanel {
        title: Some(title),
        description,
        url,
        image_url,
    })
}

fn parse_location(document: &Html) -> Option<LocationInfo> {
    let title = select_text(document, &LOCATION_TITLE_SELECTOR)?;
    let map = document
        .select(&LOCATION_MAP_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("title"))
        .map(String::from);

    Some(LocationInfo {
        title: Some(title),
        map,
    })
}

fn parse_time(document: &Html) -> Option<TimeInfo> {
    let hours = select_text(document, &TIME_HOURS_SELECTOR);
    let date = select_text(document, &TIME_DATE_SELECTOR);

    if hours.is_none() && date.is_none() {
        return None;
    }

    Some(TimeInfo { date, hours })
}

fn parse_translation(document: &Html) -> Option<Translation> {
    let target_text = select_text(document, &TRANSLATION_TEXT_SELECTOR)?;

    Some(Translation {
        source_language: select_text(document, &TRANSLATION_SOURCE_SELECTOR),
        target_language: select_text(document, &TRANSLATION_TARGET_SELECTOR),
        source_text: select_text(document, &TRANSLATION_SOURCE_TEXT_SELECTOR),
        target_text: Some(target_text),
    })
}
