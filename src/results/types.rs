//! Result type definitions

use serde::{Deserialize, Serialize};
use url::Url;

/// A single organic search result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicResult {
    /// The URL of the result
    pub url: String,
    /// The title of the result
    pub title: String,
    /// Content snippet/description
    pub description: Option<String>,
    /// Whether the provider marked this entry as an ad
    #[serde(default)]
    pub is_sponsored: bool,
}

impl OrganicResult {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            description: None,
            is_sponsored: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sponsored(mut self) -> Self {
        self.is_sponsored = true;
        self
    }

    /// Get the hostname from the URL
    pub fn hostname(&self) -> Option<String> {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(String::from))
    }
}

/// Dictionary panel shown for definition queries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    pub word: Option<String>,
    pub phonetic: Option<String>,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Dictionary {
    pub fn is_empty(&self) -> bool {
        self.word.is_none()
            && self.phonetic.is_none()
            && self.definitions.is_empty()
            && self.examples.is_empty()
    }
}

/// Featured snippet block above the organic results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedSnippet {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

/// Knowledge panel sidebar summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgePanel {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
}

/// Map/location panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub title: Option<String>,
    pub map: Option<String>,
}

/// Local time panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub date: Option<String>,
    pub hours: Option<String>,
}

/// Translation panel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub source_text: Option<String>,
    pub target_text: Option<String>,
}

/// A full fetched results page: organic hits plus the optional panels
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    #[serde(default)]
    pub results: Vec<OrganicResult>,
    pub did_you_mean: Option<String>,
    pub dictionary: Option<Dictionary>,
    pub featured_snippet: Option<FeaturedSnippet>,
    pub knowledge_panel: Option<KnowledgePanel>,
    pub location: Option<LocationInfo>,
    pub time: Option<TimeInfo>,
    pub translation: Option<Translation>,
}

impl ResultPage {
    /// Create a page holding only organic results
    pub fn with_results(results: Vec<OrganicResult>) -> Self {
        Self {
            results,
            ..Default::default()
        }
    }

    /// Organic results with sponsored entries filtered out
    pub fn organic(&self) -> Vec<&OrganicResult> {
        self.results.iter().filter(|r| !r.is_sponsored).collect()
    }

    /// Collect the applicable snippet panels in display order:
    /// correction, dictionary, featured snippet, knowledge panel, location,
    /// time, translation
    pub fn panels(&self) -> Vec<SnippetPanel> {
        let mut panels = Vec::new();

        if let Some(ref correction) = self.did_you_mean {
            panels.push(SnippetPanel::Correction {
                query: correction.clone(),
            });
        }
        if let Some(ref dictionary) = self.dictionary {
            if !dictionary.is_empty() {
                panels.push(SnippetPanel::Dictionary(dictionary.clone()));
            }
        }
        if let Some(ref featured) = self.featured_snippet {
            if featured.title.is_some() {
                panels.push(SnippetPanel::Featured(featured.clone()));
            }
        }
        if let Some(ref knowledge) = self.knowledge_panel {
            if knowledge.title.is_some() {
                panels.push(SnippetPanel::Knowledge(knowledge.clone()));
            }
        }
        if let Some(ref location) = self.location {
            if location.title.is_some() {
                panels.push(SnippetPanel::Location(location.clone()));
            }
        }
        if let Some(ref time) = self.time {
            if time.date.is_some() || time.hours.is_some() {
                panels.push(SnippetPanel::Time(time.clone()));
            }
        }
        if let Some(ref translation) = self.translation {
            if translation.target_text.is_some() {
                panels.push(SnippetPanel::Translation(translation.clone()));
            }
        }

        panels
    }
}

/// Tagged variant over the optional snippet panel shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnippetPanel {
    /// Spelling-correction suggestion
    Correction { query: String },
    Dictionary(Dictionary),
    Featured(FeaturedSnippet),
    Knowledge(KnowledgePanel),
    Location(LocationInfo),
    Time(TimeInfo),
    Translation(Translation),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_organic_filters_sponsored() {
        let page = ResultPage::with_results(vec![
            OrganicResult::new("https://a.example", "A"),
            OrganicResult::new("https://ad.example", "Ad").sponsored(),
            OrganicResult::new("https://b.example", "B"),
        ]);

        let organic = page.organic();
        assert_eq!(organic.len(), 2);
        assert!(organic.iter().all(|r| !r.is_sponsored));
    }

    #[test]
    fn test_panels_fixed_order() {
        let page = ResultPage {
            translation: Some(Translation {
                target_text: Some("gato".to_string()),
                ..Default::default()
            }),
            did_you_mean: Some("cats".to_string()),
            featured_snippet: Some(FeaturedSnippet {
                title: Some("Cats".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let panels = page.panels();
        assert!(matches!(panels[0], SnippetPanel::Correction { .. }));
        assert!(matches!(panels[1], SnippetPanel::Featured(_)));
        assert!(matches!(panels[2], SnippetPanel::Translation(_)));
    }

    #[test]
    fn test_empty_panels_skipped() {
        let page = ResultPage {
            dictionary: Some(Dictionary::default()),
            time: Some(TimeInfo::default()),
            ..Default::default()
        };
        assert!(page.panels().is_empty());
    }

    #[test]
    fn test_hostname() {
        let result = OrganicResult::new("https://www.example.com/page", "Example");
        assert_eq!(result.hostname(), Some("www.example.com".to_string()));
    }
}
