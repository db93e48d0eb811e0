//! View projection
//!
//! [`project`] turns a [`Snapshot`] into render-ready sections and rows.
//! It is a pure function: the host calls it after every revision change
//! and renders the returned descriptors, feeding row actions back into the
//! session. No state lives here.

use crate::session::Snapshot;
use crate::{SUGGESTION_DISPLAY_LIMIT, SUGGESTION_EXPANDED_LIMIT};

/// What the host should do when the user activates a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    /// Commit this query as a search
    Search(String),
    /// Place this text in the search bar without committing
    PutInQuery(String),
    /// Remove this query from the persisted history
    RemoveFromHistory(String),
    /// Lift the display cap on suggestions for this query text
    ShowAllSuggestions(String),
    /// Place the spelling correction in the search bar
    ApplyCorrection(String),
    /// Open this URL in the browser; the host also reports the open back
    /// to the session so the query lands in history
    OpenUrl(String),
    /// Open the locale picker surface
    OpenLocalePicker,
    /// Adopt this locale for all subsequent fetches
    SetLocale(String),
    /// Go back one results page
    PreviousPage,
    /// Advance one results page
    NextPage,
}

/// One selectable list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    pub subtitle: Option<String>,
    /// First action is the default on activation
    pub actions: Vec<RowAction>,
}

impl Row {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            actions: Vec::new(),
        }
    }

    fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    fn action(mut self, action: RowAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// A titled group of rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub subtitle: Option<String>,
    pub rows: Vec<Row>,
}

impl Section {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            rows: Vec::new(),
        }
    }
}

/// Project a snapshot into the sections the host renders
pub fn project(snapshot: &Snapshot) -> Vec<Section> {
    if snapshot.query.is_empty() {
        return vec![history_section(snapshot), preferences_section(snapshot)];
    }

    let mut sections = vec![suggestion_section(snapshot)];

    if let Some(ref results) = snapshot.results {
        let panels = results.panels();
        if !panels.is_empty() {
            sections.push(snippet_section(&panels));
        }
    }

    // The results section is always present for a non-empty query, even
    // while the first fetch is still in flight
    sections.push(result_section(snapshot));

    sections
}

fn history_section(snapshot: &Snapshot) -> Section {
    let mut section = Section::new("Search history");
    for entry in &snapshot.history {
        section.rows.push(
            Row::new(entry)
                .action(RowAction::Search(entry.clone()))
                .action(RowAction::PutInQuery(entry.clone()))
                .action(RowAction::RemoveFromHistory(entry.clone())),
        );
    }
    section
}

fn preferences_section(snapshot: &Snapshot) -> Section {
    let mut section = Section::new("Preferences");
    section.rows.push(
        Row::new("Change Search Locale")
            .subtitle(format!("Current locale is {}", snapshot.locale))
            .action(RowAction::OpenLocalePicker),
    );
    section
}

fn suggestion_section(snapshot: &Snapshot) -> Section {
    let mut section = Section::new("Suggestions");

    // Stale suggestions for a now-committed query must not display
    let suppressed = snapshot.query == snapshot.committed_query;
    let visible: &[String] = if suppressed { &[] } else { &snapshot.suggestions };

    let limit = if snapshot.expanded_for.as_deref() == Some(snapshot.query.as_str()) {
        SUGGESTION_EXPANDED_LIMIT
    } else {
        SUGGESTION_DISPLAY_LIMIT
    };
    let shown = &visible[..visible.len().min(limit)];

    // The counts run one past the real lengths, and the total counts the
    // raw fetched list even while display is suppressed; defined contract
    if !snapshot.suggestions.is_empty() {
        section.subtitle = Some(format!(
            "Showing {} suggestions of {}",
            shown.len() + 1,
            snapshot.suggestions.len() + 1
        ));
    }

    if !suppressed {
        section.rows.push(
            Row::new(&snapshot.query)
                .action(RowAction::Search(snapshot.query.clone()))
                .action(RowAction::PutInQuery(snapshot.query.clone()))
                .action(RowAction::ShowAllSuggestions(snapshot.query.clone())),
        );
    }

    for suggestion in shown {
        section.rows.push(
            Row::new(suggestion)
                .action(RowAction::Search(suggestion.clone()))
                .action(RowAction::PutInQuery(suggestion.clone()))
                .action(RowAction::ShowAllSuggestions(suggestion.clone())),
        );
    }

    section
}

fn snippet_section(panels: &[crate::results::SnippetPanel]) -> Section {
    use crate::results::SnippetPanel;

    let mut section = Section::new("Snippets");
    for panel in panels {
        match panel {
            SnippetPanel::Correction { query } => {
                section.rows.push(
                    Row::new(query)
                        .subtitle("Suggested query correction")
                        .action(RowAction::ApplyCorrection(query.clone())),
                );
            }
            SnippetPanel::Dictionary(dictionary) => {
                for definition in &dictionary.definitions {
                    section
                        .rows
                        .push(Row::new(definition).subtitle("Definition"));
                }
                for example in &dictionary.examples {
                    section.rows.push(Row::new(example).subtitle("Example"));
                }
                if let Some(ref phonetic) = dictionary.phonetic {
                    section.rows.push(Row::new(phonetic).subtitle("Phonetic"));
                }
                if let Some(ref word) = dictionary.word {
                    section.rows.push(Row::new(word).subtitle("Word"));
                }
            }
            SnippetPanel::Featured(featured) => {
                let mut row = Row::new(featured.title.clone().unwrap_or_default());
                if let Some(ref description) = featured.description {
                    row = row.subtitle(description);
                }
                if let Some(ref url) = featured.url {
                    row = row.action(RowAction::OpenUrl(url.clone()));
                }
                section.rows.push(row);
            }
            SnippetPanel::Knowledge(knowledge) => {
                let mut row = Row::new(knowledge.title.clone().unwrap_or_default());
                if let Some(ref description) = knowledge.description {
                    row = row.subtitle(description);
                }
                if let Some(ref url) = knowledge.url {
                    row = row.action(RowAction::OpenUrl(url.clone()));
                }
                section.rows.push(row);
            }
            SnippetPanel::Location(location) => {
                let mut row = Row::new(location.title.clone().unwrap_or_default());
                if let Some(ref map) = location.map {
                    row = row.subtitle(map);
                }
                section.rows.push(row);
            }
            SnippetPanel::Time(time) => {
                // The date headlines the row; a time-only panel promotes
                // the hours to the title
                let row = match (&time.date, &time.hours) {
                    (Some(date), hours) => {
                        let mut row = Row::new(date);
                        if let Some(hours) = hours {
                            row = row.subtitle(hours);
                        }
                        row
                    }
                    (None, Some(hours)) => Row::new(hours),
                    (None, None) => continue,
                };
                section.rows.push(row);
            }
            SnippetPanel::Translation(translation) => {
                let mut row = Row::new(translation.target_text.clone().unwrap_or_default());
                if let (Some(source), Some(target)) = (
                    translation.source_language.as_ref(),
                    translation.target_language.as_ref(),
                ) {
                    row = row.subtitle(format!("From {} to {}", source, target));
                }
                section.rows.push(row);
            }
        }
    }
    section
}

fn result_section(snapshot: &Snapshot) -> Section {
    let mut section = Section::new("Results");
    section.subtitle = Some(format!("Page {}", snapshot.page + 1));

    let organic: Vec<_> = snapshot
        .results
        .as_ref()
        .map(|r| r.organic().into_iter().cloned().collect())
        .unwrap_or_default();

    if snapshot.page > 0 && !organic.is_empty() {
        section.rows.push(
            Row::new("Previous search results page").action(RowAction::PreviousPage),
        );
    }

    for result in &organic {
        let mut row = Row::new(&result.title);
        if let Some(ref description) = result.description {
            row = row.subtitle(description);
        }
        section.rows.push(row.action(RowAction::OpenUrl(result.url.clone())));
    }

    if !organic.is_empty() {
        section
            .rows
            .push(Row::new("Next Search Results Page").action(RowAction::NextPage));
    }

    section
}
