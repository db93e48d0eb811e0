//! Search locale catalogue and picker projection
//!
//! Locales are free-form BCP-47-like tags; the catalogue only seeds the
//! picker, it never constrains what a session accepts.

use crate::view::{Row, RowAction, Section};

/// Locales offered by the picker before any filtering
pub const KNOWN_LOCALES: &[&str] = &[
    "en-AU", "en-CA", "en-GB", "en-IN", "en-BE", "en-SG", "en-US", "zh-HK", "zh-TW", "da-DK",
    "nl-NL", "nl-BE", "fr-FR", "fr-CA", "fr-BE", "de-DE", "de-AT", "de-CH", "de-BE", "hi-IN",
    "id-ID", "it-IT", "ja-JP", "ko-KR", "no-NO", "pl-PL", "pt-BR", "ru-RU", "es-ES", "es-MX",
    "es-US", "sv-SE", "th-TH", "tr-TR",
];

/// Case-insensitive substring filter over the catalogue
pub fn filter_locales(query: &str) -> Vec<&'static str> {
    let needle = query.to_lowercase();
    KNOWN_LOCALES
        .iter()
        .filter(|locale| locale.to_lowercase().contains(&needle))
        .copied()
        .collect()
}

pub fn current_locale_label(locale: &str) -> String {
    format!("Current locale: {}", locale)
}

/// Project the locale picker list: catalogue entries matching the filter,
/// plus a free-form row when the typed text is not itself a known locale
pub fn picker_section(query: &str, current_locale: &str) -> Section {
    let mut rows: Vec<Row> = filter_locales(query)
        .into_iter()
        .map(|locale| {
            Row {
                title: locale.to_string(),
                subtitle: None,
                actions: vec![RowAction::SetLocale(locale.to_string())],
            }
        })
        .collect();

    if !query.is_empty() && !KNOWN_LOCALES.contains(&query) {
        rows.push(Row {
            title: query.to_string(),
            subtitle: None,
            actions: vec![RowAction::SetLocale(query.to_string())],
        });
    }

    Section {
        title: "Locales".to_string(),
        subtitle: Some(current_locale_label(current_locale)),
        rows,
    }
}
