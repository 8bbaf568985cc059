//! Site-settings resolution
//!
//! Turns the flat name -> value settings table into a fully-populated
//! `SiteContext` against an explicit table of defaults, reporting which
//! keys fell back instead of silently swallowing lookups.

use serde::Serialize;
use std::collections::HashMap;

/// Fully-resolved site-wide configuration handed to the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteContext {
    pub site_title: String,
    pub site_description: String,
    pub publisher: String,
    pub contact_email: String,
    pub submission_email: String,
    pub issn_print: String,
    pub issn_online: String,
    pub current_volume: String,
    pub publication_frequency: String,
    pub society_name: String,
    pub journal_abbreviation: String,
    pub established_year: String,
    pub editor_in_chief: String,
    pub manuscript_submission_url: String,
    pub site_keywords: String,
    pub social_twitter: String,
    pub social_linkedin: String,
    pub google_analytics_id: String,
}

/// Resolution result: the context plus the keys that were defaulted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSiteContext {
    pub context: SiteContext,
    pub defaulted: Vec<String>,
}

/// The explicit key -> default table
const DEFAULTS: &[(&str, &str)] = &[
    ("site_title", "Comparative Critical Studies"),
    (
        "site_description",
        "A leading journal for comparative literature and critical studies research",
    ),
    ("publisher", "Edinburgh University Press"),
    ("contact_email", "journals@eup.ed.ac.uk"),
    ("issn_print", "1744-1854"),
    ("issn_online", "1750-0109"),
    ("current_volume", "21"),
    ("publication_frequency", "3 issues per year"),
    (
        "society_name",
        "British Comparative Literature Association (BCLA)",
    ),
    ("journal_abbreviation", "CCS"),
    ("established_year", "2004"),
    ("editor_in_chief", ""),
    ("manuscript_submission_url", ""),
    (
        "site_keywords",
        "comparative literature, critical studies, academic journal",
    ),
    ("social_twitter", ""),
    ("social_linkedin", ""),
    ("google_analytics_id", ""),
];

/// Resolve the site context from raw settings.
///
/// Every key in the default table resolves to either the stored value or
/// its default; `submission_email` additionally falls back to the resolved
/// contact e-mail before the static default.
pub fn resolve_site_context(values: &HashMap<String, String>) -> ResolvedSiteContext {
    let mut defaulted = Vec::new();

    let mut get = |key: &str, default: &str| -> String {
        match values.get(key).map(String::as_str).filter(|v| !v.is_empty()) {
            Some(value) => value.to_string(),
            None => {
                defaulted.push(key.to_string());
                default.to_string()
            }
        }
    };

    let mut resolved: HashMap<&str, String> = HashMap::new();
    for (key, default) in DEFAULTS.iter().copied() {
        resolved.insert(key, get(key, default));
    }

    // submission_email inherits contact_email when unset
    let submission_email = match values
        .get("submission_email")
        .map(String::as_str)
        .filter(|v| !v.is_empty())
    {
        Some(value) => value.to_string(),
        None => {
            defaulted.push("submission_email".to_string());
            resolved["contact_email"].clone()
        }
    };

    let context = SiteContext {
        site_title: resolved.remove("site_title").unwrap_or_default(),
        site_description: resolved.remove("site_description").unwrap_or_default(),
        publisher: resolved.remove("publisher").unwrap_or_default(),
        contact_email: resolved.remove("contact_email").unwrap_or_default(),
        submission_email,
        issn_print: resolved.remove("issn_print").unwrap_or_default(),
        issn_online: resolved.remove("issn_online").unwrap_or_default(),
        current_volume: resolved.remove("current_volume").unwrap_or_default(),
        publication_frequency: resolved.remove("publication_frequency").unwrap_or_default(),
        society_name: resolved.remove("society_name").unwrap_or_default(),
        journal_abbreviation: resolved.remove("journal_abbreviation").unwrap_or_default(),
        established_year: resolved.remove("established_year").unwrap_or_default(),
        editor_in_chief: resolved.remove("editor_in_chief").unwrap_or_default(),
        manuscript_submission_url: resolved
            .remove("manuscript_submission_url")
            .unwrap_or_default(),
        site_keywords: resolved.remove("site_keywords").unwrap_or_default(),
        social_twitter: resolved.remove("social_twitter").unwrap_or_default(),
        social_linkedin: resolved.remove("social_linkedin").unwrap_or_default(),
        google_analytics_id: resolved.remove("google_analytics_id").unwrap_or_default(),
    };

    ResolvedSiteContext { context, defaulted }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_default_every_key() {
        let resolved = resolve_site_context(&HashMap::new());

        assert_eq!(resolved.context.site_title, "Comparative Critical Studies");
        assert_eq!(resolved.context.journal_abbreviation, "CCS");
        // All table keys plus submission_email reported
        assert_eq!(resolved.defaulted.len(), DEFAULTS.len() + 1);
    }

    #[test]
    fn stored_values_win_and_are_not_reported() {
        let mut values = HashMap::new();
        values.insert("site_title".to_string(), "Journal of Tests".to_string());

        let resolved = resolve_site_context(&values);

        assert_eq!(resolved.context.site_title, "Journal of Tests");
        assert!(!resolved.defaulted.contains(&"site_title".to_string()));
        assert!(resolved.defaulted.contains(&"publisher".to_string()));
    }

    #[test]
    fn submission_email_inherits_contact_email() {
        let mut values = HashMap::new();
        values.insert(
            "contact_email".to_string(),
            "editors@journal.example.org".to_string(),
        );

        let resolved = resolve_site_context(&values);

        assert_eq!(
            resolved.context.submission_email,
            "editors@journal.example.org"
        );
        assert!(resolved.defaulted.contains(&"submission_email".to_string()));
    }

    #[test]
    fn explicit_submission_email_wins() {
        let mut values = HashMap::new();
        values.insert(
            "submission_email".to_string(),
            "submit@journal.example.org".to_string(),
        );

        let resolved = resolve_site_context(&values);

        assert_eq!(
            resolved.context.submission_email,
            "submit@journal.example.org"
        );
        assert!(!resolved.defaulted.contains(&"submission_email".to_string()));
    }
}
