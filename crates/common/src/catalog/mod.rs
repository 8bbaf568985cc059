//! Catalog presentation structures
//!
//! Pure grouping and formatting over issue/article records: the year/decade
//! archive index consumed by the client-side navigator, and the sitemap
//! feed entries. Formatting lives here, never on the entities themselves.

use crate::db::models::{Article, Issue};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Detail-page locator for an issue
pub fn issue_detail_path(id: i32) -> String {
    format!("/v1/issues/{}", id)
}

/// Detail-page locator for an article
pub fn article_detail_path(id: i32) -> String {
    format!("/v1/articles/{}", id)
}

/// Presentation record for one issue in the archive navigator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub volume: String,
    pub issue: String,
    /// Formatted as "Month YYYY"
    pub date: String,
    pub title: String,
    pub id: i32,
    pub url: String,
    pub description: String,
    pub cover_image: Option<String>,
}

impl IssueSummary {
    fn from_issue(issue: &Issue) -> Self {
        Self {
            volume: issue.volume.clone(),
            issue: issue.issue_number.clone(),
            date: issue.publication_date.format("%B %Y").to_string(),
            title: issue.title.clone(),
            id: issue.id,
            url: issue_detail_path(issue.id),
            description: issue.description.clone().unwrap_or_default(),
            cover_image: issue.cover_image.clone(),
        }
    }
}

/// Year/decade archive index for the collapsible navigation tree.
///
/// Decade keys let a UI build the tree without re-querying: each year holds
/// its issues in chronological order, each decade lists its years exactly
/// once, newest first.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveIndex {
    pub issues_by_year: BTreeMap<i32, Vec<IssueSummary>>,
    pub decades: BTreeMap<String, Vec<i32>>,
}

/// Decade label for a calendar year, e.g. 2023 -> "2020s"
fn decade_label(year: i32) -> String {
    format!("{}s", (year / 10) * 10)
}

/// Group issues by year and decade.
///
/// Expects the slice ordered ascending by publication date (the repository
/// query guarantees this), so within-year output reflects chronological
/// order.
pub fn archive_index(issues: &[Issue]) -> ArchiveIndex {
    use chrono::Datelike;

    let mut index = ArchiveIndex::default();

    for issue in issues {
        let year = issue.publication_date.year();
        let decade = decade_label(year);

        let years = index.decades.entry(decade).or_default();
        if !years.contains(&year) {
            years.push(year);
        }

        index
            .issues_by_year
            .entry(year)
            .or_default()
            .push(IssueSummary::from_issue(issue));
    }

    // Years within each decade, newest first
    for years in index.decades.values_mut() {
        years.sort_unstable_by(|a, b| b.cmp(a));
    }

    index
}

/// One entry of the sitemap feed: a stable locator plus the record's
/// last-modified timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: DateTime<FixedOffset>,
}

/// Sitemap entries for issues, expected ordered by publication date descending
pub fn issue_sitemap_entries(base_url: &str, issues: &[Issue]) -> Vec<SitemapEntry> {
    issues
        .iter()
        .map(|issue| SitemapEntry {
            loc: format!("{}{}", base_url.trim_end_matches('/'), issue_detail_path(issue.id)),
            lastmod: issue.updated_at,
        })
        .collect()
}

/// Sitemap entries for articles, expected ordered by publication date descending
pub fn article_sitemap_entries(base_url: &str, articles: &[Article]) -> Vec<SitemapEntry> {
    articles
        .iter()
        .map(|article| SitemapEntry {
            loc: format!(
                "{}{}",
                base_url.trim_end_matches('/'),
                article_detail_path(article.id)
            ),
            lastmod: article.updated_at,
        })
        .collect()
}

/// Render entries as a sitemap.org urlset document
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut out = String::with_capacity(128 + entries.len() * 96);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push('\n');
    out.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    out.push('\n');

    for entry in entries {
        let _ = writeln!(
            out,
            "  <url><loc>{}</loc><lastmod>{}</lastmod></url>",
            entry.loc,
            entry.lastmod.format("%Y-%m-%d")
        );
    }

    out.push_str("</urlset>\n");
    out
}
