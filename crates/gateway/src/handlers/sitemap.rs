//! Sitemap feed handler

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::AppState;
use journal_common::{
    catalog::{article_sitemap_entries, issue_sitemap_entries, render_sitemap},
    db::Repository,
    errors::Result,
};

/// Sitemap of all issues and articles, each by publication date descending,
/// with `updated_at` as the last-modified timestamp
pub async fn sitemap(State(state): State<AppState>) -> Result<Response> {
    let repo = Repository::new(state.db.clone());
    let base_url = &state.config.server.public_base_url;

    let issues = repo.issues_for_sitemap().await?;
    let articles = repo.articles_for_sitemap().await?;

    let mut entries = issue_sitemap_entries(base_url, &issues);
    entries.extend(article_sitemap_entries(base_url, &articles));

    let xml = render_sitemap(&entries);

    Ok(([(header::CONTENT_TYPE, "application/xml")], xml).into_response())
}
