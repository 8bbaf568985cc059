//! Issue browsing handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::handlers::articles::ArticleView;
use crate::AppState;
use journal_common::{
    catalog::{archive_index, issue_detail_path, ArchiveIndex},
    db::{models::Issue, Repository},
    errors::{AppError, Result},
};

/// Wire representation of an issue
#[derive(Serialize)]
pub struct IssueView {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub volume: String,
    pub issue_number: String,
    pub publication_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub url: String,
}

impl IssueView {
    fn from_model(issue: &Issue) -> Self {
        Self {
            id: issue.id,
            title: issue.title.clone(),
            description: issue.description.clone().unwrap_or_default(),
            volume: issue.volume.clone(),
            issue_number: issue.issue_number.clone(),
            publication_date: issue.publication_date.to_string(),
            cover_image: issue.cover_image.clone(),
            url: issue_detail_path(issue.id),
        }
    }
}

#[derive(Serialize)]
pub struct IssueDetailResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueView>,
    pub articles: Vec<ArticleView>,
}

/// The current (most recently published) issue with its articles.
/// An empty catalog renders as no issue and no articles.
pub async fn current_issue(State(state): State<AppState>) -> Result<Json<IssueDetailResponse>> {
    let repo = Repository::new(state.db.clone());

    let Some(issue) = repo.latest_issue().await? else {
        return Ok(Json(IssueDetailResponse {
            issue: None,
            articles: Vec::new(),
        }));
    };

    let articles = repo.articles_for_issue(issue.id).await?;

    Ok(Json(IssueDetailResponse {
        issue: Some(IssueView::from_model(&issue)),
        articles: articles.iter().map(ArticleView::from_model).collect(),
    }))
}

/// One issue with its articles in creation order
pub async fn get_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<i32>,
) -> Result<Json<IssueDetailResponse>> {
    let repo = Repository::new(state.db.clone());

    let issue = repo
        .find_issue_by_id(issue_id)
        .await?
        .ok_or(AppError::IssueNotFound { id: issue_id })?;

    let articles = repo.articles_for_issue(issue_id).await?;

    Ok(Json(IssueDetailResponse {
        issue: Some(IssueView::from_model(&issue)),
        articles: articles.iter().map(ArticleView::from_model).collect(),
    }))
}

#[derive(Serialize)]
pub struct ArchiveResponse {
    #[serde(flatten)]
    pub index: ArchiveIndex,
    pub current_year: i32,
}

/// All issues grouped by year and decade for the archive navigator
pub async fn archive(State(state): State<AppState>) -> Result<Json<ArchiveResponse>> {
    let repo = Repository::new(state.db.clone());

    let issues = repo.all_issues_chronological().await?;

    Ok(Json(ArchiveResponse {
        index: archive_index(&issues),
        current_year: Utc::now().year(),
    }))
}
