//! Article browsing and citation sync handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use journal_common::{
    catalog::article_detail_path,
    db::{models::Article, Repository},
    errors::{AppError, Result},
    scholar::SyncReport,
    DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};

/// Wire representation of an article
#[derive(Serialize)]
pub struct ArticleView {
    pub id: i32,
    pub issue_id: i32,
    pub title: String,
    pub description: String,
    pub authors: String,
    pub accessability: journal_common::db::models::Accessability,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub volume: String,
    pub issue_number: String,
    pub publication_date: String,
    pub views: i64,
    pub citation_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholar_cluster_id: Option<String>,
    pub url: String,
}

impl ArticleView {
    pub fn from_model(article: &Article) -> Self {
        Self {
            id: article.id,
            issue_id: article.issue_id,
            title: article.title.clone(),
            description: article.description.clone().unwrap_or_default(),
            authors: article.authors.clone(),
            accessability: article.accessability,
            file: article.file.clone(),
            volume: article.volume.clone(),
            issue_number: article.issue_number.clone(),
            publication_date: article.publication_date.to_string(),
            views: article.views,
            citation_count: article.citation_count,
            scholar_cluster_id: article.scholar_cluster_id.clone(),
            url: article_detail_path(article.id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u64>,
}

impl ListParams {
    fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
    }
}

#[derive(Serialize)]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleView>,
}

/// Latest articles, publication date descending
pub async fn latest_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticleListResponse>> {
    let repo = Repository::new(state.db.clone());

    let articles = repo.latest_articles(params.limit()).await?;

    Ok(Json(ArticleListResponse {
        articles: articles.iter().map(ArticleView::from_model).collect(),
    }))
}

/// Most viewed articles, view count descending
pub async fn most_read_articles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ArticleListResponse>> {
    let repo = Repository::new(state.db.clone());

    let articles = repo.most_viewed_articles(params.limit()).await?;

    Ok(Json(ArticleListResponse {
        articles: articles.iter().map(ArticleView::from_model).collect(),
    }))
}

/// Article detail page. Records the view as a best-effort side effect:
/// a failed or raced increment never fails the read.
pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<i32>,
) -> Result<Json<ArticleView>> {
    let repo = Repository::new(state.db.clone());

    let article = repo
        .find_article_by_id(article_id)
        .await?
        .ok_or(AppError::ArticleNotFound { id: article_id })?;

    match repo.record_view(article_id).await {
        Ok(true) => {
            metrics::counter!("journal_article_views_total").increment(1);
        }
        Ok(false) => {}
        Err(e) => {
            tracing::warn!(article_id, error = %e, "Failed to record view");
        }
    }

    Ok(Json(ArticleView::from_model(&article)))
}

#[derive(Debug, Deserialize)]
pub struct SyncParams {
    #[serde(default)]
    pub force: bool,
}

/// Run a citation sync attempt for one article.
///
/// The sync itself only soft-fails; 404 is the single hard error here.
pub async fn sync_citations(
    State(state): State<AppState>,
    Path(article_id): Path<i32>,
    Query(params): Query<SyncParams>,
) -> Result<Json<SyncReport>> {
    let repo = Repository::new(state.db.clone());

    let article = repo
        .find_article_by_id(article_id)
        .await?
        .ok_or(AppError::ArticleNotFound { id: article_id })?;

    let report = state.citations.sync_citations(&article, params.force).await;

    tracing::info!(
        article_id,
        changed = report.changed,
        message = %report.message,
        "Citation sync requested"
    );

    Ok(Json(report))
}
