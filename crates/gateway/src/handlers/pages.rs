//! Site-wide content handlers: resolved settings, About pages, the
//! subscribe page and the submission/permissions content

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::AppState;
use journal_common::{
    db::{
        models::{AboutPage, Permission, Placement, SubscribeContent},
        Repository,
    },
    errors::{AppError, Result},
    settings::{resolve_site_context, ResolvedSiteContext},
};

/// Resolved site-wide settings for the rendering layer, including which
/// keys fell back to defaults
pub async fn site_context(State(state): State<AppState>) -> Result<Json<ResolvedSiteContext>> {
    let repo = Repository::new(state.db.clone());

    let values = repo.site_settings_map().await?;

    Ok(Json(resolve_site_context(&values)))
}

#[derive(Serialize)]
pub struct AboutPageView {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub updated_at: String,
}

impl AboutPageView {
    fn from_model(page: &AboutPage) -> Self {
        Self {
            id: page.id,
            title: page.title.clone(),
            content: page.content.clone(),
            updated_at: page.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct AboutListResponse {
    pub pages: Vec<AboutPageView>,
}

/// About pages for navigation, title order
pub async fn list_about(State(state): State<AppState>) -> Result<Json<AboutListResponse>> {
    let repo = Repository::new(state.db.clone());

    let pages = repo.list_about_pages(10).await?;

    Ok(Json(AboutListResponse {
        pages: pages.iter().map(AboutPageView::from_model).collect(),
    }))
}

/// One About page by id
pub async fn get_about(
    State(state): State<AppState>,
    Path(page_id): Path<i32>,
) -> Result<Json<AboutPageView>> {
    let repo = Repository::new(state.db.clone());

    let page = repo
        .find_about_page(page_id)
        .await?
        .ok_or(AppError::PageNotFound { id: page_id })?;

    Ok(Json(AboutPageView::from_model(&page)))
}

#[derive(Serialize)]
pub struct ContentBlockView {
    pub id: i32,
    pub title: String,
    pub content: String,
}

impl ContentBlockView {
    fn from_model(block: &SubscribeContent) -> Self {
        Self {
            id: block.id,
            title: block.title.clone(),
            content: block.content.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct SubscribePageResponse {
    pub main: Vec<ContentBlockView>,
    pub sidebar: Vec<ContentBlockView>,
}

/// Subscribe page content, main column and sidebar each oldest first
pub async fn subscribe_page(State(state): State<AppState>) -> Result<Json<SubscribePageResponse>> {
    let repo = Repository::new(state.db.clone());

    let main = repo.subscribe_content_for(Placement::Main).await?;
    let sidebar = repo.subscribe_content_for(Placement::Sidebar).await?;

    Ok(Json(SubscribePageResponse {
        main: main.iter().map(ContentBlockView::from_model).collect(),
        sidebar: sidebar.iter().map(ContentBlockView::from_model).collect(),
    }))
}

#[derive(Serialize)]
pub struct PermissionView {
    pub id: i32,
    pub name: String,
    pub description: String,
}

impl PermissionView {
    fn from_model(entry: &Permission) -> Self {
        Self {
            id: entry.id,
            name: entry.name.clone(),
            description: entry.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
pub struct PermissionListResponse {
    pub permissions: Vec<PermissionView>,
}

/// The full permissions catalog in name order
pub async fn list_permissions(State(state): State<AppState>) -> Result<Json<PermissionListResponse>> {
    let repo = Repository::new(state.db.clone());

    let entries = repo.list_permissions().await?;

    Ok(Json(PermissionListResponse {
        permissions: entries.iter().map(PermissionView::from_model).collect(),
    }))
}

/// One permission entry; id 1 resolves to the first catalog entry
pub async fn get_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<i32>,
) -> Result<Json<PermissionView>> {
    let repo = Repository::new(state.db.clone());

    let entry = repo
        .permission_or_first(permission_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "permission".to_string(),
            id: permission_id.to_string(),
        })?;

    Ok(Json(PermissionView::from_model(&entry)))
}

/// Named editorial content stored as a site setting
#[derive(Serialize)]
pub struct NamedContentView {
    pub name: String,
    pub content: String,
}

async fn named_content(state: &AppState, name: &str) -> Result<Json<NamedContentView>> {
    let repo = Repository::new(state.db.clone());

    let setting = repo
        .find_setting_by_name(name)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "setting".to_string(),
            id: name.to_string(),
        })?;

    Ok(Json(NamedContentView {
        name: setting.name,
        content: setting.value,
    }))
}

/// The submission-guidelines content block
pub async fn submission_guidelines(State(state): State<AppState>) -> Result<Json<NamedContentView>> {
    named_content(&state, "submission").await
}

/// The permissions notice shown above the catalog
pub async fn permission_notice(State(state): State<AppState>) -> Result<Json<NamedContentView>> {
    named_content(&state, "permission").await
}
