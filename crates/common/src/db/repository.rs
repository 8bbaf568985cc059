//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, Statement,
};
use std::collections::HashMap;

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Issue Operations
    // ========================================================================

    /// Find issue by ID
    pub async fn find_issue_by_id(&self, id: i32) -> Result<Option<Issue>> {
        IssueEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// The issue with the maximum publication date, ties broken by highest id.
    /// None if the catalog is empty.
    pub async fn latest_issue(&self) -> Result<Option<Issue>> {
        IssueEntity::find()
            .order_by_desc(IssueColumn::PublicationDate)
            .order_by_desc(IssueColumn::Id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// All issues ordered ascending by publication date (insertion order for
    /// equal dates), as consumed by the archive grouping.
    pub async fn all_issues_chronological(&self) -> Result<Vec<Issue>> {
        IssueEntity::find()
            .order_by_asc(IssueColumn::PublicationDate)
            .order_by_asc(IssueColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// All issues by publication date descending, for the sitemap feed
    pub async fn issues_for_sitemap(&self) -> Result<Vec<Issue>> {
        IssueEntity::find()
            .order_by_desc(IssueColumn::PublicationDate)
            .order_by_desc(IssueColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Delete an issue; its articles are removed by the cascade
    pub async fn delete_issue(&self, id: i32) -> Result<bool> {
        let result = IssueEntity::delete_by_id(id)
            .exec(self.write_conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Article Operations
    // ========================================================================

    /// Find article by ID
    pub async fn find_article_by_id(&self, id: i32) -> Result<Option<Article>> {
        ArticleEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Articles ordered by publication date descending, ties by id descending
    pub async fn latest_articles(&self, limit: u64) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .order_by_desc(ArticleColumn::PublicationDate)
            .order_by_desc(ArticleColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Articles ordered by view count descending, ties by id descending
    pub async fn most_viewed_articles(&self, limit: u64) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .order_by_desc(ArticleColumn::Views)
            .order_by_desc(ArticleColumn::Id)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Articles of one issue in creation order.
    ///
    /// Fails with `IssueNotFound` when the issue does not exist; an existing
    /// issue with no articles yields an empty vector.
    pub async fn articles_for_issue(&self, issue_id: i32) -> Result<Vec<Article>> {
        let issue = self.find_issue_by_id(issue_id).await?;
        if issue.is_none() {
            return Err(AppError::IssueNotFound { id: issue_id });
        }

        ArticleEntity::find()
            .filter(ArticleColumn::IssueId.eq(issue_id))
            .order_by_asc(ArticleColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// All articles by publication date descending, for the sitemap feed
    pub async fn articles_for_sitemap(&self) -> Result<Vec<Article>> {
        ArticleEntity::find()
            .order_by_desc(ArticleColumn::PublicationDate)
            .order_by_desc(ArticleColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Atomically increment an article's view counter.
    ///
    /// A single UPDATE at the storage layer so concurrent readers never lose
    /// updates. Returns false when the article does not exist; callers treat
    /// that (and any error) as a no-op.
    pub async fn record_view(&self, article_id: i32) -> Result<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE article SET views = views + 1 WHERE id = $1",
            vec![article_id.into()],
        );

        let result = self.write_conn().execute(stmt).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Persist the outcome of a completed citation sync attempt.
    ///
    /// One UPDATE covering count, cluster id and the sync timestamp; the
    /// timestamp advances even when the values are unchanged, which is what
    /// drives the cool-down.
    pub async fn apply_citation_sync(
        &self,
        article_id: i32,
        citation_count: i64,
        scholar_cluster_id: Option<String>,
        synced_at: DateTime<Utc>,
    ) -> Result<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE article
            SET citation_count = $1, scholar_cluster_id = $2, last_scholar_sync = $3
            WHERE id = $4
            "#,
            vec![
                citation_count.into(),
                scholar_cluster_id.into(),
                synced_at.into(),
                article_id.into(),
            ],
        );

        self.write_conn().execute(stmt).await?;
        Ok(())
    }

    // ========================================================================
    // Mailing-List Operations
    // ========================================================================

    /// Record a mailing-list join request.
    ///
    /// No e-mail deduplication at this layer: duplicate submissions are
    /// accepted as separate records.
    pub async fn create_join_request(
        &self,
        first_name: String,
        last_name: String,
        email: String,
        institution: String,
        country: String,
    ) -> Result<JoinRequest> {
        let now = Utc::now();

        let request = JoinRequestActiveModel {
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            institution: Set(institution),
            country: Set(country),
            created_at: Set(now.into()),
            ..Default::default()
        };

        request.insert(self.write_conn()).await.map_err(Into::into)
    }

    // ========================================================================
    // Site Settings
    // ========================================================================

    /// Load all site settings into a name -> value map
    pub async fn site_settings_map(&self) -> Result<HashMap<String, String>> {
        let settings = SiteSettingEntity::find().all(self.read_conn()).await?;

        Ok(settings.into_iter().map(|s| (s.name, s.value)).collect())
    }

    /// Find a single setting by its unique name
    pub async fn find_setting_by_name(&self, name: &str) -> Result<Option<SiteSetting>> {
        SiteSettingEntity::find()
            .filter(SiteSettingColumn::Name.eq(name))
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Subscribe Page
    // ========================================================================

    /// Subscribe-page content blocks for one placement, oldest first
    pub async fn subscribe_content_for(
        &self,
        placement: Placement,
    ) -> Result<Vec<SubscribeContent>> {
        SubscribeContentEntity::find()
            .filter(SubscribeContentColumn::Placement.eq(placement))
            .order_by_asc(SubscribeContentColumn::CreatedAt)
            .order_by_asc(SubscribeContentColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Permissions Catalog
    // ========================================================================

    /// All permission entries in name order
    pub async fn list_permissions(&self) -> Result<Vec<Permission>> {
        PermissionEntity::find()
            .order_by_asc(PermissionColumn::Name)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// One permission entry.
    ///
    /// Id 1 is a stable alias for the first entry in name order, so the
    /// default permissions page survives catalog reshuffles.
    pub async fn permission_or_first(&self, id: i32) -> Result<Option<Permission>> {
        if id == 1 {
            return PermissionEntity::find()
                .order_by_asc(PermissionColumn::Name)
                .one(self.read_conn())
                .await
                .map_err(Into::into);
        }

        PermissionEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // About Pages
    // ========================================================================

    /// About pages ordered by title, capped for navigation use
    pub async fn list_about_pages(&self, limit: u64) -> Result<Vec<AboutPage>> {
        AboutPageEntity::find()
            .order_by_asc(AboutPageColumn::Title)
            .limit(limit)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Find an About page by ID
    pub async fn find_about_page(&self, id: i32) -> Result<Option<AboutPage>> {
        AboutPageEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn pool_from(conn: DatabaseConnection) -> DbPool {
        DbPool {
            primary: Arc::new(conn),
            replica: None,
        }
    }

    fn issue_fixture(id: i32, date: NaiveDate) -> Issue {
        let now = Utc::now();
        Issue {
            id,
            title: format!("Issue {}", id),
            description: None,
            volume: "21".into(),
            issue_number: id.to_string(),
            publication_date: date,
            cover_image: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn latest_issue_returns_single_row() {
        let date = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![issue_fixture(3, date)]])
            .into_connection();

        let repo = Repository::new(pool_from(db));
        let latest = repo.latest_issue().await.unwrap();
        assert_eq!(latest.unwrap().id, 3);
    }

    #[tokio::test]
    async fn latest_issue_empty_catalog_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Issue>::new()])
            .into_connection();

        let repo = Repository::new(pool_from(db));
        assert!(repo.latest_issue().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn articles_for_missing_issue_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Issue>::new()])
            .into_connection();

        let repo = Repository::new(pool_from(db));
        let err = repo.articles_for_issue(42).await.unwrap_err();
        assert!(matches!(err, AppError::IssueNotFound { id: 42 }));
    }

    #[tokio::test]
    async fn record_view_missing_article_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = Repository::new(pool_from(db));
        assert!(!repo.record_view(999).await.unwrap());
    }

    #[tokio::test]
    async fn record_view_hits_existing_article() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = Repository::new(pool_from(db));
        assert!(repo.record_view(1).await.unwrap());
    }

    #[tokio::test]
    async fn join_requests_are_never_deduplicated() {
        let now = Utc::now();
        let row = |id: i32| JoinRequest {
            id,
            first_name: "Alice".into(),
            last_name: "Lee".into(),
            email: "alice@example.edu".into(),
            institution: "Oxford".into(),
            country: "United Kingdom".into(),
            created_at: now.into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(1)], vec![row(2)]])
            .into_connection();

        let repo = Repository::new(pool_from(db));

        let first = repo
            .create_join_request(
                "Alice".into(),
                "Lee".into(),
                "alice@example.edu".into(),
                "Oxford".into(),
                "United Kingdom".into(),
            )
            .await
            .unwrap();
        let second = repo
            .create_join_request(
                "Alice".into(),
                "Lee".into(),
                "alice@example.edu".into(),
                "Oxford".into(),
                "United Kingdom".into(),
            )
            .await
            .unwrap();

        // Identical submissions land as distinct records
        assert_ne!(first.id, second.id);
        assert_eq!(first.email, second.email);
    }

    #[tokio::test]
    async fn delete_issue_reports_whether_a_row_was_removed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = Repository::new(pool_from(db));
        assert!(repo.delete_issue(3).await.unwrap());
        assert!(!repo.delete_issue(3).await.unwrap());
    }

    #[tokio::test]
    async fn find_setting_by_name_returns_unique_row() {
        let row = SiteSetting {
            id: 1,
            name: "submission".into(),
            value: "How to submit a manuscript".into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row], Vec::<SiteSetting>::new()])
            .into_connection();

        let repo = Repository::new(pool_from(db));

        let found = repo.find_setting_by_name("submission").await.unwrap();
        assert_eq!(found.unwrap().value, "How to submit a manuscript");
        assert!(repo.find_setting_by_name("missing").await.unwrap().is_none());
    }

    fn permission_fixture(id: i32, name: &str) -> Permission {
        let now = Utc::now();
        Permission {
            id,
            name: name.into(),
            description: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn permission_id_one_aliases_first_entry_in_name_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![permission_fixture(7, "Archiving")]])
            .into_connection();

        let repo = Repository::new(pool_from(db));

        let entry = repo.permission_or_first(1).await.unwrap().unwrap();
        // The alias resolves by catalog order, not by the literal id
        assert_eq!(entry.id, 7);
        assert_eq!(entry.name, "Archiving");
    }

    #[tokio::test]
    async fn subscribe_content_is_fetched_per_placement() {
        let now = Utc::now();
        let block = |id: i32| SubscribeContent {
            id,
            title: format!("Block {}", id),
            content: "body".into(),
            placement: Placement::Main,
            created_at: now.into(),
            updated_at: now.into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![block(1), block(2)]])
            .into_connection();

        let repo = Repository::new(pool_from(db));

        let main = repo.subscribe_content_for(Placement::Main).await.unwrap();
        assert_eq!(main.len(), 2);
        assert_eq!(main[0].id, 1);
    }

    #[tokio::test]
    async fn missing_permission_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Permission>::new()])
            .into_connection();

        let repo = Repository::new(pool_from(db));
        assert!(repo.permission_or_first(9).await.unwrap().is_none());
    }
}
