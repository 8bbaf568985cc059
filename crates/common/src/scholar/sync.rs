//! Citation sync service
//!
//! Enriches an article with an external citation count and cluster id,
//! driven by a per-article cool-down on `last_scholar_sync`:
//!
//! NEVER_SYNCED -> FRESH (synced within the window) -> STALE -> FRESH again
//! after the next successful sync.
//!
//! Every failure mode is soft: the operation reports `(changed, message)`
//! and never propagates an error past its boundary. State is persisted only
//! on the success path, after the external call has completed.

use crate::db::models::Article;
use crate::db::Repository;
use crate::errors::{AppError, Result};
use crate::scholar::BibliographicSearch;
use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Cool-down window between automatic re-syncs for the same article
pub const SYNC_COOLDOWN_HOURS: i64 = 24;

/// Candidates pulled from the result stream before falling back
const CANDIDATE_CAP: usize = 3;

/// Sync state of an article, derived from `last_scholar_sync`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Never synced before
    NeverSynced,
    /// Synced within the cool-down window; skipped unless forced
    Fresh,
    /// Synced, window expired
    Stale,
}

/// Derive the sync state at `now`
pub fn sync_state(last_sync: Option<DateTime<Utc>>, now: DateTime<Utc>) -> SyncState {
    match last_sync {
        None => SyncState::NeverSynced,
        Some(at) if now - at < Duration::hours(SYNC_COOLDOWN_HOURS) => SyncState::Fresh,
        Some(_) => SyncState::Stale,
    }
}

/// Outcome of one sync attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Whether stored citation values differ after this attempt
    pub changed: bool,
    /// Human-readable outcome
    pub message: String,
}

impl SyncReport {
    fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            message: message.into(),
        }
    }
}

/// Portion of the article title before its first colon, lower-cased; the
/// needle used for candidate title matching
fn title_needle(title: &str) -> String {
    title
        .split(':')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

fn candidate_title(candidate: &Value) -> Option<&str> {
    candidate
        .get("title")
        .and_then(Value::as_str)
        .or_else(|| {
            candidate
                .get("bib")
                .and_then(|b| b.get("title"))
                .and_then(Value::as_str)
        })
}

fn title_matches(candidate: &Value, needle: &str) -> bool {
    candidate_title(candidate)
        .map(|t| t.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Citation count, first of two field names the service is known to use;
/// defaults to 0 when neither is present
fn candidate_citation_count(candidate: &Value) -> i64 {
    candidate
        .get("num_citations")
        .or_else(|| candidate.get("cited_by_count"))
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

/// Cluster identifier, first of two field shapes: a string `cluster_id` or
/// an integer `cluster`
fn candidate_cluster_id(candidate: &Value) -> Option<String> {
    if let Some(id) = candidate.get("cluster_id").and_then(Value::as_str) {
        return Some(id.to_string());
    }
    candidate
        .get("cluster")
        .and_then(Value::as_i64)
        .map(|n| n.to_string())
}

/// Search query for an article: the explicit override when set, otherwise
/// title and authors joined
fn build_query(article: &Article) -> String {
    if let Some(query) = article
        .google_scholar_query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
    {
        return query.to_string();
    }

    format!("{} {}", article.title, article.authors)
        .trim()
        .to_string()
}

/// Citation sync service over the catalog store and an optional external
/// bibliographic search
pub struct CitationSyncService {
    repo: Repository,
    search: Option<Arc<dyn BibliographicSearch>>,
}

impl CitationSyncService {
    /// Create the service; search capability is decided once here
    pub fn new(repo: Repository, search: Option<Arc<dyn BibliographicSearch>>) -> Self {
        Self { repo, search }
    }

    /// Whether an external bibliographic search is attached
    pub fn has_search_capability(&self) -> bool {
        self.search.is_some()
    }

    /// Sync an article's citation metadata.
    ///
    /// Skips fresh articles unless `force` is set. Soft-fails on every
    /// error path; persists count, cluster id and the sync timestamp in one
    /// write only after the external call has completed.
    pub async fn sync_citations(&self, article: &Article, force: bool) -> SyncReport {
        let now = Utc::now();
        let last_sync = article.last_scholar_sync.map(|t| t.with_timezone(&Utc));

        if !force && sync_state(last_sync, now) == SyncState::Fresh {
            return SyncReport::unchanged("recently updated");
        }

        let query = build_query(article);
        if query.is_empty() {
            return SyncReport::unchanged("no query");
        }

        let Some(search) = self.search.as_deref() else {
            return SyncReport::unchanged("bibliographic search not configured");
        };

        match self.attempt(search, article, &query, now).await {
            Ok(report) => report,
            // Collaborator outages and timeouts degrade to their own reason
            Err(AppError::ScholarUnavailable { message }) => SyncReport::unchanged(message),
            Err(err @ AppError::ScholarTimeout { .. }) => SyncReport::unchanged(err.to_string()),
            Err(err) => {
                tracing::warn!(
                    article_id = article.id,
                    error = %err,
                    "Citation sync failed"
                );
                SyncReport::unchanged(format!("error: {}", err))
            }
        }
    }

    async fn attempt(
        &self,
        search: &dyn BibliographicSearch,
        article: &Article,
        query: &str,
        now: DateTime<Utc>,
    ) -> Result<SyncReport> {
        let mut stream = search.search(query).await?;

        let needle = title_needle(&article.title);
        let mut first: Option<Value> = None;
        let mut selected: Option<Value> = None;
        let mut seen = 0;

        while seen < CANDIDATE_CAP {
            let Some(item) = stream.next().await else {
                break;
            };
            let candidate = item?;

            if first.is_none() {
                first = Some(candidate.clone());
            }
            seen += 1;

            if title_matches(&candidate, &needle) {
                selected = Some(candidate);
                break;
            }
        }

        // No title match within the cap: degrade to the first candidate, the
        // stream is relevance-ordered.
        let Some(chosen) = selected.or(first) else {
            return Ok(SyncReport::unchanged("no result"));
        };

        let citation_count = candidate_citation_count(&chosen);
        let cluster_id = candidate_cluster_id(&chosen);

        let changed = citation_count != article.citation_count
            || cluster_id != article.scholar_cluster_id;

        self.repo
            .apply_citation_sync(article.id, citation_count, cluster_id, now)
            .await?;

        metrics::counter!("journal_citation_syncs_total").increment(1);
        tracing::info!(
            article_id = article.id,
            citation_count,
            changed,
            "Citation sync completed"
        );

        Ok(SyncReport {
            changed,
            message: if changed { "updated" } else { "no change" }.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Accessability;
    use crate::db::DbPool;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use futures::stream::BoxStream;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;
    use std::sync::Mutex;

    struct FakeSearch {
        results: Vec<Value>,
        unavailable: Option<String>,
        last_query: Mutex<Option<String>>,
    }

    impl FakeSearch {
        fn with_results(results: Vec<Value>) -> Self {
            Self {
                results,
                unavailable: None,
                last_query: Mutex::new(None),
            }
        }

        fn unavailable(reason: &str) -> Self {
            Self {
                results: Vec::new(),
                unavailable: Some(reason.to_string()),
                last_query: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl BibliographicSearch for FakeSearch {
        async fn search(&self, query: &str) -> Result<BoxStream<'static, Result<Value>>> {
            *self.last_query.lock().unwrap() = Some(query.to_string());

            if let Some(reason) = &self.unavailable {
                return Err(AppError::ScholarUnavailable {
                    message: reason.clone(),
                });
            }

            let items: Vec<Result<Value>> =
                self.results.clone().into_iter().map(Ok).collect();
            Ok(futures::stream::iter(items).boxed())
        }
    }

    fn article_fixture() -> Article {
        let now = Utc::now();
        Article {
            id: 1,
            issue_id: 1,
            title: "Decolonizing Modernism: Virginia Woolf and Ama Ata Aidoo".into(),
            description: None,
            authors: "Dr. Kwame Asante".into(),
            accessability: Accessability::OpenAccess,
            file: None,
            volume: "21".into(),
            issue_number: "1".into(),
            publication_date: NaiveDate::from_ymd_opt(2023, 7, 1).unwrap(),
            views: 0,
            scholar_cluster_id: None,
            google_scholar_query: None,
            citation_count: 0,
            last_scholar_sync: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    /// Repository over a mock connection; `persists` controls whether a
    /// write is expected (an unexpected write panics the mock).
    fn repo(persists: bool) -> Repository {
        let mut db = MockDatabase::new(DatabaseBackend::Postgres);
        if persists {
            db = db.append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        }
        Repository::new(DbPool {
            primary: Arc::new(db.into_connection()),
            replica: None,
        })
    }

    fn service(search: FakeSearch, persists: bool) -> CitationSyncService {
        CitationSyncService::new(repo(persists), Some(Arc::new(search)))
    }

    #[test]
    fn state_machine_transitions() {
        let now = Utc::now();
        assert_eq!(sync_state(None, now), SyncState::NeverSynced);
        assert_eq!(
            sync_state(Some(now - Duration::hours(2)), now),
            SyncState::Fresh
        );
        assert_eq!(
            sync_state(Some(now - Duration::hours(25)), now),
            SyncState::Stale
        );
        // The window boundary is already stale
        assert_eq!(
            sync_state(Some(now - Duration::hours(SYNC_COOLDOWN_HOURS)), now),
            SyncState::Stale
        );
    }

    #[test]
    fn needle_is_pre_colon_prefix_lowercased() {
        assert_eq!(
            title_needle("Decolonizing Modernism: Virginia Woolf and Ama Ata Aidoo"),
            "decolonizing modernism"
        );
        assert_eq!(title_needle("No Colon Here"), "no colon here");
    }

    #[test]
    fn citation_count_tries_both_field_names() {
        assert_eq!(candidate_citation_count(&json!({"num_citations": 7})), 7);
        assert_eq!(candidate_citation_count(&json!({"cited_by_count": 3})), 3);
        assert_eq!(
            candidate_citation_count(&json!({"num_citations": 7, "cited_by_count": 3})),
            7
        );
        assert_eq!(candidate_citation_count(&json!({"title": "x"})), 0);
    }

    #[test]
    fn cluster_id_handles_both_shapes() {
        assert_eq!(
            candidate_cluster_id(&json!({"cluster_id": "abc123"})),
            Some("abc123".to_string())
        );
        assert_eq!(
            candidate_cluster_id(&json!({"cluster": 42})),
            Some("42".to_string())
        );
        assert_eq!(candidate_cluster_id(&json!({"title": "x"})), None);
    }

    #[tokio::test]
    async fn fresh_article_is_skipped_without_force() {
        let mut article = article_fixture();
        article.last_scholar_sync = Some(Utc::now().into());

        let svc = service(FakeSearch::with_results(vec![json!({"title": "x"})]), false);
        let report = svc.sync_citations(&article, false).await;

        assert!(!report.changed);
        assert_eq!(report.message, "recently updated");
    }

    #[tokio::test]
    async fn force_bypasses_cooldown() {
        let mut article = article_fixture();
        article.last_scholar_sync = Some(Utc::now().into());

        let results = vec![json!({"title": "Decolonizing modernism", "num_citations": 5})];
        let svc = service(FakeSearch::with_results(results), true);
        let report = svc.sync_citations(&article, true).await;

        assert!(report.changed);
        assert_eq!(report.message, "updated");
    }

    #[tokio::test]
    async fn second_candidate_title_match_wins_over_first() {
        let results = vec![
            json!({"title": "An Unrelated Paper", "num_citations": 99}),
            json!({"title": "DECOLONIZING MODERNISM revisited", "num_citations": 12, "cluster_id": "c2"}),
            json!({"title": "Decolonizing Modernism again", "num_citations": 1}),
        ];
        let svc = service(FakeSearch::with_results(results), true);
        let report = svc.sync_citations(&article_fixture(), false).await;

        // The selected candidate carries count 12, which differs from 0
        assert!(report.changed);
        assert_eq!(report.message, "updated");
    }

    #[tokio::test]
    async fn no_title_match_falls_back_to_first_candidate() {
        let results = vec![
            json!({"title": "Completely Different A", "num_citations": 4}),
            json!({"title": "Completely Different B", "num_citations": 8}),
        ];
        let svc = service(FakeSearch::with_results(results), true);
        let report = svc.sync_citations(&article_fixture(), false).await;

        assert!(report.changed);
    }

    #[tokio::test]
    async fn match_beyond_candidate_cap_is_ignored() {
        let results = vec![
            json!({"title": "A", "num_citations": 1}),
            json!({"title": "B"}),
            json!({"title": "C"}),
            json!({"title": "Decolonizing Modernism, the real one", "num_citations": 50}),
        ];
        // Falls back to candidate 0, still a completed sync
        let svc = service(FakeSearch::with_results(results), true);
        let report = svc.sync_citations(&article_fixture(), false).await;

        assert!(report.changed);
    }

    #[tokio::test]
    async fn empty_stream_reports_no_result_and_persists_nothing() {
        // Mock repo without exec results: any persist attempt would panic
        let svc = service(FakeSearch::with_results(Vec::new()), false);
        let report = svc.sync_citations(&article_fixture(), false).await;

        assert!(!report.changed);
        assert_eq!(report.message, "no result");
    }

    #[tokio::test]
    async fn unavailable_service_degrades_softly() {
        let svc = service(FakeSearch::unavailable("connection refused"), false);
        let report = svc.sync_citations(&article_fixture(), false).await;

        assert!(!report.changed);
        assert_eq!(report.message, "connection refused");
    }

    #[tokio::test]
    async fn missing_search_capability_is_soft() {
        let svc = CitationSyncService::new(repo(false), None);
        assert!(!svc.has_search_capability());

        let report = svc.sync_citations(&article_fixture(), false).await;
        assert!(!report.changed);
        assert_eq!(report.message, "bibliographic search not configured");
    }

    #[tokio::test]
    async fn blank_title_and_authors_yield_no_query() {
        let mut article = article_fixture();
        article.title = "  ".into();
        article.authors = String::new();

        let svc = service(FakeSearch::with_results(vec![json!({"title": "x"})]), false);
        let report = svc.sync_citations(&article, false).await;

        assert!(!report.changed);
        assert_eq!(report.message, "no query");
    }

    #[tokio::test]
    async fn query_override_is_used_verbatim() {
        let mut article = article_fixture();
        article.google_scholar_query = Some("aidoo woolf modernism".into());

        let search = Arc::new(FakeSearch::with_results(vec![json!({"title": "whatever"})]));
        let svc = CitationSyncService::new(repo(true), Some(search.clone()));

        let _ = svc.sync_citations(&article, false).await;

        assert_eq!(
            search.last_query.lock().unwrap().as_deref(),
            Some("aidoo woolf modernism")
        );
    }

    #[tokio::test]
    async fn unchanged_values_still_complete_the_attempt() {
        let mut article = article_fixture();
        article.citation_count = 5;
        article.scholar_cluster_id = Some("c1".into());

        let results =
            vec![json!({"title": "Decolonizing Modernism", "num_citations": 5, "cluster_id": "c1"})];
        // The timestamp write still happens, so the mock expects one exec
        let svc = service(FakeSearch::with_results(results), true);
        let report = svc.sync_citations(&article, false).await;

        assert!(!report.changed);
        assert_eq!(report.message, "no change");
    }
}
