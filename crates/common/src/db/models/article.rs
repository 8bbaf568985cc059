//! Article entity
//!
//! A single published paper belonging to one issue. Carries denormalized
//! copies of the parent issue's volume/issue_number/publication_date taken
//! at creation time; these are never re-synchronized after issue edits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Access tier of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "accessability")]
pub enum Accessability {
    #[sea_orm(string_value = "open_access")]
    OpenAccess,
    #[sea_orm(string_value = "subscription")]
    Subscription,
    #[sea_orm(string_value = "restricted")]
    Restricted,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub issue_id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Free text, may list multiple comma- or semicolon-joined names
    pub authors: String,

    pub accessability: Accessability,

    /// Downloadable asset reference, if any
    #[sea_orm(column_type = "Text", nullable)]
    pub file: Option<String>,

    // Denormalized from the parent issue at creation time
    pub volume: String,
    pub issue_number: String,
    pub publication_date: Date,

    /// View counter, monotonically non-decreasing
    pub views: i64,

    // Citation enrichment, mutated only by the citation sync service
    #[sea_orm(column_type = "Text", nullable)]
    pub scholar_cluster_id: Option<String>,

    /// Search-query override for the citation sync
    #[sea_orm(column_type = "Text", nullable)]
    pub google_scholar_query: Option<String>,

    pub citation_count: i64,

    pub last_scholar_sync: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::issue::Entity",
        from = "Column::IssueId",
        to = "super::issue::Column::Id"
    )]
    Issue,
}

impl Related<super::issue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Issue.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
