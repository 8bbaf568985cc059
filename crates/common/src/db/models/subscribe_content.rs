//! Subscribe page content entity
//!
//! Editorial content blocks for the subscription page, split between the
//! main column and the sidebar.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which region of the subscribe page a block renders in
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "placement")]
pub enum Placement {
    #[sea_orm(string_value = "main")]
    Main,
    #[sea_orm(string_value = "sidebar")]
    Sidebar,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscribe_content")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub content: String,

    pub placement: Placement,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
