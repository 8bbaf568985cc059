//! SeaORM entity models
//!
//! Database entities for the journal platform

mod about_page;
mod article;
mod issue;
mod join_request;
mod permission;
mod site_setting;
mod subscribe_content;

pub use issue::{
    Entity as IssueEntity,
    Model as Issue,
    ActiveModel as IssueActiveModel,
    Column as IssueColumn,
};

pub use article::{
    Entity as ArticleEntity,
    Model as Article,
    ActiveModel as ArticleActiveModel,
    Column as ArticleColumn,
    Accessability,
};

pub use join_request::{
    Entity as JoinRequestEntity,
    Model as JoinRequest,
    ActiveModel as JoinRequestActiveModel,
    Column as JoinRequestColumn,
};

pub use site_setting::{
    Entity as SiteSettingEntity,
    Model as SiteSetting,
    ActiveModel as SiteSettingActiveModel,
    Column as SiteSettingColumn,
};

pub use about_page::{
    Entity as AboutPageEntity,
    Model as AboutPage,
    ActiveModel as AboutPageActiveModel,
    Column as AboutPageColumn,
};

pub use subscribe_content::{
    Entity as SubscribeContentEntity,
    Model as SubscribeContent,
    ActiveModel as SubscribeContentActiveModel,
    Column as SubscribeContentColumn,
    Placement,
};

pub use permission::{
    Entity as PermissionEntity,
    Model as Permission,
    ActiveModel as PermissionActiveModel,
    Column as PermissionColumn,
};
