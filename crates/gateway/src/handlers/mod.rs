//! API handlers module

pub mod articles;
pub mod health;
pub mod issues;
pub mod mailing;
pub mod pages;
pub mod sitemap;
