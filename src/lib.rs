pub mod app;
pub mod catalog;
pub mod comments;
pub mod config;
pub mod models;
pub mod query;
pub mod ratings;
pub mod storage;
pub mod watchlist;

pub use app::AppState;
pub use catalog::{Catalog, CatalogError};
pub use query::QueryEngine;
