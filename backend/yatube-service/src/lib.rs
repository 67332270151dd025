/// Yatube Service Library
///
/// A server-rendered blogging site: users publish posts (optionally with an
/// image) into thematic groups, comment on posts and follow authors.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `routes`: URL table and error pages
/// - `forms`: form binding and validation
/// - `templates`: askama page templates
/// - `services`: business logic layer
/// - `db`: database access layer and repositories
/// - `models`: row and view types
/// - `cache`: rendered index page cache
/// - `media`: uploaded image storage
/// - `middleware`: session and metrics middleware
/// - `error`: error types and handling
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod app;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod services;
pub mod templates;

pub use app::AppServices;
pub use config::Config;
pub use error::{AppError, Result};
