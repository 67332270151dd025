/// Business logic layer
///
/// Services own a `PgPool` clone and combine repository calls, media storage
/// and metrics; handlers stay thin.
pub mod auth;
pub mod follow;
pub mod posts;

pub use auth::AuthService;
pub use follow::FollowService;
pub use posts::PostService;
