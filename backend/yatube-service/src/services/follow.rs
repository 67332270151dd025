/// Follow service - subscriptions between users
use crate::db::{follow_repo, user_repo};
use crate::error::{AppError, Result};
use crate::metrics::content::CONTENT_CREATED_TOTAL;
use crate::models::User;
use sqlx::PgPool;

pub struct FollowService {
    pool: PgPool,
}

impl FollowService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn author(&self, username: &str) -> Result<User> {
        user_repo::get_user_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {}", username)))
    }

    pub async fn is_following(&self, user_id: i64, author_id: i64) -> Result<bool> {
        Ok(follow_repo::is_following(&self.pool, user_id, author_id).await?)
    }

    /// Idempotent; following yourself does nothing.
    pub async fn follow(&self, user_id: i64, author_username: &str) -> Result<User> {
        let author = self.author(author_username).await?;
        if author.id == user_id {
            tracing::debug!(user_id, "Ignoring self-follow");
            return Ok(author);
        }

        if follow_repo::create_follow(&self.pool, user_id, author.id).await? {
            CONTENT_CREATED_TOTAL.with_label_values(&["follow"]).inc();
            tracing::info!(user_id, author_id = author.id, "Follow created");
        }

        Ok(author)
    }

    pub async fn unfollow(&self, user_id: i64, author_username: &str) -> Result<User> {
        let author = self.author(author_username).await?;
        if follow_repo::delete_follow(&self.pool, user_id, author.id).await? {
            tracing::info!(user_id, author_id = author.id, "Follow removed");
        }
        Ok(author)
    }
}
