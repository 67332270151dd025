use crate::models::{ProfileStats, User};
use sqlx::PgPool;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, first_name, last_name, date_joined";

/// Fields collected by the sign-up form
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

pub async fn create_user(pool: &PgPool, new_user: &NewUser<'_>) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (username, email, password_hash, first_name, last_name)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(new_user.username)
    .bind(new_user.email)
    .bind(new_user.password_hash)
    .bind(new_user.first_name)
    .bind(new_user.last_name)
    .fetch_one(pool)
    .await
}

pub async fn get_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
    ))
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn username_exists(pool: &PgPool, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

/// Post, follower and following counts for a profile page
pub async fn get_profile_stats(pool: &PgPool, user_id: i64) -> Result<ProfileStats, sqlx::Error> {
    sqlx::query_as::<_, ProfileStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM posts WHERE author_id = $1)   AS posts,
            (SELECT COUNT(*) FROM follows WHERE author_id = $1) AS followers,
            (SELECT COUNT(*) FROM follows WHERE user_id = $1)   AS following
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
