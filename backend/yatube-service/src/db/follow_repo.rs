use sqlx::PgPool;

/// Idempotent create; returns true if a new row was inserted.
pub async fn create_follow(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO follows (user_id, author_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, author_id) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;

    Ok(inserted.is_some())
}

/// Idempotent delete; returns true if a row was removed.
pub async fn delete_follow(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
    let affected = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
        .bind(user_id)
        .bind(author_id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(affected > 0)
}

pub async fn is_following(pool: &PgPool, user_id: i64, author_id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
    )
    .bind(user_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
}
