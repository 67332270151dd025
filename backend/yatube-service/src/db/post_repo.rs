use crate::models::{Post, PostView};
use sqlx::PgPool;

const POST_VIEW_SELECT: &str = r#"
    SELECT p.id, p.text, p.pub_date, p.author_id, u.username AS author_username,
           p.group_id, g.title AS group_title, g.slug AS group_slug, p.image,
           (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN groups g ON g.id = p.group_id
"#;

const POST_COLUMNS: &str = "id, text, pub_date, author_id, group_id, image";

/// Which posts a listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
    /// Posts by every author the given user follows
    FollowedBy(i64),
}

impl PostFilter {
    fn where_clause(&self) -> &'static str {
        match self {
            PostFilter::All => "",
            PostFilter::Group(_) => "WHERE p.group_id = $1",
            PostFilter::Author(_) => "WHERE p.author_id = $1",
            PostFilter::FollowedBy(_) => {
                "WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = $1)"
            }
        }
    }

    fn param(&self) -> Option<i64> {
        match self {
            PostFilter::All => None,
            PostFilter::Group(id) | PostFilter::Author(id) | PostFilter::FollowedBy(id) => {
                Some(*id)
            }
        }
    }
}

pub async fn count_posts(pool: &PgPool, filter: PostFilter) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM posts p {}", filter.where_clause());
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(id) = filter.param() {
        query = query.bind(id);
    }
    query.fetch_one(pool).await
}

/// One page of a listing, newest first
pub async fn list_posts(
    pool: &PgPool,
    filter: PostFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<PostView>, sqlx::Error> {
    let (limit_idx, offset_idx) = if filter.param().is_some() { (2, 3) } else { (1, 2) };
    let sql = format!(
        "{POST_VIEW_SELECT} {} ORDER BY p.pub_date DESC, p.id DESC LIMIT ${limit_idx} OFFSET ${offset_idx}",
        filter.where_clause()
    );

    let mut query = sqlx::query_as::<_, PostView>(&sql);
    if let Some(id) = filter.param() {
        query = query.bind(id);
    }
    query.bind(limit).bind(offset).fetch_all(pool).await
}

/// A post of the given author, joined for display
pub async fn get_post_view(
    pool: &PgPool,
    post_id: i64,
    author_id: i64,
) -> Result<Option<PostView>, sqlx::Error> {
    let sql = format!("{POST_VIEW_SELECT} WHERE p.id = $1 AND p.author_id = $2");
    sqlx::query_as::<_, PostView>(&sql)
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await
}

/// A post of the given author
pub async fn get_post(
    pool: &PgPool,
    post_id: i64,
    author_id: i64,
) -> Result<Option<Post>, sqlx::Error> {
    let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1 AND author_id = $2");
    sqlx::query_as::<_, Post>(&sql)
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await
}

pub async fn create_post(
    pool: &PgPool,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<Post, sqlx::Error> {
    let sql = format!(
        "INSERT INTO posts (author_id, text, group_id, image) VALUES ($1, $2, $3, $4) RETURNING {POST_COLUMNS}"
    );
    sqlx::query_as::<_, Post>(&sql)
        .bind(author_id)
        .bind(text)
        .bind(group_id)
        .bind(image)
        .fetch_one(pool)
        .await
}

/// Overwrite the editable fields; returns false when the post is not the author's.
pub async fn update_post(
    pool: &PgPool,
    post_id: i64,
    author_id: i64,
    text: &str,
    group_id: Option<i64>,
    image: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET text = $1, group_id = $2, image = $3
        WHERE id = $4 AND author_id = $5
        "#,
    )
    .bind(text)
    .bind(group_id)
    .bind(image)
    .bind(post_id)
    .bind(author_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_parameters() {
        assert_eq!(PostFilter::All.param(), None);
        assert_eq!(PostFilter::Group(3).param(), Some(3));
        assert_eq!(PostFilter::FollowedBy(9).param(), Some(9));
        assert!(PostFilter::All.where_clause().is_empty());
        assert!(PostFilter::FollowedBy(1).where_clause().contains("follows"));
    }
}
