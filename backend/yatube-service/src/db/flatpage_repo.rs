use crate::models::FlatPage;
use sqlx::PgPool;

pub async fn get_flatpage_by_url(pool: &PgPool, url: &str) -> Result<Option<FlatPage>, sqlx::Error> {
    sqlx::query_as::<_, FlatPage>("SELECT id, url, title, content FROM flatpages WHERE url = $1")
        .bind(url)
        .fetch_optional(pool)
        .await
}
