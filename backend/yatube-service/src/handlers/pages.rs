/// Static pages - flatpages and uploaded media
use actix_web::{web, HttpRequest, HttpResponse};
use sqlx::PgPool;

use crate::db::flatpage_repo;
use crate::error::{AppError, Result};
use crate::media::{content_type_for, MediaStore};
use crate::middleware::CurrentUser;
use crate::templates::{render, FlatPageTemplate};

/// URLs served from the `flatpages` table.
pub const FLATPAGE_URLS: [&str; 5] = [
    "/about-us/",
    "/terms/",
    "/about-author/",
    "/about-spec/",
    "/contact/",
];

/// GET one of `FLATPAGE_URLS`; the request path is the lookup key.
pub async fn flatpage(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let flatpage = flatpage_repo::get_flatpage_by_url(pool.get_ref(), req.path())
        .await?
        .ok_or_else(|| AppError::not_found(format!("flatpage {}", req.path())))?;

    render(&FlatPageTemplate {
        user: user.0,
        flatpage,
    })
}

/// GET /media/{path}
pub async fn serve_media(
    store: web::Data<MediaStore>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let relative = path.into_inner();
    let file = store
        .resolve(&relative)
        .ok_or_else(|| AppError::not_found(format!("media {}", relative)))?;

    let bytes = match tokio::fs::read(&file).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::not_found(format!("media {}", relative)));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&file))
        .body(bytes))
}
