/// URL configuration
///
/// Order matters: fixed prefixes (`/new/`, `/follow/`, `/auth/...`, flatpages)
/// are registered before the `/{username}/...` catch-alls.
use actix_web::{
    body::MessageBody,
    dev::ServiceResponse,
    http::{
        header::{self, HeaderValue},
        StatusCode,
    },
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    web, HttpResponse,
};
use askama::Template;

use crate::handlers;
use crate::metrics::serve_metrics;
use crate::middleware::CurrentUser;
use crate::templates::{NotFoundTemplate, ServerErrorTemplate};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(serve_metrics))
        .route("/health", web::get().to(handlers::health_summary))
        .route("/health/ready", web::get().to(handlers::readiness_summary))
        .route("/health/live", web::get().to(handlers::liveness_check))
        .route("/media/{path:.*}", web::get().to(handlers::serve_media))
        .service(web::resource("/").route(web::get().to(handlers::index)))
        .service(web::resource("/group/{slug}/").route(web::get().to(handlers::group_posts)))
        .service(
            web::resource("/new/")
                .route(web::get().to(handlers::new_post_form))
                .route(web::post().to(handlers::create_post)),
        )
        .service(web::resource("/follow/").route(web::get().to(handlers::follow_index)))
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(handlers::signup_form))
                        .route(web::post().to(handlers::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(handlers::login_form))
                        .route(web::post().to(handlers::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(handlers::logout))
                        .route(web::post().to(handlers::logout)),
                ),
        );

    for url in handlers::pages::FLATPAGE_URLS {
        cfg.service(web::resource(url).route(web::get().to(handlers::flatpage)));
    }

    cfg.service(
        web::resource("/{username}/follow/").route(web::get().to(handlers::profile_follow)),
    )
    .service(
        web::resource("/{username}/unfollow/").route(web::get().to(handlers::profile_unfollow)),
    )
    .service(web::resource("/{username}/{post_id}/").route(web::get().to(handlers::post_view)))
    .service(
        web::resource("/{username}/{post_id}/edit/")
            .route(web::get().to(handlers::edit_post_form))
            .route(web::post().to(handlers::edit_post)),
    )
    .service(
        web::resource("/{username}/{post_id}/comment")
            .route(web::post().to(handlers::add_comment)),
    )
    .service(web::resource("/{username}/").route(web::get().to(handlers::profile)))
    .default_service(web::to(|| async { HttpResponse::NotFound().finish() }));
}

/// Replace 404 and 500 bodies with the site's error pages.
pub fn error_pages<B: MessageBody + 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::NOT_FOUND, not_found_page)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, server_error_page)
}

fn not_found_page<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let template = NotFoundTemplate {
        user: CurrentUser::from_request_parts(res.request()).0,
        path: res.request().path().to_string(),
    };
    let html = template.render().unwrap_or_else(|e| {
        tracing::error!("Failed to render 404 page: {}", e);
        "Not Found".to_string()
    });
    with_html_body(res, html)
}

fn server_error_page<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let template = ServerErrorTemplate {
        user: CurrentUser::from_request_parts(res.request()).0,
    };
    let html = template.render().unwrap_or_else(|e| {
        tracing::error!("Failed to render 500 page: {}", e);
        "Internal Server Error".to_string()
    });
    with_html_body(res, html)
}

fn with_html_body<B>(res: ServiceResponse<B>, html: String) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let (req, res) = res.into_parts();
    let mut res = res.set_body(html);
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    let res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
