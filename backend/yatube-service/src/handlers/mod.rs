/// HTTP handlers
///
/// Thin adapters: extract, call a form or service, render a template or
/// redirect.
pub mod auth;
pub mod health;
pub mod pages;
pub mod posts;
pub mod profile;

pub use auth::{login, login_form, logout, signup, signup_form};
pub use health::{health_summary, liveness_check, readiness_summary, HealthState};
pub use pages::{flatpage, serve_media};
pub use posts::{
    add_comment, create_post, edit_post, edit_post_form, group_posts, index, new_post_form,
    post_view,
};
pub use profile::{follow_index, profile, profile_follow, profile_unfollow};

use actix_web::{http::header, HttpResponse};

/// 302 to `location`.
pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}
