/// Page templates
///
/// Every page extends `base.html`, which needs `user` for the navigation bar.
/// Listing pages also carry a `page` for the paginator include.
use actix_web::{http::StatusCode, HttpResponse};
use askama::Template;

use crate::error::Result;
use crate::forms::BoundForm;
use crate::middleware::SessionUser;
use crate::models::{CommentView, FlatPage, Group, PostView, ProfileStats, User};
use crate::pagination::Page;

/// Render into a `text/html` response with the given status.
pub fn render_with_status<T: Template>(template: &T, status: StatusCode) -> Result<HttpResponse> {
    let body = template.render()?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body))
}

pub fn render<T: Template>(template: &T) -> Result<HttpResponse> {
    render_with_status(template, StatusCode::OK)
}

/// Same as `render`, also returning the markup for caching.
pub fn render_to_string<T: Template>(template: &T) -> Result<String> {
    Ok(template.render()?)
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub user: Option<SessionUser>,
    pub page: Page<PostView>,
}

#[derive(Template)]
#[template(path = "group.html")]
pub struct GroupTemplate {
    pub user: Option<SessionUser>,
    pub group: Group,
    pub page: Page<PostView>,
}

#[derive(Template)]
#[template(path = "follow.html")]
pub struct FollowTemplate {
    pub user: Option<SessionUser>,
    pub page: Page<PostView>,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub user: Option<SessionUser>,
    pub author: User,
    pub stats: ProfileStats,
    pub following: bool,
    /// Show the follow/unfollow button (signed in and not the author).
    pub can_follow: bool,
    pub page: Page<PostView>,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub user: Option<SessionUser>,
    pub post: PostView,
    pub author: User,
    pub stats: ProfileStats,
    pub comments: Vec<CommentView>,
    pub form: BoundForm,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "new_post.html")]
pub struct PostFormTemplate {
    pub user: Option<SessionUser>,
    pub form: BoundForm,
    pub action: String,
    pub is_edit: bool,
}

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<SessionUser>,
    pub form: BoundForm,
    pub next: String,
}

#[derive(Template)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub user: Option<SessionUser>,
    pub form: BoundForm,
}

#[derive(Template)]
#[template(path = "auth/logged_out.html")]
pub struct LoggedOutTemplate {
    pub user: Option<SessionUser>,
}

#[derive(Template)]
#[template(path = "flatpage.html")]
pub struct FlatPageTemplate {
    pub user: Option<SessionUser>,
    pub flatpage: FlatPage,
}

#[derive(Template)]
#[template(path = "misc/404.html")]
pub struct NotFoundTemplate {
    pub user: Option<SessionUser>,
    pub path: String,
}

#[derive(Template)]
#[template(path = "misc/500.html")]
pub struct ServerErrorTemplate {
    pub user: Option<SessionUser>,
}
