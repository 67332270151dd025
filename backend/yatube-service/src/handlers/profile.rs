/// Profile handlers - author pages, subscriptions and the follow feed
use actix_web::{web, HttpResponse};

use super::redirect;
use crate::db::post_repo::PostFilter;
use crate::error::Result;
use crate::middleware::{AuthenticatedUser, CurrentUser};
use crate::models::profile_url;
use crate::pagination::PageQuery;
use crate::services::{FollowService, PostService};
use crate::templates::{render, FollowTemplate, ProfileTemplate};

/// GET /{username}/
pub async fn profile(
    posts: web::Data<PostService>,
    follows: web::Data<FollowService>,
    user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let author = posts.get_author(&path.into_inner()).await?;
    let page = posts
        .list_page(PostFilter::Author(author.id), query.page.as_deref())
        .await?;
    let stats = posts.get_profile_stats(author.id).await?;

    let (following, can_follow) = match user.id() {
        Some(viewer) if viewer != author.id => (follows.is_following(viewer, author.id).await?, true),
        _ => (false, false),
    };

    render(&ProfileTemplate {
        user: user.0,
        author,
        stats,
        following,
        can_follow,
        page,
    })
}

/// GET /follow/ - posts by the authors the user follows.
pub async fn follow_index(
    posts: web::Data<PostService>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let page = posts
        .list_page(PostFilter::FollowedBy(user.0.id), query.page.as_deref())
        .await?;

    render(&FollowTemplate {
        user: Some(user.0),
        page,
    })
}

/// GET /{username}/follow/
pub async fn profile_follow(
    follows: web::Data<FollowService>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let author = follows.follow(user.0.id, &path.into_inner()).await?;
    Ok(redirect(&profile_url(&author.username)))
}

/// GET /{username}/unfollow/
pub async fn profile_unfollow(
    follows: web::Data<FollowService>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let author = follows.unfollow(user.0.id, &path.into_inner()).await?;
    Ok(redirect(&profile_url(&author.username)))
}
