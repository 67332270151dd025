/// Post handlers - listings, single post, create/edit and comments
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use super::redirect;
use crate::cache::PageCache;
use crate::db::post_repo::PostFilter;
use crate::error::Result;
use crate::forms::{CommentForm, CommentInput, PostForm, PostInput};
use crate::metrics::content::FORM_REJECTIONS_TOTAL;
use crate::middleware::{AuthenticatedUser, CurrentUser};
use crate::models::post_url;
use crate::pagination::PageQuery;
use crate::services::PostService;
use crate::templates::{
    render, render_to_string, GroupTemplate, IndexTemplate, PostFormTemplate, PostTemplate,
};

/// GET / - all posts; rendered pages are cached per viewer and page number.
pub async fn index(
    service: web::Data<PostService>,
    cache: web::Data<PageCache>,
    user: CurrentUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let raw_page = query.page.as_deref();
    let requested = raw_page
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(1);

    if let Some(html) = cache.get_index(user.id(), requested).await {
        return Ok(html_response(html));
    }

    let page = service.list_page(PostFilter::All, raw_page).await?;
    let html = render_to_string(&IndexTemplate {
        user: user.0.clone(),
        page,
    })?;
    cache.put_index(user.id(), requested, &html).await;

    Ok(html_response(html))
}

fn html_response(html: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

/// GET /group/{slug}/
pub async fn group_posts(
    service: web::Data<PostService>,
    user: CurrentUser,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let group = service.get_group(&path.into_inner()).await?;
    let page = service
        .list_page(PostFilter::Group(group.id), query.page.as_deref())
        .await?;

    render(&GroupTemplate {
        user: user.0,
        group,
        page,
    })
}

/// GET /new/
pub async fn new_post_form(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let groups = service.list_groups().await?;
    render(&PostFormTemplate {
        user: Some(user.0),
        form: PostForm::unbound(&groups, None),
        action: "/new/".to_string(),
        is_edit: false,
    })
}

/// POST /new/ - on success the author lands on the index page.
pub async fn create_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> Result<HttpResponse> {
    let input = PostInput::from_multipart(payload, service.max_upload_bytes()).await?;
    let groups = service.list_groups().await?;

    match PostForm::clean(input, &groups, None, service.max_upload_bytes()).await {
        Ok(cleaned) => {
            service.create_post(user.0.id, &cleaned).await?;
            Ok(redirect("/"))
        }
        Err(form) => {
            FORM_REJECTIONS_TOTAL.with_label_values(&["post"]).inc();
            render(&PostFormTemplate {
                user: Some(user.0),
                form,
                action: "/new/".to_string(),
                is_edit: false,
            })
        }
    }
}

/// GET /{username}/{post_id}/
pub async fn post_view(
    service: web::Data<PostService>,
    user: CurrentUser,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let page = service.get_post_page(&username, post_id).await?;
    let can_edit = user.id() == Some(page.author.id);

    render(&PostTemplate {
        user: user.0,
        post: page.post,
        author: page.author,
        stats: page.stats,
        comments: page.comments,
        form: CommentForm::unbound(),
        can_edit,
    })
}

/// GET /{username}/{post_id}/edit/ - only the author may edit; anyone else
/// is sent back to the post, whether or not it exists.
pub async fn edit_post_form(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<(String, i64)>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let author = service.get_author(&username).await?;
    if author.id != user.0.id {
        return Ok(redirect(&post_url(&username, post_id)));
    }
    let post = service.get_post_of(&author, post_id).await?;

    let groups = service.list_groups().await?;
    render(&PostFormTemplate {
        user: Some(user.0),
        form: PostForm::unbound(&groups, Some(&post)),
        action: format!("{}edit/", post_url(&username, post_id)),
        is_edit: true,
    })
}

/// POST /{username}/{post_id}/edit/
pub async fn edit_post(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<(String, i64)>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let author = service.get_author(&username).await?;
    if author.id != user.0.id {
        return Ok(redirect(&post_url(&username, post_id)));
    }
    let post = service.get_post_of(&author, post_id).await?;

    let input = PostInput::from_multipart(payload, service.max_upload_bytes()).await?;
    let groups = service.list_groups().await?;

    match PostForm::clean(
        input,
        &groups,
        post.image.as_deref(),
        service.max_upload_bytes(),
    )
    .await
    {
        Ok(cleaned) => {
            service.update_post(&post, &cleaned).await?;
            Ok(redirect(&post_url(&username, post_id)))
        }
        Err(form) => {
            FORM_REJECTIONS_TOTAL.with_label_values(&["post"]).inc();
            render(&PostFormTemplate {
                user: Some(user.0),
                form,
                action: format!("{}edit/", post_url(&username, post_id)),
                is_edit: true,
            })
        }
    }
}

/// POST /{username}/{post_id}/comment - redirects back to the post whether or
/// not the comment was valid.
pub async fn add_comment(
    service: web::Data<PostService>,
    user: AuthenticatedUser,
    path: web::Path<(String, i64)>,
    form: web::Form<CommentInput>,
) -> Result<HttpResponse> {
    let (username, post_id) = path.into_inner();
    let post = service.get_authored_post(&username, post_id).await?;

    match CommentForm::clean(form.into_inner()) {
        Ok(text) => {
            service.add_comment(post.id, user.0.id, &text).await?;
        }
        Err(_) => {
            FORM_REJECTIONS_TOTAL.with_label_values(&["comment"]).inc();
            tracing::debug!(post_id, "Discarding empty comment");
        }
    }

    Ok(redirect(&post_url(&username, post_id)))
}
