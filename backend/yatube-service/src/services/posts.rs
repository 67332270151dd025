/// Post service - listings, post pages, creation, editing and comments
use crate::db::{comment_repo, group_repo, post_repo, post_repo::PostFilter, user_repo};
use crate::error::{AppError, Result};
use crate::forms::{CleanedPost, ImageChange};
use crate::media::MediaStore;
use crate::metrics::content::CONTENT_CREATED_TOTAL;
use crate::models::{Comment, CommentView, Group, Post, PostView, ProfileStats, User};
use crate::pagination::{Page, Paginator};
use sqlx::PgPool;

/// Everything the single-post page shows.
pub struct PostPage {
    pub author: User,
    pub post: PostView,
    pub stats: ProfileStats,
    pub comments: Vec<CommentView>,
}

pub struct PostService {
    pool: PgPool,
    media: MediaStore,
    per_page: i64,
    max_upload_bytes: usize,
}

impl PostService {
    pub fn new(pool: PgPool, media: MediaStore, per_page: i64, max_upload_bytes: usize) -> Self {
        Self {
            pool,
            media,
            per_page,
            max_upload_bytes,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Groups offered by the post form.
    pub async fn list_groups(&self) -> Result<Vec<Group>> {
        Ok(group_repo::list_groups(&self.pool).await?)
    }

    pub async fn get_group(&self, slug: &str) -> Result<Group> {
        group_repo::get_group_by_slug(&self.pool, slug)
            .await?
            .ok_or_else(|| AppError::not_found(format!("group {}", slug)))
    }

    /// One page of posts matching `filter`, newest first.
    pub async fn list_page(&self, filter: PostFilter, raw_page: Option<&str>) -> Result<Page<PostView>> {
        let total = post_repo::count_posts(&self.pool, filter).await?;
        let paginator = Paginator::new(total, self.per_page);
        let number = paginator.resolve(raw_page);

        let items = post_repo::list_posts(
            &self.pool,
            filter,
            paginator.per_page,
            paginator.offset(number),
        )
        .await?;

        Ok(paginator.page(number, items))
    }

    /// Author looked up by username; 404 when unknown.
    pub async fn get_author(&self, username: &str) -> Result<User> {
        user_repo::get_user_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {}", username)))
    }

    pub async fn get_profile_stats(&self, user_id: i64) -> Result<ProfileStats> {
        Ok(user_repo::get_profile_stats(&self.pool, user_id).await?)
    }

    /// The post must exist and belong to `username`.
    pub async fn get_post_page(&self, username: &str, post_id: i64) -> Result<PostPage> {
        let author = self.get_author(username).await?;
        let post = post_repo::get_post_view(&self.pool, post_id, author.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("post {} of {}", post_id, username)))?;

        let stats = self.get_profile_stats(author.id).await?;
        let comments = comment_repo::get_comments_by_post(&self.pool, post.id).await?;

        Ok(PostPage {
            author,
            post,
            stats,
            comments,
        })
    }

    /// Raw post row of `username`; 404 when missing.
    pub async fn get_authored_post(&self, username: &str, post_id: i64) -> Result<Post> {
        let author = self.get_author(username).await?;
        self.get_post_of(&author, post_id).await
    }

    /// A post of an already resolved author.
    pub async fn get_post_of(&self, author: &User, post_id: i64) -> Result<Post> {
        post_repo::get_post(&self.pool, post_id, author.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("post {} of {}", post_id, author.username)))
    }

    async fn apply_image(&self, change: &ImageChange, current: Option<String>) -> Result<Option<String>> {
        match change {
            ImageChange::Keep => Ok(current),
            ImageChange::Clear => Ok(None),
            ImageChange::Replace(image) => Ok(Some(self.media.save(image).await?)),
        }
    }

    pub async fn create_post(&self, author_id: i64, cleaned: &CleanedPost) -> Result<Post> {
        let image = self.apply_image(&cleaned.image, None).await?;
        let post = post_repo::create_post(
            &self.pool,
            author_id,
            &cleaned.text,
            cleaned.group_id,
            image.as_deref(),
        )
        .await?;

        CONTENT_CREATED_TOTAL.with_label_values(&["post"]).inc();
        tracing::info!(post_id = post.id, author_id, "Post created");

        Ok(post)
    }

    pub async fn update_post(&self, post: &Post, cleaned: &CleanedPost) -> Result<()> {
        let image = self.apply_image(&cleaned.image, post.image.clone()).await?;
        let updated = post_repo::update_post(
            &self.pool,
            post.id,
            post.author_id,
            &cleaned.text,
            cleaned.group_id,
            image.as_deref(),
        )
        .await?;

        if !updated {
            return Err(AppError::not_found(format!("post {}", post.id)));
        }

        tracing::info!(post_id = post.id, "Post updated");
        Ok(())
    }

    pub async fn add_comment(&self, post_id: i64, author_id: i64, text: &str) -> Result<Comment> {
        let comment = comment_repo::create_comment(&self.pool, post_id, author_id, text).await?;

        CONTENT_CREATED_TOTAL.with_label_values(&["comment"]).inc();
        tracing::info!(comment_id = comment.id, post_id, author_id, "Comment created");

        Ok(comment)
    }
}
