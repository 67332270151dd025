/// Data models for the Yatube service
///
/// - Row types map one-to-one onto tables (`User`, `Group`, `Post`, `Comment`,
///   `FlatPage`).
/// - `PostView` / `CommentView` are read models joined with their author and
///   group, which is what every listing page renders.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// "First Last", or the username when both are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub group_id: Option<i64>,
    /// Path relative to the media root, e.g. `posts/<uuid>.png`
    pub image: Option<String>,
}

/// A post joined with its author, group and comment count.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PostView {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author_username: String,
    pub group_id: Option<i64>,
    pub group_title: Option<String>,
    pub group_slug: Option<String>,
    pub image: Option<String>,
    pub comment_count: i64,
}

impl PostView {
    pub fn url(&self) -> String {
        post_url(&self.author_username, self.id)
    }

    pub fn edit_url(&self) -> String {
        format!("{}edit/", self.url())
    }

    pub fn author_url(&self) -> String {
        profile_url(&self.author_username)
    }

    pub fn image_url(&self) -> Option<String> {
        self.image.as_deref().map(media_url)
    }

    pub fn group_url(&self) -> Option<String> {
        self.group_slug.as_ref().map(|slug| format!("/group/{}/", slug))
    }

    pub fn pub_date_display(&self) -> String {
        self.pub_date.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommentView {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author_username: String,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl CommentView {
    pub fn author_url(&self) -> String {
        profile_url(&self.author_username)
    }

    pub fn created_display(&self) -> String {
        self.created.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FlatPage {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub content: String,
}

/// Counters shown on a profile page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, FromRow)]
pub struct ProfileStats {
    pub posts: i64,
    pub followers: i64,
    pub following: i64,
}

pub fn profile_url(username: &str) -> String {
    format!("/{}/", username)
}

pub fn post_url(username: &str, post_id: i64) -> String {
    format!("/{}/{}/", username, post_id)
}

pub fn media_url(relative: &str) -> String {
    format!("/media/{}", relative)
}
