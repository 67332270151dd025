/// Shared application state
///
/// Built once at startup and cloned into every worker's `App`.
use actix_web::web;
use crypto_core::SessionKeys;
use sqlx::PgPool;
use std::sync::Arc;

use crate::cache::PageCache;
use crate::config::Config;
use crate::forms::MAX_TEXT_PART_BYTES;
use crate::handlers::HealthState;
use crate::media::MediaStore;
use crate::middleware::{SessionMiddleware, SessionState};
use crate::services::{AuthService, FollowService, PostService};

#[derive(Clone)]
pub struct AppServices {
    pool: web::Data<PgPool>,
    posts: web::Data<PostService>,
    follows: web::Data<FollowService>,
    auth: web::Data<AuthService>,
    cache: web::Data<PageCache>,
    media: web::Data<MediaStore>,
    health: web::Data<HealthState>,
    session: Arc<SessionState>,
}

impl AppServices {
    pub fn new(pool: PgPool, cache: PageCache, config: &Config) -> Self {
        let media = MediaStore::new(config.media.root.clone());
        let keys = SessionKeys::from_secret(config.session.secret.as_bytes(), config.session.ttl_days);

        Self {
            posts: web::Data::new(PostService::new(
                pool.clone(),
                media.clone(),
                config.pagination.posts_per_page,
                config.media.max_upload_bytes,
            )),
            follows: web::Data::new(FollowService::new(pool.clone())),
            auth: web::Data::new(AuthService::new(pool.clone())),
            health: web::Data::new(HealthState::new(pool.clone(), cache.clone())),
            cache: web::Data::new(cache),
            media: web::Data::new(media),
            session: Arc::new(SessionState::new(keys, config.session.cookie_secure)),
            pool: web::Data::new(pool),
        }
    }

    /// Register every piece of state as app data, plus the urlencoded body limit.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.pool.clone())
            .app_data(self.posts.clone())
            .app_data(self.follows.clone())
            .app_data(self.auth.clone())
            .app_data(self.cache.clone())
            .app_data(self.media.clone())
            .app_data(self.health.clone())
            .app_data(web::Data::from(self.session.clone()))
            .app_data(web::FormConfig::default().limit(MAX_TEXT_PART_BYTES));
    }

    pub fn session_middleware(&self) -> SessionMiddleware {
        SessionMiddleware::new(self.session.clone())
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }
}
