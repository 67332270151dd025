use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;
use tracing::{debug, warn};

use crate::metrics::content::{INDEX_CACHE_EVENTS, INDEX_CACHE_WRITE_TOTAL};

const INDEX_KEY_PREFIX: &str = "index_page";

/// Cache of rendered index pages
///
/// Entries expire after the TTL and are never invalidated on write, so a new
/// post may take up to one TTL to appear on `/`. Redis errors are logged and
/// treated as a miss; a cache without a connection is a no-op.
#[derive(Clone)]
pub struct PageCache {
    redis: Option<ConnectionManager>,
    ttl: Duration,
}

impl PageCache {
    pub fn new(redis: ConnectionManager, ttl_secs: u64) -> Self {
        Self {
            redis: Some(redis),
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    pub fn disabled() -> Self {
        Self {
            redis: None,
            ttl: Duration::ZERO,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some() && !self.ttl.is_zero()
    }

    /// `index_page:{viewer}:{page}`; the viewer is part of the key because the
    /// page header differs per signed-in user.
    pub fn index_key(viewer: Option<i64>, page: i64) -> String {
        match viewer {
            Some(user_id) => format!("{}:{}:{}", INDEX_KEY_PREFIX, user_id, page),
            None => format!("{}:anon:{}", INDEX_KEY_PREFIX, page),
        }
    }

    /// `None` when caching is disabled.
    pub async fn ping(&self) -> Option<Result<(), String>> {
        let mut conn = self.redis.clone()?;
        let result = redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| e.to_string())
            .and_then(|pong| {
                if pong == "PONG" {
                    Ok(())
                } else {
                    Err(format!("unexpected PING response: {}", pong))
                }
            });
        Some(result)
    }

    pub async fn get_index(&self, viewer: Option<i64>, page: i64) -> Option<String> {
        if !self.is_enabled() {
            return None;
        }
        let mut conn = self.redis.clone()?;
        let key = Self::index_key(viewer, page);

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(html)) => {
                debug!("Index cache HIT for {}", key);
                INDEX_CACHE_EVENTS.with_label_values(&["hit"]).inc();
                Some(html)
            }
            Ok(None) => {
                debug!("Index cache MISS for {}", key);
                INDEX_CACHE_EVENTS.with_label_values(&["miss"]).inc();
                None
            }
            Err(e) => {
                warn!("Redis read error for index cache: {}", e);
                INDEX_CACHE_EVENTS.with_label_values(&["error"]).inc();
                None
            }
        }
    }

    pub async fn put_index(&self, viewer: Option<i64>, page: i64, html: &str) {
        if !self.is_enabled() {
            return;
        }
        let Some(mut conn) = self.redis.clone() else {
            return;
        };
        let key = Self::index_key(viewer, page);

        match conn
            .set_ex::<_, _, ()>(&key, html, self.ttl.as_secs())
            .await
        {
            Ok(()) => {
                debug!("Index cache WRITE for {} with TTL {:?}", key, self.ttl);
                INDEX_CACHE_WRITE_TOTAL.with_label_values(&["success"]).inc();
            }
            Err(e) => {
                warn!("Failed to write index cache: {}", e);
                INDEX_CACHE_WRITE_TOTAL.with_label_values(&["error"]).inc();
            }
        }
    }
}
