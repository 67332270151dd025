/// Configuration management for the Yatube service
///
/// Everything is read from environment variables (a `.env` file is loaded by
/// `main` when present). Missing values fall back to development defaults.
use db_pool::env_utils::parse_env_with_default;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEV_SESSION_SECRET: &str = "yatube-dev-session-secret-change-me";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Cache (Redis) configuration
    pub cache: CacheConfig,
    /// Session cookie configuration
    pub session: SessionConfig,
    /// Uploaded media configuration
    pub media: MediaConfig,
    /// Listing configuration
    pub pagination: PaginationConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// Server port to bind to
    pub port: u16,
    /// HTTP worker count
    pub workers: usize,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database URL; pool sizing comes from the `DB_*` variables read by db-pool
    pub url: String,
}

/// Cache (Redis) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; caching is disabled when unset
    pub url: Option<String>,
    /// Lifetime of a cached index page
    pub index_ttl_secs: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_days: i64,
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl_days", &self.ttl_days)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Directory uploaded files are written to
    pub root: PathBuf,
    /// Largest accepted upload, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub posts_per_page: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");

        let secret = std::env::var("SESSION_SECRET").unwrap_or_else(|_| DEV_SESSION_SECRET.into());
        if production && (secret == DEV_SESSION_SECRET || secret.len() < 32) {
            return Err(
                "SESSION_SECRET must be set to a random value of at least 32 bytes in production"
                    .to_string(),
            );
        }

        let posts_per_page = parse_env_with_default("POSTS_PER_PAGE", 10i64);
        if posts_per_page < 1 {
            return Err(format!("POSTS_PER_PAGE must be positive, got {}", posts_per_page));
        }

        Ok(Config {
            app: AppConfig {
                env: app_env,
                host: std::env::var("YATUBE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_with_default("YATUBE_PORT", 8000),
                workers: parse_env_with_default("YATUBE_WORKERS", 4),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/yatube".to_string()),
            },
            cache: CacheConfig {
                url: std::env::var("REDIS_URL").ok().filter(|v| !v.trim().is_empty()),
                index_ttl_secs: parse_env_with_default("INDEX_CACHE_TTL_SECS", 20),
            },
            session: SessionConfig {
                secret,
                ttl_days: parse_env_with_default("SESSION_TTL_DAYS", 14),
                cookie_secure: parse_env_with_default("SESSION_COOKIE_SECURE", production),
            },
            media: MediaConfig {
                root: std::env::var("MEDIA_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("media")),
                max_upload_bytes: parse_env_with_default("MEDIA_MAX_UPLOAD_BYTES", 5 * 1024 * 1024),
            },
            pagination: PaginationConfig { posts_per_page },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.env.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_env() {
        for key in [
            "APP_ENV",
            "SESSION_SECRET",
            "POSTS_PER_PAGE",
            "REDIS_URL",
            "INDEX_CACHE_TTL_SECS",
            "YATUBE_PORT",
            "MEDIA_ROOT",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial_test::serial]
    fn development_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.app.port, 8000);
        assert_eq!(config.pagination.posts_per_page, 10);
        assert_eq!(config.cache.index_ttl_secs, 20);
        assert!(config.cache.url.is_none());
        assert!(!config.session.cookie_secure);
        assert_eq!(config.media.root, PathBuf::from("media"));
        assert!(!config.is_production());
    }

    #[test]
    #[serial_test::serial]
    fn production_requires_session_secret() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        assert!(Config::from_env().unwrap_err().contains("SESSION_SECRET"));

        std::env::set_var("SESSION_SECRET", "x".repeat(48));
        let config = Config::from_env().unwrap();
        assert!(config.session.cookie_secure);
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn rejects_non_positive_page_size() {
        clear_env();
        std::env::set_var("POSTS_PER_PAGE", "0");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial_test::serial]
    fn blank_redis_url_disables_cache() {
        clear_env();
        std::env::set_var("REDIS_URL", "  ");
        assert!(Config::from_env().unwrap().cache.url.is_none());
        clear_env();
    }

    #[test]
    fn session_debug_redacts_secret() {
        let session = SessionConfig {
            secret: "super-secret".into(),
            ttl_days: 14,
            cookie_secure: false,
        };
        assert!(!format!("{:?}", session).contains("super-secret"));
    }
}
