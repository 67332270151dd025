/// Account service - registration and credential checks
use crate::db::{is_unique_violation, user_repo, user_repo::NewUser};
use crate::error::{AppError, Result};
use crate::forms::SignupInput;
use crate::metrics::content::CONTENT_CREATED_TOTAL;
use crate::models::User;
use crypto_core::{hash_password, verify_password};
use sqlx::PgPool;

pub struct AuthService {
    pool: PgPool,
}

/// Run password hashing on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))?
}

impl AuthService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the account; `None` when the username is already taken.
    pub async fn register(&self, input: &SignupInput) -> Result<Option<User>> {
        if user_repo::username_exists(&self.pool, &input.username).await? {
            return Ok(None);
        }

        let password = input.password1.clone();
        let password_hash = blocking(move || Ok(hash_password(&password)?)).await?;

        let new_user = NewUser {
            username: &input.username,
            email: input.email.as_deref().unwrap_or_default(),
            password_hash: &password_hash,
            first_name: &input.first_name,
            last_name: &input.last_name,
        };

        match user_repo::create_user(&self.pool, &new_user).await {
            Ok(user) => {
                CONTENT_CREATED_TOTAL.with_label_values(&["user"]).inc();
                tracing::info!(user_id = user.id, username = %user.username, "User registered");
                Ok(Some(user))
            }
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The user when the password matches; `None` for any mismatch.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = user_repo::get_user_by_username(&self.pool, username).await? else {
            tracing::debug!(username, "Login for unknown user");
            return Ok(None);
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let matches = blocking(move || Ok(verify_password(&password, &hash)?)).await?;

        if matches {
            tracing::info!(user_id = user.id, "User signed in");
            Ok(Some(user))
        } else {
            tracing::debug!(user_id = user.id, "Wrong password");
            Ok(None)
        }
    }
}
