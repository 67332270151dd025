use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use crypto_core::SessionKeys;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::AppError;

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "yatube_session";

/// Signing keys plus cookie attributes, shared by the middleware and the
/// login/logout handlers.
pub struct SessionState {
    pub keys: SessionKeys,
    pub cookie_secure: bool,
}

impl SessionState {
    pub fn new(keys: SessionKeys, cookie_secure: bool) -> Self {
        Self {
            keys,
            cookie_secure,
        }
    }

    /// Cookie holding a freshly signed token for the user.
    pub fn login_cookie(&self, user_id: i64, username: &str) -> Result<Cookie<'static>, AppError> {
        let token = self
            .keys
            .generate_session_token(user_id, username)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Cookie::build(SESSION_COOKIE, token)
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .max_age(CookieDuration::seconds(self.keys.ttl_secs()))
            .finish())
    }

    /// Cookie that makes the browser drop the session.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.cookie_secure)
            .finish();
        cookie.make_removal();
        cookie
    }

    fn resolve(&self, token: &str) -> Option<SessionUser> {
        let claims = match self.keys.validate_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!("Ignoring session cookie: {}", e);
                return None;
            }
        };

        match claims.user_id() {
            Ok(id) => Some(SessionUser {
                id,
                username: claims.username,
            }),
            Err(e) => {
                tracing::warn!("Session token with malformed subject: {}", e);
                None
            }
        }
    }
}

/// The signed-in user, as stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
}

/// Session cookie middleware
///
/// Never rejects a request: a missing, expired or tampered cookie simply
/// leaves the request anonymous.
pub struct SessionMiddleware {
    state: Arc<SessionState>,
}

impl SessionMiddleware {
    pub fn new(state: Arc<SessionState>) -> Self {
        Self { state }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = SessionMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionMiddlewareService {
            service: Rc::new(service),
            state: self.state.clone(),
        }))
    }
}

pub struct SessionMiddlewareService<S> {
    service: Rc<S>,
    state: Arc<SessionState>,
}

impl<S, B> Service<ServiceRequest> for SessionMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let user = req
            .cookie(SESSION_COOKIE)
            .and_then(|cookie| self.state.resolve(cookie.value()));

        if let Some(user) = user {
            req.extensions_mut().insert(user);
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

/// Optional signed-in user; never fails.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<SessionUser>);

impl CurrentUser {
    pub fn from_request_parts(req: &HttpRequest) -> Self {
        CurrentUser(req.extensions().get::<SessionUser>().cloned())
    }

    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequest for CurrentUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(CurrentUser::from_request_parts(req)))
    }
}

/// Signed-in user required; anonymous requests are redirected to the login
/// page with the current path as `next`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub SessionUser);

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<SessionUser>() {
            Some(user) => ready(Ok(AuthenticatedUser(user.clone()))),
            None => {
                let next = req
                    .uri()
                    .path_and_query()
                    .map(|pq| pq.as_str().to_string())
                    .unwrap_or_else(|| req.path().to_string());
                ready(Err(AppError::LoginRequired { next }.into()))
            }
        }
    }
}
