/// HTTP middleware for yatube-service
///
/// - `SessionMiddleware` resolves the session cookie into a `SessionUser`
///   stored in request extensions; `CurrentUser` and `AuthenticatedUser`
///   extract it in handlers.
/// - `MetricsMiddleware` records per-route request counts and latencies.
pub mod metrics;
pub mod session;

pub use metrics::MetricsMiddleware;
pub use session::{
    AuthenticatedUser, CurrentUser, SessionMiddleware, SessionState, SessionUser,
    SESSION_COOKIE,
};
