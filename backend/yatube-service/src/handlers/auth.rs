/// Account handlers - sign up, sign in, sign out
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::forms::{LoginForm, LoginInput, SignupForm, SignupInput};
use crate::metrics::content::FORM_REJECTIONS_TOTAL;
use crate::middleware::{CurrentUser, SessionState};
use crate::services::AuthService;
use super::redirect;
use crate::templates::{render, render_to_string, LoggedOutTemplate, LoginTemplate, SignupTemplate};

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after sign-in.
///
/// Browsers drop tab, CR and LF from URLs, so `/\t/host` would turn into a
/// scheme-relative `//host`. Any control character rejects the value.
pub fn safe_next(next: &str) -> &str {
    let next = next.trim();
    if next.chars().any(char::is_control) {
        return "/";
    }
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

/// GET /auth/signup/
pub async fn signup_form(user: CurrentUser) -> Result<HttpResponse> {
    render(&SignupTemplate {
        user: user.0,
        form: SignupForm::unbound(),
    })
}

/// POST /auth/signup/ - a new account is sent to the login page.
pub async fn signup(
    auth: web::Data<AuthService>,
    user: CurrentUser,
    form: web::Form<SignupInput>,
) -> Result<HttpResponse> {
    let input = match SignupForm::clean(form.into_inner()) {
        Ok(input) => input,
        Err(form) => {
            FORM_REJECTIONS_TOTAL.with_label_values(&["signup"]).inc();
            return render(&SignupTemplate { user: user.0, form });
        }
    };

    match auth.register(&input).await? {
        Some(_) => Ok(redirect("/auth/login/")),
        None => {
            FORM_REJECTIONS_TOTAL.with_label_values(&["signup"]).inc();
            render(&SignupTemplate {
                user: user.0,
                form: SignupForm::username_taken(&input),
            })
        }
    }
}

/// GET /auth/login/
pub async fn login_form(user: CurrentUser, query: web::Query<NextQuery>) -> Result<HttpResponse> {
    render(&LoginTemplate {
        user: user.0,
        form: LoginForm::unbound(),
        next: query.into_inner().next.unwrap_or_default(),
    })
}

/// POST /auth/login/ - sets the session cookie and follows `next`.
pub async fn login(
    auth: web::Data<AuthService>,
    session: web::Data<SessionState>,
    user: CurrentUser,
    query: web::Query<NextQuery>,
    form: web::Form<LoginInput>,
) -> Result<HttpResponse> {
    let submitted = form.into_inner();
    let next = if submitted.next.is_empty() {
        query.into_inner().next.unwrap_or_default()
    } else {
        submitted.next.clone()
    };

    let input = match LoginForm::clean(submitted) {
        Ok(input) => input,
        Err(form) => {
            FORM_REJECTIONS_TOTAL.with_label_values(&["login"]).inc();
            return render(&LoginTemplate {
                user: user.0,
                form,
                next,
            });
        }
    };

    let Some(account) = auth.authenticate(&input.username, &input.password).await? else {
        FORM_REJECTIONS_TOTAL.with_label_values(&["login"]).inc();
        return render(&LoginTemplate {
            user: user.0,
            form: LoginForm::invalid_credentials(&input.username),
            next,
        });
    };

    let cookie = session.login_cookie(account.id, &account.username)?;
    Ok(HttpResponse::Found()
        .cookie(cookie)
        .insert_header((actix_web::http::header::LOCATION, safe_next(&next)))
        .finish())
}

/// GET|POST /auth/logout/
pub async fn logout(session: web::Data<SessionState>) -> Result<HttpResponse> {
    let html = render_to_string(&LoggedOutTemplate { user: None })?;
    Ok(HttpResponse::Ok()
        .cookie(session.logout_cookie())
        .content_type("text/html; charset=utf-8")
        .body(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_stay_on_site() {
        assert_eq!(safe_next("/new/"), "/new/");
        assert_eq!(safe_next(""), "/");
        assert_eq!(safe_next("https://evil.example/"), "/");
        assert_eq!(safe_next("//evil.example/"), "/");
        assert_eq!(safe_next("/\\evil.example"), "/");
    }

    #[test]
    fn next_with_control_characters_is_rejected() {
        assert_eq!(safe_next("/\t/evil.example/"), "/");
        assert_eq!(safe_next("/\n/evil.example/"), "/");
        assert_eq!(safe_next("/\r/evil.example/"), "/");
        assert_eq!(safe_next("/posts/\u{0}"), "/");
        assert_eq!(safe_next("/leo/1/"), "/leo/1/");
    }
}
