//! Login, logout, and page routes.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Role};
use crate::context::AppContext;
use crate::observability::log_event;

use super::cookie::{clear_session_cookie, session_cookie, token_from_headers};
use super::pages;
use super::response::{auth_error, require_session, ApiError};

pub fn auth_routes(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/login", post(login_handler))
        .route("/logout", get(logout_handler))
        .route("/dashboard", get(dashboard_handler))
        .with_state(ctx)
}

/// Form fields are optional so a missing one maps to an explicit 400
/// rather than a framework rejection.
#[derive(Debug, Deserialize)]
struct LoginForm {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    success: bool,
    role: Role,
    token: String,
}

/// Login page when unauthenticated, dashboard otherwise.
async fn root_handler(State(ctx): State<Arc<AppContext>>, headers: HeaderMap) -> Html<String> {
    match require_session(&ctx, &headers) {
        Ok(identity) => Html(pages::dashboard_page(&identity.username, identity.role)),
        Err(_) => Html(pages::login_page()),
    }
}

async fn login_handler(
    State(ctx): State<Arc<AppContext>>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, ApiError> {
    let username = form
        .username
        .filter(|u| !u.is_empty())
        .ok_or_else(|| auth_error(AuthError::MissingField("username")))?;
    let password = form
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| auth_error(AuthError::MissingField("password")))?;

    // Unknown-user and wrong-password are the same failure to the caller.
    let credential = ctx
        .credentials
        .authenticate(&username, &password)
        .ok_or_else(|| auth_error(AuthError::InvalidCredentials))?;
    let role = credential.role;

    let token = ctx.sessions().create_session(&username, role);
    ctx.activity_mut().record(&username, "login");
    log_event("login", &[("user", &username), ("role", role.as_str())]);

    let cookie = session_cookie(&token, ctx.config.session.timeout_secs);
    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            success: true,
            role,
            token,
        }),
    ))
}

/// Ends the session if one exists. Never fails: logging out without a
/// session just clears the cookie.
async fn logout_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = token_from_headers(&headers) {
        let username = {
            let mut sessions = ctx.sessions();
            let username = sessions.validate(token).map(|s| s.username.clone());
            sessions.invalidate(token);
            username
        };
        if let Some(username) = username {
            ctx.activity_mut().record(&username, "logout");
            log_event("logout", &[("user", &username)]);
        }
    }

    ([(SET_COOKIE, clear_session_cookie())], Redirect::to("/"))
}

async fn dashboard_handler(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
) -> Result<Html<String>, ApiError> {
    let identity = require_session(&ctx, &headers)?;
    Ok(Html(pages::dashboard_page(&identity.username, identity.role)))
}
