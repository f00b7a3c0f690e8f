use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::{AuthError, AuthService};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Router exposing session login/logout.
pub fn auth_router(auth: Arc<AuthService>) -> Router {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .with_state(auth)
}

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn error_response(error: AuthError) -> Response {
    let status = match error {
        AuthError::LoginDisabled => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::ExpiryOutOfRange => StatusCode::INTERNAL_SERVER_ERROR,
        AuthError::InvalidCredentials | AuthError::MissingToken | AuthError::InvalidToken => {
            StatusCode::UNAUTHORIZED
        }
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn login_handler(
    State(auth): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Response {
    match auth
        .login(&request.username, &request.password, Utc::now())
        .await
    {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn logout_handler(
    State(auth): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = bearer_token(&headers) else {
        return error_response(AuthError::MissingToken);
    };
    match auth.logout(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

/// Middleware guarding admin routes; the resolved session is stored in request extensions.
pub async fn require_admin(
    State(auth): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_string) else {
        return error_response(AuthError::MissingToken);
    };

    match auth.authorize(&token, Utc::now()).await {
        Ok(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        Err(error) => {
            tracing::warn!(%error, path = %request.uri().path(), "admin request denied");
            error_response(error)
        }
    }
}
