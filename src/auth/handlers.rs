use axum::{
    extract::State,
    http::{header::HOST, HeaderMap, StatusCode, Uri},
    routing::post,
    Json, Router,
};
use tracing::{error, instrument};

use crate::{
    auth::{
        dto::{
            AuthResponse, CredentialsRequest, MessageResponse, ResetLinkResponse,
            ResetPasswordRequest, ResetRequest,
        },
        services,
    },
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/reset", post(request_reset))
        .route("/auth/reset-password", post(reset_password))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let res = services::signup(&state, &payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CredentialsRequest>,
) -> AppResult<Json<AuthResponse>> {
    let res = services::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(res))
}

#[instrument(skip(state, headers, uri, payload))]
pub async fn request_reset(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    AppJson(payload): AppJson<ResetRequest>,
) -> AppResult<Json<ResetLinkResponse>> {
    let res = services::request_password_reset(&state, &payload.email, || {
        link_base(&state, &headers, &uri)
    })
    .await?;
    Ok(Json(res))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    services::confirm_password_reset(&state, &payload.token, &payload.new_password).await?;
    Ok(Json(MessageResponse {
        message: "Password reset successfully".into(),
    }))
}

/// `scheme://host` prefix for reset links: the configured base if any,
/// otherwise the request's Host header, otherwise the URI authority (HTTP/2
/// requests carry no Host header).
fn link_base(state: &AppState, headers: &HeaderMap, uri: &Uri) -> AppResult<String> {
    if let Some(base) = &state.config.reset.link_base {
        return Ok(base.clone());
    }
    let host = headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .ok_or_else(|| {
            error!("Host header missing in reset request");
            AppError::Internal {
                message: "Internal server error: Host header missing".into(),
                source: anyhow::anyhow!("Host header missing"),
            }
        })?;
    Ok(format!("{}://{}", state.config.reset.scheme, host))
}
