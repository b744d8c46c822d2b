use tracing::{info, warn};

use super::dto::{AuthResponse, PublicUser, ResetLinkResponse};
use super::password::{hash_password_blocking, verify_password_blocking};
use super::repo_types::User;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const RESET_LINK_MESSAGE: &str =
    "Password reset link generated. Email sending is disabled until SMTP is activated.";

fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let token = state.jwt.sign(user.id)?;
    Ok(AuthResponse {
        token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    })
}

pub async fn signup(state: &AppState, email: &str, password: &str) -> AppResult<AuthResponse> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Email and password required".into()));
    }

    if state.users.find_by_email(email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("User already exists".into()));
    }

    let hash = hash_password_blocking(password.to_string()).await?;
    let Some(user) = state.users.create(email, &hash).await? else {
        warn!(%email, "email registered concurrently");
        return Err(AppError::Conflict("User already exists".into()));
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    auth_response(state, user)
}

pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<AuthResponse> {
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Email and password required".into()));
    }

    let Some(user) = state.users.find_by_email(email).await? else {
        warn!(%email, "login unknown email");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    let ok = verify_password_blocking(password.to_string(), user.password_hash.clone()).await?;
    if !ok {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    info!(user_id = %user.id, "user logged in");
    auth_response(state, user)
}

/// Issues a reset token for `email` and returns it embedded in a link under
/// the `scheme://host` prefix produced by `link_base`. The prefix is only
/// resolved once the user is known. Nothing is persisted or sent.
pub async fn request_password_reset<F>(
    state: &AppState,
    email: &str,
    link_base: F,
) -> AppResult<ResetLinkResponse>
where
    F: FnOnce() -> AppResult<String>,
{
    if email.is_empty() {
        return Err(AppError::Validation("Email is required".into()));
    }

    let Some(user) = state
        .users
        .find_by_email(email)
        .await
        .map_err(AppError::internal("Failed to generate reset link"))?
    else {
        warn!(%email, "reset requested for unknown email");
        return Err(AppError::NotFound("User not found".into()));
    };

    let base = link_base()?;
    let token = state
        .jwt
        .sign(user.id)
        .map_err(AppError::internal("Failed to generate reset link"))?;

    info!(user_id = %user.id, "password reset link generated");
    Ok(ResetLinkResponse {
        message: RESET_LINK_MESSAGE.into(),
        reset_link: format!("{base}/reset-password?token={token}"),
    })
}

pub async fn confirm_password_reset(
    state: &AppState,
    token: &str,
    new_password: &str,
) -> AppResult<()> {
    if token.is_empty() || new_password.is_empty() {
        return Err(AppError::Validation(
            "Token and new password are required".into(),
        ));
    }

    let claims = state.jwt.verify(token).map_err(|e| {
        warn!(error = %e, "reset token rejected");
        AppError::InvalidToken("Invalid or expired token".into())
    })?;

    let user = state
        .users
        .find_by_id(claims.sub)
        .await
        .map_err(AppError::internal("Failed to reset password"))?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let hash = hash_password_blocking(new_password.to_string())
        .await
        .map_err(AppError::internal("Failed to reset password"))?;

    let updated = state
        .users
        .update_password(user.id, &hash)
        .await
        .map_err(AppError::internal("Failed to reset password"))?;
    if !updated {
        return Err(AppError::NotFound("User not found".into()));
    }

    info!(user_id = %user.id, "password reset");
    Ok(())
}
