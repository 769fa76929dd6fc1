use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};

use crate::{auth::RequiredToken, error::AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
}

// POST /api/login: exchanges credentials for a marketplace token.
// The gateway does not keep the token; the caller stores it.
pub async fn handle_login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    tracing::info!("[HANDLER] /api/login - Login attempt for {}", request.email.trim());

    let client = app_state.marketplace(None);
    match client.login(&request.email, &request.password).await {
        Ok(token) => {
            tracing::info!("[HANDLER] /api/login - Login succeeded.");
            Ok(Json(LoginResponse { token }))
        }
        Err(e) => {
            tracing::warn!("[HANDLER] /api/login - Login failed: {}", e);
            Err(e.into())
        }
    }
}

// GET /api/me
pub async fn get_me(
    State(app_state): State<AppState>,
    RequiredToken(token): RequiredToken,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state.marketplace(Some(&token)).me().await?;
    tracing::debug!("[HANDLER] /api/me - Resolved user: {:?}", user.as_ref().and_then(|u| u.id()));
    Ok(Json(user))
}
