use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    app::AppState,
    models::auth_token::{AppTokenRequest, Credentials},
    web::{
        error::ApiError,
        gate::{AnyToken, Authenticated, UserOnly},
    },
};

/// Email/password sign-in.
pub async fn create_token(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state.tokens.issue_for_user(credentials).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

/// Hands an app a token acting for the signed-in user. The user must have linked
/// the app first.
pub async fn create_app_token(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Json(request): Json<AppTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(app_id) = request.app.as_deref() {
        if let Some(app) = state.apps.retrieve(app_id.trim()).await? {
            if !state.accounts.exists(&token.user, &app).await? {
                tracing::warn!(user_id = %token.user.id, app_id = %app.id, "app token requested without consent");
                return Err(ApiError::Forbidden("Consent required"));
            }
        }
    }

    let issued = state.tokens.issue_for_app(request, &token.user).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

pub async fn sign_out(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<AnyToken>,
) -> Result<impl IntoResponse, ApiError> {
    state.tokens.delete(&token.id).await?;
    tracing::info!(user_id = %token.user.id, "signed out");
    Ok(StatusCode::NO_CONTENT)
}
