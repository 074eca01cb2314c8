use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    app::AppState,
    models::user::UserInput,
    web::{
        error::ApiError,
        gate::{AnyToken, Authenticated, UserOnly},
    },
};

pub async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<UserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// The caller's profile; app tokens only see what the app was granted.
pub async fn me(Authenticated { token, .. }: Authenticated<AnyToken>) -> impl IntoResponse {
    Json(token.user)
}

pub async fn update_me(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Json(partial): Json<UserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.users.update(&token.user, partial).await?;
    Ok(Json(user))
}

pub async fn delete_me(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
) -> Result<impl IntoResponse, ApiError> {
    state.users.delete(&token.user).await?;
    state.tokens.delete(&token.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
