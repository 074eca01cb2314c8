use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{
    app::AppState,
    errors::ErrorCode,
    models::{
        application::{App, AppInput, AppUpdate, PublicApp},
        user::User,
    },
    web::{
        error::ApiError,
        gate::{Authenticated, UserOnly},
    },
};

pub async fn list_apps(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let apps = state.apps.list(&token.user).await?;
    Ok(Json(json!({ "items": apps })))
}

pub async fn create_app(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Json(input): Json<AppInput>,
) -> Result<impl IntoResponse, ApiError> {
    let app = state.apps.create(&token.user, input).await?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// Owners get the full app including credentials; everyone else the public view.
pub async fn get_app(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Path(app_id): Path<String>,
) -> Result<Response, ApiError> {
    let Some(app) = state.apps.retrieve(&app_id).await? else {
        return Err(ErrorCode::AppInexistent.into());
    };
    if state.apps.is_owned_by(&app, &token.user) {
        Ok(Json(app).into_response())
    } else {
        Ok(Json(PublicApp::from(&app)).into_response())
    }
}

pub async fn update_app(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Path(app_id): Path<String>,
    Json(partial): Json<AppUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let app = owned_app(&state, &token.user, &app_id).await?;
    let updated = state.apps.update(&app, partial).await?;
    Ok(Json(updated))
}

pub async fn delete_app(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Path(app_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let app = owned_app(&state, &token.user, &app_id).await?;
    state.apps.delete(&app).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Foreign apps are reported as missing.
async fn owned_app(state: &AppState, user: &User, app_id: &str) -> Result<App, ApiError> {
    match state.apps.retrieve(app_id).await? {
        Some(app) if state.apps.is_owned_by(&app, user) => Ok(app),
        _ => Err(ErrorCode::AppInexistent.into()),
    }
}
