use axum::{response::IntoResponse, Json};

use crate::scopes;

pub async fn list_scopes() -> impl IntoResponse {
    Json(scopes::all())
}
