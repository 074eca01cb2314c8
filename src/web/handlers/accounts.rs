use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::{
    app::AppState,
    errors::ErrorCode,
    models::{
        account::{AccountInput, LinkedAccount},
        application::PublicApp,
    },
    services::WebhookEvent,
    web::{
        error::ApiError,
        gate::{Authenticated, UserOnly},
    },
};

#[derive(Debug, Serialize)]
pub struct AccountView {
    id: String,
    app: PublicApp,
    created_at: String,
}

impl From<LinkedAccount> for AccountView {
    fn from(linked: LinkedAccount) -> Self {
        AccountView {
            id: linked.account.id,
            app: PublicApp::from(&linked.app),
            created_at: linked.account.created_at,
        }
    }
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let items: Vec<AccountView> = state
        .accounts
        .linked(&token.user)
        .await?
        .into_iter()
        .map(AccountView::from)
        .collect();
    Ok(Json(json!({ "items": items })))
}

/// Records the user's consent to share their profile with an app.
pub async fn link_app(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Json(input): Json<AccountInput>,
) -> Result<impl IntoResponse, ApiError> {
    let linked = state.accounts.create(input, &token.user).await?;
    Ok((StatusCode::CREATED, Json(AccountView::from(linked))))
}

pub async fn unlink_app(
    State(state): State<AppState>,
    Authenticated { token, .. }: Authenticated<UserOnly>,
    Path(account_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(linked) = state.accounts.retrieve(&token.user, &account_id).await? else {
        return Err(ErrorCode::AccountInexistent.into());
    };
    state.accounts.delete(&linked.account).await?;
    tracing::info!(user_id = %token.user.id, app_id = %linked.app.id, "account unlinked");

    state
        .webhooks
        .dispatch(linked.app, WebhookEvent::UserUnlinked, json!({ "id": token.user.id }));
    Ok(StatusCode::NO_CONTENT)
}
