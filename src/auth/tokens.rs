//! Opaque bearer tokens for user sessions and app delegation.
//!
//! Only `sha256(token)` is stored. The plaintext is handed to the caller once at
//! issue time and presented back on every request.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::errors::{ErrorCode, ServiceResult};
use crate::models::{
    application::{App, PublicApp},
    auth_token::{AppTokenRequest, AuthTokenRecord, Credentials},
    timestamp,
    user::User,
};
use crate::repos::IdentityRepo;
use crate::scopes::EffectiveScopes;
use crate::security::{generate_token, hash_token, verify_password};
use crate::services::apps::load_app;
use crate::validation::{check, Field, Mode, Rule, Schema};

static CREDENTIALS_SCHEMA: Schema = Schema {
    fields: &[
        Field {
            path: "email",
            checks: &[check(Rule::Required, ErrorCode::UserEmailRequired)],
        },
        Field {
            path: "password",
            checks: &[check(Rule::Required, ErrorCode::UserPasswordRequired)],
        },
    ],
};

static APP_TOKEN_SCHEMA: Schema = Schema {
    fields: &[Field {
        path: "app",
        checks: &[check(Rule::Required, ErrorCode::TokenAppRequired)],
    }],
};

const TOKEN_PREFIX: &str = "idl_tok";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    User,
    App,
}

/// A resolved bearer token. For app tokens `user` is already filtered by the
/// app's granted scopes.
#[derive(Debug, Clone, Serialize)]
pub struct AuthToken {
    #[serde(rename = "token")]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "public_app")]
    pub app: Option<App>,
    pub scopes: EffectiveScopes,
}

// App credentials never leave through a token.
fn public_app<S: Serializer>(app: &Option<App>, serializer: S) -> Result<S::Ok, S::Error> {
    app.as_ref().map(PublicApp::from).serialize(serializer)
}

impl AuthToken {
    fn for_user(id: String, user: User) -> Self {
        AuthToken {
            id,
            kind: TokenKind::User,
            user,
            app: None,
            scopes: EffectiveScopes::Root,
        }
    }

    fn for_app(id: String, user: &User, app: App) -> Self {
        let granted = app.granted_scopes().to_vec();
        AuthToken {
            id,
            kind: TokenKind::App,
            user: user.filter(&granted),
            app: Some(app),
            scopes: EffectiveScopes::Granted(granted),
        }
    }
}

#[derive(Clone)]
pub struct AuthTokens {
    repo: Arc<dyn IdentityRepo>,
}

impl AuthTokens {
    pub fn new(repo: Arc<dyn IdentityRepo>) -> Self {
        Self { repo }
    }

    /// Signs a user in with email and password.
    pub async fn issue_for_user(&self, credentials: Credentials) -> ServiceResult<AuthToken> {
        CREDENTIALS_SCHEMA.validate(&credentials, Mode::Create)?;
        let email = credentials.email.unwrap_or_default().trim().to_lowercase();
        let password = credentials.password.unwrap_or_default();

        let Some(record) = self.repo.find_user_by_email(&email).await? else {
            return Err(ErrorCode::UserEmailInexistent.into());
        };
        if !verify_password(&record.password_hash, &password) {
            tracing::warn!(user_id = %record.id, "wrong password");
            return Err(ErrorCode::UserPasswordWrong.into());
        }

        let token = generate_token(TOKEN_PREFIX);
        self.repo
            .insert_auth_token(AuthTokenRecord {
                token_hash: hash_token(&token),
                user_id: record.id.clone(),
                app_id: None,
                created_at: timestamp(),
            })
            .await?;
        tracing::info!(user_id = %record.id, "user token issued");
        Ok(AuthToken::for_user(token, record.into()))
    }

    /// Issues a delegation token letting the requested app act for `user`.
    /// Whether the user consented is checked by the caller.
    pub async fn issue_for_app(&self, request: AppTokenRequest, user: &User) -> ServiceResult<AuthToken> {
        APP_TOKEN_SCHEMA.validate(&request, Mode::Create)?;
        let app_id = request.app.unwrap_or_default();

        let Some(user_record) = self.repo.get_user(&user.id).await? else {
            return Err(ErrorCode::UserInexistent.into());
        };
        let Some(app) = load_app(self.repo.as_ref(), app_id.trim()).await? else {
            return Err(ErrorCode::AppInexistent.into());
        };

        let token = generate_token(TOKEN_PREFIX);
        self.repo
            .insert_auth_token(AuthTokenRecord {
                token_hash: hash_token(&token),
                user_id: user_record.id.clone(),
                app_id: Some(app.id.clone()),
                created_at: timestamp(),
            })
            .await?;
        tracing::info!(user_id = %user_record.id, app_id = %app.id, "app token issued");
        Ok(AuthToken::for_app(token, &User::from(user_record), app))
    }

    /// Looks a bearer token up. Tokens whose user or app has since been deleted
    /// resolve to nothing.
    pub async fn resolve(&self, token: &str) -> ServiceResult<Option<AuthToken>> {
        if token.is_empty() {
            return Ok(None);
        }
        let Some(record) = self.repo.get_auth_token(&hash_token(token)).await? else {
            return Ok(None);
        };
        let Some(user) = self.repo.get_user(&record.user_id).await? else {
            tracing::debug!(user_id = %record.user_id, "token refers to a deleted user");
            return Ok(None);
        };
        let user = User::from(user);

        match record.app_id {
            None => Ok(Some(AuthToken::for_user(token.to_string(), user))),
            Some(app_id) => match load_app(self.repo.as_ref(), &app_id).await? {
                Some(app) => Ok(Some(AuthToken::for_app(token.to_string(), &user, app))),
                None => {
                    tracing::debug!(app_id = %app_id, "token refers to a deleted app");
                    Ok(None)
                }
            },
        }
    }

    /// Signs out. Unknown tokens are ignored.
    pub async fn delete(&self, token: &str) -> ServiceResult<()> {
        self.repo.delete_auth_token(&hash_token(token)).await?;
        Ok(())
    }
}
