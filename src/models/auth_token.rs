use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Stored side of a bearer token; the plaintext never reaches the store.
#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = crate::schema::auth_tokens)]
pub struct AuthTokenRecord {
    pub token_hash: String,
    pub user_id: String,
    pub app_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppTokenRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}
