use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::application::App;

#[derive(Debug, Clone, Queryable, Identifiable, Insertable)]
#[diesel(table_name = crate::schema::accounts)]
pub struct AccountRecord {
    pub id: String,
    pub user_id: String,
    pub app_id: String,
    pub created_at: String,
}

/// Consent link between a user and an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: String,
    pub user: String,
    pub app: String,
    pub created_at: String,
}

impl From<AccountRecord> for Account {
    fn from(record: AccountRecord) -> Self {
        Account {
            id: record.id,
            user: record.user_id,
            app: record.app_id,
            created_at: record.created_at,
        }
    }
}

/// An account together with the app it links to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedAccount {
    pub account: Account,
    pub app: App,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
}
