use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::scopes::Scope;

#[derive(Debug, Clone, Queryable, Identifiable, Insertable)]
#[diesel(table_name = crate::schema::applications)]
pub struct AppRecord {
    pub id: String,
    pub owner_user_id: String,
    pub name: String,
    pub url: String,
    pub api_key: String,
    pub webhook_url: Option<String>,
    pub webhook_signature: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::applications)]
pub struct AppChanges {
    /// `Some(None)` clears the webhook.
    pub webhook_url: Option<Option<String>>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Insertable)]
#[diesel(table_name = crate::schema::app_scopes)]
pub struct AppScopeRecord {
    pub id: String,
    pub app_id: String,
    pub value: String,
    pub created_at: String,
}

impl From<AppScopeRecord> for Scope {
    fn from(record: AppScopeRecord) -> Self {
        Scope {
            id: record.id,
            value: record.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Webhook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Api {
    pub key: String,
    pub webhook: Webhook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct App {
    pub id: String,
    pub name: String,
    pub url: String,
    pub owner: String,
    pub api: Api,
    /// Loaded on single-app reads, left out of list views.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<Scope>>,
}

impl App {
    pub fn from_record(record: AppRecord, scopes: Option<Vec<Scope>>) -> Self {
        App {
            id: record.id,
            name: record.name,
            url: record.url,
            owner: record.owner_user_id,
            api: Api {
                key: record.api_key,
                webhook: Webhook {
                    url: record.webhook_url,
                    signature: record.webhook_signature,
                },
            },
            scopes,
        }
    }

    /// Granted scopes, or none when the set was not loaded.
    pub fn granted_scopes(&self) -> &[Scope] {
        self.scopes.as_deref().unwrap_or(&[])
    }
}

/// What anyone other than the owner may see of an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicApp {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<Scope>>,
}

impl From<&App> for PublicApp {
    fn from(app: &App) -> Self {
        PublicApp {
            id: app.id.clone(),
            name: app.name.clone(),
            url: app.url.clone(),
            scopes: app.scopes.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookInput>,
}

/// Mutable part of an app.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookInput>,
}
