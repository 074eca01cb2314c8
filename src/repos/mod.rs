use async_trait::async_trait;

use crate::models::{
    account::AccountRecord,
    application::{AppChanges, AppRecord, AppScopeRecord},
    auth_token::AuthTokenRecord,
    user::{UserChanges, UserRecord},
    webhook_event::WebhookEventRecord,
};

/// Store access shared by every component. Absence is `Ok(None)`; deletes report
/// the number of removed rows and are no-ops on missing rows.
#[async_trait]
pub trait IdentityRepo: Send + Sync {
    // Users
    async fn insert_user(&self, user: UserRecord) -> anyhow::Result<()>;
    async fn get_user(&self, id: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>>;
    async fn update_user(&self, id: &str, changes: UserChanges) -> anyhow::Result<usize>;
    async fn delete_user(&self, id: &str) -> anyhow::Result<usize>;

    // Applications
    async fn insert_application(&self, app: AppRecord) -> anyhow::Result<()>;
    async fn get_application(&self, id: &str) -> anyhow::Result<Option<AppRecord>>;
    async fn find_application_by_url(&self, url: &str) -> anyhow::Result<Option<AppRecord>>;
    async fn list_applications(&self, owner_user_id: &str) -> anyhow::Result<Vec<AppRecord>>;
    async fn update_application(&self, id: &str, changes: AppChanges) -> anyhow::Result<usize>;
    async fn delete_application(&self, id: &str) -> anyhow::Result<usize>;

    // Granted scopes
    async fn replace_app_scopes(&self, app_id: &str, scopes: Vec<AppScopeRecord>) -> anyhow::Result<()>;
    async fn list_app_scopes(&self, app_id: &str) -> anyhow::Result<Vec<AppScopeRecord>>;
    async fn delete_app_scopes(&self, app_id: &str) -> anyhow::Result<usize>;

    // Accounts
    async fn insert_account(&self, account: AccountRecord) -> anyhow::Result<()>;
    async fn get_account(&self, id: &str) -> anyhow::Result<Option<AccountRecord>>;
    async fn find_account(&self, user_id: &str, app_id: &str) -> anyhow::Result<Option<AccountRecord>>;
    async fn list_accounts_for_user(&self, user_id: &str) -> anyhow::Result<Vec<AccountRecord>>;
    async fn list_accounts_for_app(&self, app_id: &str) -> anyhow::Result<Vec<AccountRecord>>;
    async fn delete_account(&self, id: &str) -> anyhow::Result<usize>;

    // Auth tokens
    async fn insert_auth_token(&self, token: AuthTokenRecord) -> anyhow::Result<()>;
    async fn get_auth_token(&self, token_hash: &str) -> anyhow::Result<Option<AuthTokenRecord>>;
    async fn delete_auth_token(&self, token_hash: &str) -> anyhow::Result<usize>;

    // Webhook audit trail
    async fn insert_webhook_event(&self, event: WebhookEventRecord) -> anyhow::Result<()>;
    async fn get_webhook_event(&self, id: &str) -> anyhow::Result<Option<WebhookEventRecord>>;
    async fn list_webhook_events(&self, app_id: &str) -> anyhow::Result<Vec<WebhookEventRecord>>;
    async fn record_webhook_outcome(&self, id: &str, status_code: Option<i32>, delivered_at: Option<String>) -> anyhow::Result<()>;
}

pub mod sqlite;
