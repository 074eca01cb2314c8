use std::sync::Arc;

use crate::errors::{ErrorCode, ServiceResult};
use crate::models::{
    account::{Account, AccountInput, AccountRecord, LinkedAccount},
    application::App,
    timestamp,
    user::User,
};
use crate::repos::IdentityRepo;
use crate::services::apps::load_app;
use crate::services::webhooks::{WebhookEvent, Webhooks};
use crate::validation::{check, Field, Mode, Rule, Schema};

static ACCOUNT_SCHEMA: Schema = Schema {
    fields: &[Field {
        path: "app",
        checks: &[check(Rule::Required, ErrorCode::AccountAppRequired)],
    }],
};

#[derive(Clone)]
pub struct Accounts {
    repo: Arc<dyn IdentityRepo>,
    webhooks: Webhooks,
}

impl Accounts {
    pub fn new(repo: Arc<dyn IdentityRepo>, webhooks: Webhooks) -> Self {
        Self { repo, webhooks }
    }

    /// Links `user` to the app named in `input` and notifies the app with the
    /// user's profile filtered to its granted scopes.
    pub async fn create(&self, input: AccountInput, user: &User) -> ServiceResult<LinkedAccount> {
        ACCOUNT_SCHEMA.validate(&input, Mode::Create)?;
        let app_id = input.app.unwrap_or_default();

        let Some(app) = load_app(self.repo.as_ref(), app_id.trim()).await? else {
            return Err(ErrorCode::AppInexistent.into());
        };
        if self.exists(user, &app).await? {
            return Err(ErrorCode::AccountAlreadyExists.into());
        }

        let record = AccountRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            app_id: app.id.clone(),
            created_at: timestamp(),
        };
        self.repo.insert_account(record.clone()).await?;
        tracing::info!(account_id = %record.id, user_id = %user.id, app_id = %app.id, "account linked");

        let payload = serde_json::to_value(user.filter(app.granted_scopes())).map_err(anyhow::Error::from)?;
        self.webhooks.dispatch(app.clone(), WebhookEvent::UserLinked, payload);

        Ok(LinkedAccount {
            account: record.into(),
            app,
        })
    }

    /// The account `id` if it belongs to `user` and its app still exists.
    pub async fn retrieve(&self, user: &User, id: &str) -> ServiceResult<Option<LinkedAccount>> {
        let Some(record) = self.repo.get_account(id).await? else {
            return Ok(None);
        };
        if record.user_id != user.id {
            return Ok(None);
        }
        let Some(app) = load_app(self.repo.as_ref(), &record.app_id).await? else {
            return Ok(None);
        };
        Ok(Some(LinkedAccount {
            account: record.into(),
            app,
        }))
    }

    pub async fn list(&self, user: &User) -> ServiceResult<Vec<Account>> {
        let rows = self.repo.list_accounts_for_user(&user.id).await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    /// Accounts of `user` paired with their apps; links to vanished apps are skipped.
    pub async fn linked(&self, user: &User) -> ServiceResult<Vec<LinkedAccount>> {
        let mut linked = Vec::new();
        for account in self.list(user).await? {
            if let Some(app) = load_app(self.repo.as_ref(), &account.app).await? {
                linked.push(LinkedAccount { account, app });
            }
        }
        Ok(linked)
    }

    pub async fn for_app(&self, app: &App) -> ServiceResult<Vec<Account>> {
        let rows = self.repo.list_accounts_for_app(&app.id).await?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    pub async fn exists(&self, user: &User, app: &App) -> ServiceResult<bool> {
        Ok(self.repo.find_account(&user.id, &app.id).await?.is_some())
    }

    pub async fn delete(&self, account: &Account) -> ServiceResult<()> {
        self.repo.delete_account(&account.id).await?;
        tracing::debug!(account_id = %account.id, "account removed");
        Ok(())
    }
}
