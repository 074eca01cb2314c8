use std::sync::Arc;

use url::Url;

use crate::errors::{ErrorCode, ServiceResult};
use crate::models::{
    application::{App, AppChanges, AppInput, AppRecord, AppScopeRecord, AppUpdate},
    timestamp,
    user::User,
};
use crate::repos::IdentityRepo;
use crate::scopes::{self, Scope};
use crate::security::generate_token;
use crate::services::accounts::Accounts;
use crate::validation::{check, Field, Mode, Rule, Schema};

static APP_SCHEMA: Schema = Schema {
    fields: &[
        Field {
            path: "name",
            checks: &[check(Rule::Required, ErrorCode::AppNameRequired)],
        },
        Field {
            path: "url",
            checks: &[
                check(Rule::Required, ErrorCode::AppUrlRequired),
                check(Rule::HttpUrl, ErrorCode::AppUrlInvalid),
            ],
        },
        Field {
            path: "scopes",
            checks: &[
                check(Rule::Required, ErrorCode::AppScopesRequired),
                check(Rule::Each(scopes::is_known), ErrorCode::AppScopesInvalid),
            ],
        },
        Field {
            path: "webhook.url",
            checks: &[check(Rule::HttpUrl, ErrorCode::AppWebhookUrlInvalid)],
        },
    ],
};

/// Canonical form used for storage and lookup: lower-cased host, explicit root
/// path. Values that do not parse are only trimmed; validation rejects them.
fn normalize_url(url: &str) -> String {
    let url = url.trim();
    Url::parse(url).map(|u| u.to_string()).unwrap_or_else(|_| url.to_string())
}

/// Loads an app together with its granted scopes.
pub(crate) async fn load_app(repo: &dyn IdentityRepo, id: &str) -> anyhow::Result<Option<App>> {
    let Some(record) = repo.get_application(id).await? else {
        return Ok(None);
    };
    let scopes = repo
        .list_app_scopes(&record.id)
        .await?
        .into_iter()
        .map(Scope::from)
        .collect();
    Ok(Some(App::from_record(record, Some(scopes))))
}

#[derive(Clone)]
pub struct Apps {
    repo: Arc<dyn IdentityRepo>,
    accounts: Accounts,
}

impl Apps {
    pub fn new(repo: Arc<dyn IdentityRepo>, accounts: Accounts) -> Self {
        Self { repo, accounts }
    }

    /// Registers an app owned by `owner`. The URL must not already be registered;
    /// URLs are compared and stored in normalized form.
    pub async fn create(&self, owner: &User, input: AppInput) -> ServiceResult<App> {
        let mut failure = APP_SCHEMA.evaluate(&input, Mode::Create);
        let url = normalize_url(input.url.as_deref().unwrap_or_default());
        if !failure.contains(ErrorCode::AppUrlRequired)
            && !failure.contains(ErrorCode::AppUrlInvalid)
            && self.with_url(&url).await?.is_some()
        {
            failure.push(ErrorCode::AppUrlAlreadyExists);
        }
        failure.into_result()?;

        let now = timestamp();
        let id = uuid::Uuid::new_v4().to_string();
        let record = AppRecord {
            id: id.clone(),
            owner_user_id: owner.id.clone(),
            name: input.name.unwrap_or_default().trim().to_string(),
            url,
            api_key: generate_token("idl_key"),
            webhook_url: input.webhook.and_then(|w| w.url).map(|u| normalize_url(&u)),
            webhook_signature: generate_token("idl_whsec"),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let mut values = input.scopes.unwrap_or_default();
        values.sort();
        values.dedup();
        let grants: Vec<AppScopeRecord> = values
            .into_iter()
            .map(|value| AppScopeRecord {
                id: uuid::Uuid::new_v4().to_string(),
                app_id: id.clone(),
                value,
                created_at: now.clone(),
            })
            .collect();

        self.repo.insert_application(record.clone()).await?;
        self.repo.replace_app_scopes(&id, grants.clone()).await?;
        tracing::info!(app_id = %id, owner = %owner.id, scopes = grants.len(), "app registered");

        let scopes = grants.into_iter().map(Scope::from).collect();
        Ok(App::from_record(record, Some(scopes)))
    }

    pub async fn retrieve(&self, id: &str) -> ServiceResult<Option<App>> {
        Ok(load_app(self.repo.as_ref(), id).await?)
    }

    /// Apps owned by `owner`, without their scope sets.
    pub async fn list(&self, owner: &User) -> ServiceResult<Vec<App>> {
        let rows = self.repo.list_applications(&owner.id).await?;
        Ok(rows.into_iter().map(|r| App::from_record(r, None)).collect())
    }

    /// Only the webhook URL is mutable.
    pub async fn update(&self, app: &App, partial: AppUpdate) -> ServiceResult<App> {
        APP_SCHEMA.validate(&partial, Mode::Update)?;

        let changes = AppChanges {
            webhook_url: partial.webhook.map(|w| w.url.map(|u| normalize_url(&u))),
            updated_at: timestamp(),
        };
        self.repo.update_application(&app.id, changes).await?;
        tracing::info!(app_id = %app.id, "app updated");

        self.retrieve(&app.id)
            .await?
            .ok_or_else(|| ErrorCode::AppInexistent.into())
    }

    /// Removes the app, its scope grants and every account linked to it.
    pub async fn delete(&self, app: &App) -> ServiceResult<()> {
        self.repo.delete_application(&app.id).await?;
        self.repo.delete_app_scopes(&app.id).await?;
        for account in self.accounts.for_app(app).await? {
            self.accounts.delete(&account).await?;
        }
        tracing::info!(app_id = %app.id, "app deleted");
        Ok(())
    }

    pub fn is_owned_by(&self, app: &App, user: &User) -> bool {
        app.owner == user.id
    }

    pub async fn with_url(&self, url: &str) -> ServiceResult<Option<App>> {
        let row = self.repo.find_application_by_url(&normalize_url(url)).await?;
        Ok(row.map(|r| App::from_record(r, None)))
    }
}
