use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::db::sqlite::SqlitePool;
use crate::models::{
    account::AccountRecord,
    application::{AppChanges, AppRecord, AppScopeRecord},
    auth_token::AuthTokenRecord,
    user::{UserChanges, UserRecord},
    webhook_event::WebhookEventRecord,
};
use crate::repos::IdentityRepo;
use crate::schema::{accounts, app_scopes, applications, auth_tokens, users, webhook_events};

pub struct SqliteIdentityRepo {
    pool: SqlitePool,
}

impl SqliteIdentityRepo {
    pub fn new(pool: SqlitePool) -> Arc<Self> {
        Arc::new(Self { pool })
    }

    /// Runs a blocking diesel closure on the blocking thread pool.
    async fn run<T, F>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await?
    }
}

#[async_trait]
impl IdentityRepo for SqliteIdentityRepo {
    async fn insert_user(&self, user: UserRecord) -> anyhow::Result<()> {
        self.run(move |conn| {
            diesel::insert_into(users::table).values(&user).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn get_user(&self, id: &str) -> anyhow::Result<Option<UserRecord>> {
        let id = id.to_string();
        self.run(move |conn| {
            let row = users::table.find(id).first::<UserRecord>(conn).optional()?;
            Ok(row)
        })
        .await
    }

    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let email = email.to_string();
        self.run(move |conn| {
            let row = users::table
                .filter(users::email.eq(&email))
                .first::<UserRecord>(conn)
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn update_user(&self, id: &str, changes: UserChanges) -> anyhow::Result<usize> {
        let id = id.to_string();
        self.run(move |conn| {
            let n = diesel::update(users::table.find(id)).set(&changes).execute(conn)?;
            Ok(n)
        })
        .await
    }

    async fn delete_user(&self, id: &str) -> anyhow::Result<usize> {
        let id = id.to_string();
        self.run(move |conn| {
            let n = diesel::delete(users::table.find(id)).execute(conn)?;
            Ok(n)
        })
        .await
    }

    async fn insert_application(&self, app: AppRecord) -> anyhow::Result<()> {
        self.run(move |conn| {
            diesel::insert_into(applications::table).values(&app).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn get_application(&self, id: &str) -> anyhow::Result<Option<AppRecord>> {
        let id = id.to_string();
        self.run(move |conn| {
            let row = applications::table.find(id).first::<AppRecord>(conn).optional()?;
            Ok(row)
        })
        .await
    }

    async fn find_application_by_url(&self, url: &str) -> anyhow::Result<Option<AppRecord>> {
        let url = url.to_string();
        self.run(move |conn| {
            let row = applications::table
                .filter(applications::url.eq(&url))
                .first::<AppRecord>(conn)
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn list_applications(&self, owner_user_id: &str) -> anyhow::Result<Vec<AppRecord>> {
        let owner_user_id = owner_user_id.to_string();
        self.run(move |conn| {
            let rows = applications::table
                .filter(applications::owner_user_id.eq(&owner_user_id))
                .order(applications::created_at.asc())
                .load::<AppRecord>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn update_application(&self, id: &str, changes: AppChanges) -> anyhow::Result<usize> {
        let id = id.to_string();
        self.run(move |conn| {
            let n = diesel::update(applications::table.find(id))
                .set(&changes)
                .execute(conn)?;
            Ok(n)
        })
        .await
    }

    async fn delete_application(&self, id: &str) -> anyhow::Result<usize> {
        let id = id.to_string();
        self.run(move |conn| {
            let n = diesel::delete(applications::table.find(id)).execute(conn)?;
            Ok(n)
        })
        .await
    }

    async fn replace_app_scopes(&self, app_id: &str, scopes: Vec<AppScopeRecord>) -> anyhow::Result<()> {
        let app_id = app_id.to_string();
        self.run(move |conn| {
            conn.transaction::<_, diesel::result::Error, _>(|conn| {
                diesel::delete(app_scopes::table.filter(app_scopes::app_id.eq(&app_id)))
                    .execute(conn)?;
                for scope in &scopes {
                    diesel::insert_into(app_scopes::table).values(scope).execute(conn)?;
                }
                Ok(())
            })?;
            Ok(())
        })
        .await
    }

    async fn list_app_scopes(&self, app_id: &str) -> anyhow::Result<Vec<AppScopeRecord>> {
        let app_id = app_id.to_string();
        self.run(move |conn| {
            let rows = app_scopes::table
                .filter(app_scopes::app_id.eq(&app_id))
                .order(app_scopes::value.asc())
                .load::<AppScopeRecord>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn delete_app_scopes(&self, app_id: &str) -> anyhow::Result<usize> {
        let app_id = app_id.to_string();
        self.run(move |conn| {
            let n = diesel::delete(app_scopes::table.filter(app_scopes::app_id.eq(&app_id)))
                .execute(conn)?;
            Ok(n)
        })
        .await
    }

    async fn insert_account(&self, account: AccountRecord) -> anyhow::Result<()> {
        self.run(move |conn| {
            diesel::insert_into(accounts::table).values(&account).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn get_account(&self, id: &str) -> anyhow::Result<Option<AccountRecord>> {
        let id = id.to_string();
        self.run(move |conn| {
            let row = accounts::table.find(id).first::<AccountRecord>(conn).optional()?;
            Ok(row)
        })
        .await
    }

    async fn find_account(&self, user_id: &str, app_id: &str) -> anyhow::Result<Option<AccountRecord>> {
        let user_id = user_id.to_string();
        let app_id = app_id.to_string();
        self.run(move |conn| {
            let row = accounts::table
                .filter(accounts::user_id.eq(&user_id))
                .filter(accounts::app_id.eq(&app_id))
                .first::<AccountRecord>(conn)
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn list_accounts_for_user(&self, user_id: &str) -> anyhow::Result<Vec<AccountRecord>> {
        let user_id = user_id.to_string();
        self.run(move |conn| {
            let rows = accounts::table
                .filter(accounts::user_id.eq(&user_id))
                .order(accounts::created_at.asc())
                .load::<AccountRecord>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn list_accounts_for_app(&self, app_id: &str) -> anyhow::Result<Vec<AccountRecord>> {
        let app_id = app_id.to_string();
        self.run(move |conn| {
            let rows = accounts::table
                .filter(accounts::app_id.eq(&app_id))
                .order(accounts::created_at.asc())
                .load::<AccountRecord>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn delete_account(&self, id: &str) -> anyhow::Result<usize> {
        let id = id.to_string();
        self.run(move |conn| {
            let n = diesel::delete(accounts::table.find(id)).execute(conn)?;
            Ok(n)
        })
        .await
    }

    async fn insert_auth_token(&self, token: AuthTokenRecord) -> anyhow::Result<()> {
        self.run(move |conn| {
            diesel::insert_into(auth_tokens::table).values(&token).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn get_auth_token(&self, token_hash: &str) -> anyhow::Result<Option<AuthTokenRecord>> {
        let token_hash = token_hash.to_string();
        self.run(move |conn| {
            let row = auth_tokens::table
                .find(token_hash)
                .first::<AuthTokenRecord>(conn)
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn delete_auth_token(&self, token_hash: &str) -> anyhow::Result<usize> {
        let token_hash = token_hash.to_string();
        self.run(move |conn| {
            let n = diesel::delete(auth_tokens::table.find(token_hash)).execute(conn)?;
            Ok(n)
        })
        .await
    }

    async fn insert_webhook_event(&self, event: WebhookEventRecord) -> anyhow::Result<()> {
        self.run(move |conn| {
            diesel::insert_into(webhook_events::table).values(&event).execute(conn)?;
            Ok(())
        })
        .await
    }

    async fn get_webhook_event(&self, id: &str) -> anyhow::Result<Option<WebhookEventRecord>> {
        let id = id.to_string();
        self.run(move |conn| {
            let row = webhook_events::table
                .find(id)
                .first::<WebhookEventRecord>(conn)
                .optional()?;
            Ok(row)
        })
        .await
    }

    async fn list_webhook_events(&self, app_id: &str) -> anyhow::Result<Vec<WebhookEventRecord>> {
        let app_id = app_id.to_string();
        self.run(move |conn| {
            let rows = webhook_events::table
                .filter(webhook_events::app_id.eq(&app_id))
                .order(webhook_events::created_at.asc())
                .load::<WebhookEventRecord>(conn)?;
            Ok(rows)
        })
        .await
    }

    async fn record_webhook_outcome(&self, id: &str, status_code: Option<i32>, delivered_at: Option<String>) -> anyhow::Result<()> {
        let id = id.to_string();
        self.run(move |conn| {
            diesel::update(webhook_events::table.find(id))
                .set((
                    webhook_events::status_code.eq(status_code),
                    webhook_events::delivered_at.eq(delivered_at),
                ))
                .execute(conn)?;
            Ok(())
        })
        .await
    }
}
