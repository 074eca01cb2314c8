use std::sync::Arc;

use serde_json::json;

use crate::errors::{ErrorCode, ServiceResult};
use crate::models::{
    timestamp,
    user::{User, UserChanges, UserInput, UserRecord},
};
use crate::repos::IdentityRepo;
use crate::security::hash_password;
use crate::services::{
    accounts::Accounts,
    apps::Apps,
    webhooks::{WebhookEvent, Webhooks},
};
use crate::validation::{check, Field, Mode, Rule, Schema};

pub const MIN_PASSWORD_LEN: usize = 8;

static USER_SCHEMA: Schema = Schema {
    fields: &[
        Field {
            path: "name.first",
            checks: &[check(Rule::Required, ErrorCode::UserNameFirstRequired)],
        },
        Field {
            path: "name.last",
            checks: &[check(Rule::Required, ErrorCode::UserNameLastRequired)],
        },
        Field {
            path: "email",
            checks: &[
                check(Rule::Required, ErrorCode::UserEmailRequired),
                check(Rule::Email, ErrorCode::UserEmailInvalid),
            ],
        },
        Field {
            path: "password",
            checks: &[
                check(Rule::Required, ErrorCode::UserPasswordRequired),
                check(Rule::MinLength(MIN_PASSWORD_LEN), ErrorCode::UserPasswordTooShort),
            ],
        },
        Field {
            path: "birthday",
            checks: &[check(Rule::Date, ErrorCode::UserBirthdayInvalid)],
        },
        Field {
            path: "phone",
            checks: &[check(Rule::Phone, ErrorCode::UserPhoneInvalid)],
        },
    ],
};

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Clone)]
pub struct Users {
    repo: Arc<dyn IdentityRepo>,
    apps: Apps,
    accounts: Accounts,
    webhooks: Webhooks,
}

impl Users {
    pub fn new(repo: Arc<dyn IdentityRepo>, apps: Apps, accounts: Accounts, webhooks: Webhooks) -> Self {
        Self {
            repo,
            apps,
            accounts,
            webhooks,
        }
    }

    /// Signs up a new user. A taken email is reported alongside any field errors.
    ///
    /// The email is trimmed and lower-cased before it is validated and stored, so
    /// `Ada@X.com` reads back as `ada@x.com`.
    pub async fn create(&self, input: UserInput) -> ServiceResult<User> {
        let input = UserInput {
            email: input.email.as_deref().map(normalize_email),
            ..input
        };
        let mut failure = USER_SCHEMA.evaluate(&input, Mode::Create);
        let email = input.email.clone().unwrap_or_default();
        if !failure.contains(ErrorCode::UserEmailRequired)
            && !failure.contains(ErrorCode::UserEmailInvalid)
            && self.exists(&email).await?
        {
            failure.push(ErrorCode::UserEmailAlreadyExists);
        }
        failure.into_result()?;

        let name = input.name.unwrap_or_default();
        let now = timestamp();
        let record = UserRecord {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: name.first.unwrap_or_default().trim().to_string(),
            last_name: name.last.unwrap_or_default().trim().to_string(),
            email,
            password_hash: hash_password(input.password.as_deref().unwrap_or_default())?,
            birthday: input.birthday,
            phone: input.phone,
            created_at: now.clone(),
            updated_at: now,
        };
        self.repo.insert_user(record.clone()).await?;
        tracing::info!(user_id = %record.id, "user created");
        Ok(record.into())
    }

    pub async fn retrieve(&self, id: &str) -> ServiceResult<Option<User>> {
        let row = self.repo.get_user(id).await?;
        Ok(row.map(User::from))
    }

    pub async fn with_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let row = self.repo.find_user_by_email(&normalize_email(email)).await?;
        Ok(row.map(User::from))
    }

    pub async fn exists(&self, email: &str) -> ServiceResult<bool> {
        Ok(self.with_email(email).await?.is_some())
    }

    /// Applies the present fields of `partial`. Linked apps are notified only when
    /// a field within their granted scopes changed. Emails are case-folded as on sign-up.
    pub async fn update(&self, user: &User, partial: UserInput) -> ServiceResult<User> {
        let partial = UserInput {
            email: partial.email.as_deref().map(normalize_email),
            ..partial
        };
        let mut failure = USER_SCHEMA.evaluate(&partial, Mode::Update);
        let email = partial.email.clone();
        if let Some(email) = email.as_deref() {
            if !failure.contains(ErrorCode::UserEmailRequired)
                && !failure.contains(ErrorCode::UserEmailInvalid)
                && email != user.email
                && self.exists(email).await?
            {
                failure.push(ErrorCode::UserEmailAlreadyExists);
            }
        }
        failure.into_result()?;

        let password_hash = match partial.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };
        let name = partial.name.unwrap_or_default();
        let changes = UserChanges {
            first_name: name.first.map(|s| s.trim().to_string()),
            last_name: name.last.map(|s| s.trim().to_string()),
            email,
            password_hash,
            birthday: partial.birthday,
            phone: partial.phone,
            updated_at: timestamp(),
        };
        self.repo.update_user(&user.id, changes).await?;

        let updated = self
            .retrieve(&user.id)
            .await?
            .ok_or(ErrorCode::UserInexistent)?;
        tracing::info!(user_id = %updated.id, "user updated");

        for linked in self.accounts.linked(&updated).await? {
            let visible = updated.filter(linked.app.granted_scopes());
            if visible == user.filter(linked.app.granted_scopes()) {
                tracing::debug!(app_id = %linked.app.id, "no visible change, skipping user.updated");
                continue;
            }
            let payload = serde_json::to_value(visible).map_err(anyhow::Error::from)?;
            self.webhooks.dispatch(linked.app, WebhookEvent::UserUpdated, payload);
        }
        Ok(updated)
    }

    /// Deletes the user, the apps they own and their remaining accounts. Apps the
    /// user had linked to (and does not own) receive `user.deleted`.
    pub async fn delete(&self, user: &User) -> ServiceResult<()> {
        let linked = self.accounts.linked(user).await?;

        self.repo.delete_user(&user.id).await?;
        for app in self.apps.list(user).await? {
            self.apps.delete(&app).await?;
        }
        for account in self.accounts.list(user).await? {
            self.accounts.delete(&account).await?;
        }
        tracing::info!(user_id = %user.id, "user deleted");

        for entry in linked.into_iter().filter(|l| l.app.owner != user.id) {
            self.webhooks
                .dispatch(entry.app, WebhookEvent::UserDeleted, json!({ "id": user.id }));
        }
        Ok(())
    }
}
