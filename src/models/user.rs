use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::scopes::{self, Scope};

#[derive(Debug, Clone, Queryable, Identifiable, Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct UserRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub birthday: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub birthday: Option<String>,
    pub phone: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    pub first: String,
    pub last: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub name: Name,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            name: Name {
                first: record.first_name,
                last: record.last_name,
            },
            email: record.email,
            password_hash: record.password_hash,
            birthday: record.birthday,
            phone: record.phone,
        }
    }
}

impl User {
    /// Copy of this user with every field outside `granted` cleared.
    pub fn filter(&self, granted: &[Scope]) -> User {
        let keep = |path: &str| scopes::covers(granted, path);
        User {
            id: self.id.clone(),
            name: Name {
                first: if keep(scopes::NAME_FIRST) { self.name.first.clone() } else { String::new() },
                last: if keep(scopes::NAME_LAST) { self.name.last.clone() } else { String::new() },
            },
            email: if keep(scopes::EMAIL) { self.email.clone() } else { String::new() },
            password_hash: String::new(),
            birthday: self.birthday.clone().filter(|_| keep(scopes::BIRTHDAY)),
            phone: self.phone.clone().filter(|_| keep(scopes::PHONE)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Sign-up and profile-update payload. Every field is optional at the type level;
/// the operation's schema decides what is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<NameInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}
