use time::{format_description::well_known::Rfc3339, OffsetDateTime};

pub mod account;
pub mod application;
pub mod auth_token;
pub mod user;
pub mod webhook_event;

/// Current UTC time as stored in every `*_at` column.
pub fn timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339).unwrap_or_else(|_| now.to_string())
}
