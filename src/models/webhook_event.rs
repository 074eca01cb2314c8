use diesel::prelude::*;
use serde::Serialize;

/// Audit row for one outbound webhook call.
#[derive(Debug, Clone, Serialize, Queryable, Identifiable, Insertable)]
#[diesel(table_name = crate::schema::webhook_events)]
pub struct WebhookEventRecord {
    pub id: String,
    pub app_id: String,
    pub event_type: String,
    pub payload: String,
    pub created_at: String,
    pub status_code: Option<i32>,
    pub delivered_at: Option<String>,
}
