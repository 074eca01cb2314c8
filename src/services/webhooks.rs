use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::models::{application::App, timestamp, webhook_event::WebhookEventRecord};
use crate::repos::IdentityRepo;

/// Lifecycle events pushed to an app's webhook endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookEvent {
    UserLinked,
    UserUnlinked,
    UserUpdated,
    UserDeleted,
}

impl WebhookEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            WebhookEvent::UserLinked => "user.linked",
            WebhookEvent::UserUnlinked => "user.unlinked",
            WebhookEvent::UserUpdated => "user.updated",
            WebhookEvent::UserDeleted => "user.deleted",
        }
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort delivery of lifecycle events. Failures are logged, never raised.
#[derive(Clone)]
pub struct Webhooks {
    repo: Arc<dyn IdentityRepo>,
    client: reqwest::Client,
}

impl Webhooks {
    pub fn new(repo: Arc<dyn IdentityRepo>) -> Self {
        Self {
            repo,
            client: reqwest::Client::new(),
        }
    }

    /// Delivers one event and reports whether the endpoint answered 200.
    ///
    /// Apps without a webhook URL are skipped: nothing is recorded and no request
    /// is made.
    pub async fn send(&self, app: &App, event: WebhookEvent, payload: Value) -> bool {
        let Some(url) = app.api.webhook.url.as_deref() else {
            return false;
        };

        let id = uuid::Uuid::new_v4().to_string();
        let body = json!({
            "id": id,
            "type": event.as_str(),
            "data": payload,
        });

        let record = WebhookEventRecord {
            id: id.clone(),
            app_id: app.id.clone(),
            event_type: event.as_str().to_string(),
            payload: body.to_string(),
            created_at: timestamp(),
            status_code: None,
            delivered_at: None,
        };
        if let Err(e) = self.repo.insert_webhook_event(record).await {
            tracing::warn!(error = ?e, app_id = %app.id, event = %event, "failed to record webhook event");
        }

        let status = match self
            .client
            .post(url)
            .bearer_auth(&app.api.webhook.signature)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => Some(response.status()),
            Err(e) => {
                tracing::warn!(error = %e, app_id = %app.id, event = %event, "webhook delivery failed");
                None
            }
        };

        let delivered = status == Some(StatusCode::OK);
        if !delivered {
            if let Some(status) = status {
                tracing::warn!(app_id = %app.id, event = %event, status = %status, "webhook endpoint rejected event");
            }
        }

        let outcome = self
            .repo
            .record_webhook_outcome(
                &id,
                status.map(|s| i32::from(s.as_u16())),
                delivered.then(timestamp),
            )
            .await;
        if let Err(e) = outcome {
            tracing::warn!(error = ?e, event_id = %id, "failed to record webhook outcome");
        }

        tracing::debug!(app_id = %app.id, event = %event, delivered, "webhook sent");
        delivered
    }

    /// Sends in the background; the caller never waits on delivery.
    pub fn dispatch(&self, app: App, event: WebhookEvent, payload: Value) {
        if app.api.webhook.url.is_none() {
            return;
        }
        let webhooks = self.clone();
        tokio::spawn(async move {
            webhooks.send(&app, event, payload).await;
        });
    }
}
