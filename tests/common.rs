#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header::AUTHORIZATION, header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use idlink::{
    app::{build_router, AppState},
    config::AppConfig,
    db,
    models::{
        application::{App, AppInput, WebhookInput},
        user::{NameInput, User, UserInput},
    },
    repos::{sqlite::SqliteIdentityRepo, IdentityRepo},
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt; // for oneshot

pub struct TestEnv {
    pub _dir: TempDir,
    pub repo: Arc<dyn IdentityRepo>,
    pub state: AppState,
}

impl TestEnv {
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }
}

pub fn init_test_env() -> anyhow::Result<TestEnv> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("test.sqlite").display().to_string();

    let pool = db::sqlite::make_pool(&db_path)?;
    {
        let mut conn = pool.get()?;
        db::migrations::run_sqlite_migrations(&mut conn)?;
    }

    let repo: Arc<dyn IdentityRepo> = SqliteIdentityRepo::new(pool);
    let mut config = AppConfig::default();
    config.server.bind_addr = "127.0.0.1:0".into();
    config.db.url = db_path;

    let state = AppState::new(config, repo.clone());
    Ok(TestEnv { _dir: dir, repo, state })
}

pub fn user_input(first: &str, last: &str, email: &str) -> UserInput {
    UserInput {
        name: Some(NameInput {
            first: Some(first.into()),
            last: Some(last.into()),
        }),
        email: Some(email.into()),
        password: Some("analytical-engine".into()),
        birthday: None,
        phone: None,
    }
}

pub fn ada() -> UserInput {
    UserInput {
        birthday: Some("1815-12-10".into()),
        phone: Some("+44 20 7946 0958".into()),
        ..user_input("Ada", "Lovelace", "ada@x.com")
    }
}

pub fn app_input(name: &str, url: &str, scopes: &[&str]) -> AppInput {
    AppInput {
        name: Some(name.into()),
        url: Some(url.into()),
        scopes: Some(scopes.iter().map(|s| s.to_string()).collect()),
        webhook: None,
    }
}

pub fn with_webhook(mut input: AppInput, url: &str) -> AppInput {
    input.webhook = Some(WebhookInput { url: Some(url.into()) });
    input
}

pub async fn create_user(env: &TestEnv, input: UserInput) -> User {
    env.state.users.create(input).await.expect("create user")
}

pub async fn create_app(env: &TestEnv, owner: &User, input: AppInput) -> App {
    env.state.apps.create(owner, input).await.expect("create app")
}

/// Drives one request through the router and decodes the JSON body (`Null` when empty).
pub async fn call(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let res = router.oneshot(request).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}
