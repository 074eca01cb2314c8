use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::auth::AuthTokens;
use crate::config::AppConfig;
use crate::repos::IdentityRepo;
use crate::services::{Accounts, Apps, Users, Webhooks};
use crate::web::handlers;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: Users,
    pub apps: Apps,
    pub accounts: Accounts,
    pub tokens: AuthTokens,
    pub webhooks: Webhooks,
}

impl AppState {
    /// Wires every component to the same store.
    pub fn new(config: AppConfig, repo: Arc<dyn IdentityRepo>) -> Self {
        let webhooks = Webhooks::new(repo.clone());
        let accounts = Accounts::new(repo.clone(), webhooks.clone());
        let apps = Apps::new(repo.clone(), accounts.clone());
        let users = Users::new(repo.clone(), apps.clone(), accounts.clone(), webhooks.clone());
        let tokens = AuthTokens::new(repo);
        AppState {
            config,
            users,
            apps,
            accounts,
            tokens,
            webhooks,
        }
    }
}

pub async fn run() -> anyhow::Result<()> {
    // logging
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();

    let config = AppConfig::load()?;
    tracing::info!(?config, "loaded config");

    let pool = crate::db::sqlite::make_pool(&config.db.url)?;
    {
        let mut conn = pool.get()?;
        crate::db::migrations::run_sqlite_migrations(&mut conn)?;
    }
    let repo: Arc<dyn IdentityRepo> = crate::repos::sqlite::SqliteIdentityRepo::new(pool);

    let state = AppState::new(config.clone(), repo);
    let app = build_router(state);

    let addr = config.server.bind_addr.clone();
    tracing::info!(%addr, public_url = %config.server.public_url, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/scopes", get(handlers::scopes::list_scopes))
        .route("/users", post(handlers::users::sign_up))
        .route(
            "/users/me",
            get(handlers::users::me)
                .patch(handlers::users::update_me)
                .delete(handlers::users::delete_me),
        )
        .route("/auth/tokens", post(handlers::auth::create_token))
        .route("/auth/tokens/app", post(handlers::auth::create_app_token))
        .route("/auth/tokens/current", delete(handlers::auth::sign_out))
        .route(
            "/apps",
            get(handlers::apps::list_apps).post(handlers::apps::create_app),
        )
        .route(
            "/apps/{id}",
            get(handlers::apps::get_app)
                .patch(handlers::apps::update_app)
                .delete(handlers::apps::delete_app),
        )
        .route(
            "/accounts",
            get(handlers::accounts::list_accounts).post(handlers::accounts::link_app),
        )
        .route("/accounts/{id}", delete(handlers::accounts::unlink_app))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
