use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerCfg {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Base URL the provider is reachable at, used in log output.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbCfg {
    /// SQLite file path, optionally prefixed with `sqlite://`.
    #[serde(default = "default_db_url")]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerCfg,
    pub db: DbCfg,
}

fn default_bind_addr() -> String { "127.0.0.1:8080".to_string() }
fn default_public_url() -> String { "http://127.0.0.1:8080".to_string() }
fn default_db_url() -> String { "idlink.db".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerCfg {
                bind_addr: default_bind_addr(),
                public_url: default_public_url(),
            },
            db: DbCfg { url: default_db_url() },
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        // IDLINK_SERVER__BIND_ADDR, IDLINK_DB__URL, ...
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("IDLINK").separator("__"))
            .build()?;

        // Flat fallbacks: APP_BIND_ADDR, APP_PUBLIC_URL, DATABASE_URL
        let server = settings.get::<ServerCfg>("server").unwrap_or_else(|_| ServerCfg {
            bind_addr: std::env::var("APP_BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
            public_url: std::env::var("APP_PUBLIC_URL").unwrap_or_else(|_| default_public_url()),
        });
        let db = settings.get::<DbCfg>("db").unwrap_or_else(|_| DbCfg {
            url: std::env::var("DATABASE_URL").unwrap_or_else(|_| default_db_url()),
        });

        Ok(AppConfig { server, db })
    }
}
