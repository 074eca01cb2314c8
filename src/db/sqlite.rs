use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;

pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Concurrent handlers share one file; wait on locks instead of failing fast.
#[derive(Debug)]
struct ConnectionTuning;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionTuning {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA busy_timeout = 5000; PRAGMA journal_mode = WAL;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn make_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    let path = database_url.strip_prefix("sqlite://").unwrap_or(database_url);
    let manager = ConnectionManager::<SqliteConnection>::new(path);
    let pool = Pool::builder()
        .max_size(8)
        .connection_customizer(Box::new(ConnectionTuning))
        .build(manager)?;
    Ok(pool)
}
