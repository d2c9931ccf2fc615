//! database (db) connection structure.
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use url::Url;

/// Custom db structure holding the connection pool.
#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Init database connections.
    pub async fn new(url: &Url, pool: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres = pool.connect(url.as_str()).await?;

        let hostname = url.host_str().unwrap_or_default();
        let db = url.path().trim_start_matches('/');
        tracing::info!(%hostname, %db, "postgres connected");

        Ok(Self { postgres })
    }

    /// Execute migrations scripts.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.postgres).await
    }
}
