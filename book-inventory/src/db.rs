//! Connection pool and unit-of-work handles.
//!
//! A [`Database`] is built once per process and cloned into whatever needs
//! storage access. Each [`Session`] owns one pooled connection for as long as
//! it lives; the pool checks that a connection still answers before handing
//! it out.

use diesel::{Connection, PgConnection};
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig, RecyclingMethod};
use diesel_async::scoped_futures::ScopedBoxFuture;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use shared::Settings;
use tracing::{debug, info};

use crate::error::{Result, StoreError};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<AsyncPgConnection>;

#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    url: String,
}

impl Database {
    pub async fn connect(settings: &Settings) -> Result<Self> {
        info!("Connecting to {}", settings.redacted_url());
        Self::from_url(&settings.database_url()).await
    }

    pub async fn from_url(url: &str) -> Result<Self> {
        let mut config = ManagerConfig::default();
        config.recycling_method = RecyclingMethod::Verified;
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(url, config);

        let pool = Pool::builder().test_on_check_out(true).build(manager).await?;
        debug!("Connection pool ready");

        Ok(Self {
            pool,
            url: url.to_string(),
        })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub async fn session(&self) -> Result<Session> {
        let conn = self.pool.get_owned().await?;
        Ok(Session { conn })
    }

    /// Applies pending migrations on a blocking connection and returns the
    /// versions that were run.
    pub async fn run_migrations(&self) -> Result<Vec<String>> {
        let url = self.url.clone();
        tokio::task::spawn_blocking(move || run_migrations_blocking(&url)).await?
    }
}

pub fn run_migrations_blocking(url: &str) -> Result<Vec<String>> {
    let mut conn = PgConnection::establish(url)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    let versions: Vec<String> = applied.iter().map(ToString::to_string).collect();
    for version in &versions {
        info!("Applied migration {}", version);
    }
    Ok(versions)
}

/// One unit of work. Models read through a session are owned values and stay
/// usable after the session commits or is dropped.
pub struct Session {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

impl Session {
    pub fn conn(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }

    /// Runs `callback` inside a database transaction, committing on `Ok` and
    /// rolling back on `Err`.
    pub async fn transaction<'a, R, F>(&mut self, callback: F) -> Result<R>
    where
        F: for<'r> FnOnce(&'r mut AsyncPgConnection) -> ScopedBoxFuture<'a, 'r, Result<R>>
            + Send
            + 'a,
        R: Send + 'a,
    {
        self.conn().transaction::<_, StoreError, _>(callback).await
    }
}
