//! Connection settings and pool construction shared by the server and tests.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("failed to connect to database: {0}")]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_url_key")]
    env_key: String,
    #[serde(default = "default_max_connections")]
    max_connections: u32,
    #[serde(default)]
    sql_logging: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            env_key: default_url_key(),
            max_connections: default_max_connections(),
            sql_logging: false,
        }
    }
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            ..Self::default()
        }
    }

    /// Reads `DATABASE_MAX_CONNECTIONS` and `DATABASE_SQL_LOG` on top of the defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(max) = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
        {
            settings.max_connections = max.max(1);
        }
        settings.sql_logging = std::env::var("DATABASE_SQL_LOG")
            .ok()
            .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);
        settings
    }

    pub fn database_url(&self) -> DbResult<String> {
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl(self.env_key.clone()))
    }

    pub fn connect_options(&self, url: impl Into<String>) -> ConnectOptions {
        let url = url.into();
        // Every pooled connection to `sqlite::memory:` opens its own empty database.
        let max_connections = if url.contains(":memory:") {
            1
        } else {
            self.max_connections
        };
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(self.sql_logging);
        options
    }
}

/// Open a pool using the URL named by `settings`.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    connect_url(settings, &url).await
}

/// Open a pool for an explicit URL; used by tests and tooling.
pub async fn connect_url(settings: &DatabaseSettings, url: &str) -> DbResult<DbPool> {
    let pool = Database::connect(settings.connect_options(url)).await?;
    debug!(backend = ?pool.get_database_backend(), "database pool ready");
    Ok(pool)
}

/// Round-trip a trivial statement; backs the health endpoint.
pub async fn ping(pool: &DbPool) -> bool {
    let backend = pool.get_database_backend();
    pool.execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_url_names_the_variable() {
        let settings = DatabaseSettings::new("HR_TEST_URL_THAT_IS_NEVER_SET");
        let err = settings.database_url().unwrap_err();
        assert_eq!(
            err.to_string(),
            "database url missing (set HR_TEST_URL_THAT_IS_NEVER_SET)"
        );
    }

    #[tokio::test]
    async fn in_memory_sqlite_answers_ping() {
        let pool = connect_url(&DatabaseSettings::default(), "sqlite::memory:")
            .await
            .expect("sqlite pool");
        assert!(ping(&pool).await);
    }
}
