use qa_mocks_config::DatabaseSettings;
use sea_orm::{ConnectOptions, Database, DatabaseConnection as SeaConnection};
use sea_orm_migration::MigratorTrait;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// In-memory databases vanish with their connection, so they must never be recycled
const MEMORY_CONNECTION_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Database connection wrapper with configuration
#[derive(Clone)]
pub struct DatabaseConnection {
    connection: SeaConnection,
    settings: DatabaseSettings,
}

impl DatabaseConnection {
    /// Create a new database connection with configuration
    pub async fn new(settings: DatabaseSettings) -> StorageResult<Self> {
        info!("Connecting to database: {}", settings.url);

        let in_memory = is_memory_url(&settings.url);
        let url = if in_memory {
            settings.url.clone()
        } else {
            Self::ensure_sqlite_file_exists(&settings.url)?;
            with_create_mode(&settings.url)
        };

        let timeout = Duration::from_secs(settings.connection_timeout_secs);
        let mut opts = ConnectOptions::new(url);
        opts.connect_timeout(timeout)
            .acquire_timeout(timeout)
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        if in_memory {
            // Every pooled connection would otherwise open its own empty database
            opts.max_connections(1)
                .min_connections(1)
                .idle_timeout(MEMORY_CONNECTION_LIFETIME)
                .max_lifetime(MEMORY_CONNECTION_LIFETIME);
        } else {
            opts.max_connections(settings.max_connections)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(300))
                .max_lifetime(Duration::from_secs(3600));
        }

        let connection = Database::connect(opts).await?;

        debug!(
            "Database connection established with {} max connections",
            if in_memory { 1 } else { settings.max_connections }
        );

        Ok(Self {
            connection,
            settings,
        })
    }

    /// Private in-memory database, used by tests and throwaway runs
    pub async fn in_memory() -> StorageResult<Self> {
        Self::new(DatabaseSettings::sqlite("sqlite::memory:")).await
    }

    /// Ensure the parent directory of a file-based SQLite database exists
    fn ensure_sqlite_file_exists(database_url: &str) -> StorageResult<()> {
        let file_path = sqlite_file_path(database_url).ok_or_else(|| {
            StorageError::Config(format!("Invalid SQLite URL format: {}", database_url))
        })?;

        let path = Path::new(file_path);
        if let Some(parent_dir) = path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                info!("Creating database directory: {:?}", parent_dir);
                std::fs::create_dir_all(parent_dir).map_err(|e| {
                    StorageError::Config(format!(
                        "Failed to create database directory {:?}: {}",
                        parent_dir, e
                    ))
                })?;
            }
        }

        if path.exists() {
            debug!("Using existing database file: {:?}", path);
        } else {
            info!("Database file will be created by SQLite: {:?}", path);
        }

        Ok(())
    }

    /// Get the underlying Sea-ORM connection
    pub fn get_connection(&self) -> &SeaConnection {
        &self.connection
    }

    /// Get database settings
    pub fn settings(&self) -> &DatabaseSettings {
        &self.settings
    }

    /// Run a service's migrations
    pub async fn migrate<M: MigratorTrait>(&self) -> StorageResult<()> {
        info!("Running database migrations");

        M::up(&self.connection, None)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Check database connectivity
    pub async fn ping(&self) -> StorageResult<()> {
        self.connection.ping().await?;
        Ok(())
    }

    /// Close the database connection
    pub async fn close(self) -> StorageResult<()> {
        info!("Closing database connection");
        self.connection.close().await?;
        Ok(())
    }
}

fn is_memory_url(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// File path inside a `sqlite:` URL, without any query string
fn sqlite_file_path(database_url: &str) -> Option<&str> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty()).then_some(path)
}

/// Ask SQLite to create the file when it does not exist yet
fn with_create_mode(url: &str) -> String {
    if url.contains("mode=") {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&mode=rwc", url)
    } else {
        format!("{}?mode=rwc", url)
    }
}
