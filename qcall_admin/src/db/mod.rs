//! Database module providing the MongoDB connection and repositories.
//!
//! The connection is built once by the caller and handed to the repositories;
//! nothing in this crate holds a process-wide handle.

use std::time::Duration;

use mongodb::{Client, bson::doc, options::ClientOptions};

pub mod config;
pub mod documents;
pub mod errors;
pub mod repository;

pub use config::DatabaseConfig;
pub use errors::{DbError, DbResult};
pub use repository::{MongoRepository, ReportRepository, ScoreRange, UserRepository};

/// Application name reported to the server in the handshake
const APP_NAME: &str = "qcall-admin";

/// MongoDB client bound to the admin database
#[derive(Clone)]
pub struct Database {
    client: Client,
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB and verify the server answers.
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Errors
    ///
    /// * `DbError::ConnectionFailure` - The URI is invalid or the server did not
    ///   answer a `ping` within the configured timeout
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use qcall_admin::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), qcall_admin::db::DbError> {
    ///     let config = DatabaseConfig::new("mongodb://localhost:27017", "qcall_db");
    ///     let db = Database::connect(&config).await?;
    ///     db.health_check().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        let timeout = Duration::from_secs(config.connect_timeout_secs);

        let mut options = ClientOptions::parse(&config.uri)
            .await
            .map_err(|e| DbError::ConnectionFailure(e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client =
            Client::with_options(options).map_err(|e| DbError::ConnectionFailure(e.to_string()))?;
        let db = client.database(&config.database_name);

        let database = Self { client, db };
        database
            .health_check()
            .await
            .map_err(|e| DbError::ConnectionFailure(e.to_string()))?;

        log::info!("Connected to MongoDB database '{}'", config.database_name);
        Ok(database)
    }

    /// Get a reference to the selected database
    pub fn handle(&self) -> &mongodb::Database {
        &self.db
    }

    /// Check if the database connection is healthy
    pub async fn health_check(&self) -> DbResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Close the client and its connection pool
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_malformed_uri() {
        let config = DatabaseConfig::new("not-a-mongodb-uri", "qcall_db");

        let result = Database::connect(&config).await;
        assert!(matches!(result, Err(DbError::ConnectionFailure(_))));
    }

    #[tokio::test]
    async fn test_connect_fails_fast_when_unreachable() {
        let config = DatabaseConfig {
            uri: "mongodb://127.0.0.1:1".to_string(),
            database_name: "qcall_db".to_string(),
            connect_timeout_secs: 1,
        };

        let start = std::time::Instant::now();
        let result = Database::connect(&config).await;

        assert!(matches!(result, Err(DbError::ConnectionFailure(_))));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
