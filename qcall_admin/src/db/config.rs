//! Database configuration module.
//!
//! Provides configuration structures for database connection management.

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub uri: String,

    /// Name of the database holding `users`, `spamreports` and `globalnumbers`
    pub database_name: String,

    /// Connect and server-selection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Create a configuration for the given connection string and database
    pub fn new(uri: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database_name: database_name.into(),
            ..Self::development()
        }
    }

    /// Create a default configuration for development
    ///
    /// Uses `mongodb://localhost:27017` and the `qcall_db` database
    ///
    /// # Returns
    ///
    /// * `DatabaseConfig` - Default development configuration
    pub fn development() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database_name: "qcall_db".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}
