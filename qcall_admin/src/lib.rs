//! # QCall Admin
//!
//! Core of the QCall admin panel: credential checks, session handling and the
//! read-only dashboard queries over the spam-reporting collections.
//!
//! ## Architecture
//!
//! - **Credential Store**: the `users` collection, reached through [`db::UserRepository`]
//! - **Token Issuer**: [`auth::AuthManager`] verifies credentials and signs HS256 tokens
//! - **Session Store**: [`session::SessionStore`] keeps issued tokens server-side, keyed by a random id
//! - **Session Guard**: [`session::SessionGuard`] turns a session id back into an admin [`auth::Subject`]
//! - **Query Service**: [`stats::StatsService`] counts and lists reports and flagged numbers
//!
//! Every component receives its collaborators explicitly; there is no global
//! database handle.
//!
//! ## Example
//!
//! ```no_run
//! use qcall_admin::auth::AuthManager;
//! use qcall_admin::db::{Database, DatabaseConfig, MongoRepository};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect(&DatabaseConfig::default()).await?;
//! let repo = Arc::new(MongoRepository::new(&db));
//! let auth = AuthManager::new(repo, "jwt_secret".to_string(), "http://localhost:8000".to_string());
//!
//! let issued = auth.authenticate("admin@qcall.com", "admin123").await?;
//! println!("token for {}", issued.subject.email);
//! # Ok(())
//! # }
//! ```

/// Admin authentication and token issuance.
pub mod auth;

/// Time source shared by the token issuer and the session store.
pub mod clock;

/// MongoDB connection and repositories.
pub mod db;

/// Server-side session storage and the session guard.
pub mod session;

/// Dashboard queries.
pub mod stats;

pub use auth::{AuthError, AuthManager, Subject};
pub use clock::{Clock, SystemClock};
pub use session::{GuardRejection, SessionGuard, SessionStore};
pub use stats::StatsService;
