//! Authentication module providing the admin login check and token issuance.
//!
//! This module implements:
//! - Admin lookup by email with `role == "admin"`
//! - Argon2id password hashes, plus verification of legacy bcrypt hashes
//! - HS256 session tokens valid for four hours, carrying `{id, email, role}`
//!
//! Unknown emails and wrong passwords both surface as
//! [`AuthError::InvalidCredentials`].
//!
//! ## Example
//!
//! ```no_run
//! use qcall_admin::auth::AuthManager;
//! use qcall_admin::db::{Database, MongoRepository};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect(&Default::default()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(MongoRepository::new(&db)),
//!         "jwt_secret".to_string(),
//!         "http://localhost:8000".to_string(),
//!     );
//!
//!     let issued = auth.authenticate("admin@qcall.com", "admin123").await?;
//!     let subject = auth.verify_token(&issued.token)?;
//!     println!("Logged in as {}", subject.email);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::{AuthManager, TOKEN_LIFETIME_HOURS};
pub use models::{ADMIN_ROLE, IssuedToken, NewUser, Subject, TokenClaims, User, UserId};
