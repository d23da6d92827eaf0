//! Authentication data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role carried by every identity this panel authenticates
pub const ADMIN_ROLE: &str = "admin";

/// User ID type (hex form of the document id)
pub type UserId = String;

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields needed to create an admin account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// Identity embedded in a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: UserId,
    pub email: String,
    pub role: String,
}

impl From<&User> for Subject {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// JWT claims for a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub iat: i64, // Issued at timestamp
    pub exp: i64, // Expiration timestamp
    pub data: Subject,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub subject: Subject,
    pub expires_at: DateTime<Utc>,
}
