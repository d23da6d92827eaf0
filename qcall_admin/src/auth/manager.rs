//! Authentication manager implementation.

use super::{
    errors::{AuthError, AuthResult},
    models::{IssuedToken, Subject, TokenClaims, User},
};
use crate::clock::{Clock, SystemClock};
use crate::db::UserRepository;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::sync::Arc;

/// Lifetime of a session token
pub const TOKEN_LIFETIME_HOURS: i64 = 4;

/// Argon2id hash with the default cost parameters that matches no password.
///
/// Verified against when the email is unknown, so that lookup misses cost as
/// much as a wrong password.
const UNKNOWN_ACCOUNT_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$cWNhbGwtZHVtbXktc2FsdA$HwAfuRejl0lzLGw5hco0NiSYLQ7jDyg2p5a9LClyKEI";

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    users: Arc<dyn UserRepository>,
    jwt_secret: String,
    issuer: String,
    token_duration: Duration,
    clock: Arc<dyn Clock>,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `users` - Credential store
    /// * `jwt_secret` - Secret key for HS256 signing
    /// * `issuer` - Value of the `iss` claim, normally the panel's base URL
    pub fn new(users: Arc<dyn UserRepository>, jwt_secret: String, issuer: String) -> Self {
        Self {
            users,
            jwt_secret,
            issuer,
            token_duration: Duration::hours(TOKEN_LIFETIME_HOURS),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source used for `iat`/`exp` and for expiry checks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Verify admin credentials and issue a signed session token
    ///
    /// # Arguments
    ///
    /// * `email` - Login email, matched verbatim
    /// * `password` - Plain-text password
    ///
    /// # Returns
    ///
    /// * `AuthResult<IssuedToken>` - Compact JWT plus the subject it asserts
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidCredentials` - No admin with that email, or the password
    ///   does not match. The two cases are deliberately indistinguishable.
    /// * `AuthError::Database` - The credential store could not be queried
    pub async fn authenticate(&self, email: &str, password: &str) -> AuthResult<IssuedToken> {
        let Some(user) = self.users.find_admin_by_email(email).await? else {
            let _ = verify_password(password, UNKNOWN_ACCOUNT_HASH);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &user.password_hash)?;

        self.issue_token(&user)
    }

    /// Verify a session token and return the identity it carries
    ///
    /// # Errors
    ///
    /// * `AuthError::InvalidToken` - Bad signature, wrong issuer, malformed, or expired
    ///   according to the manager's clock
    pub fn verify_token(&self, token: &str) -> AuthResult<Subject> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;

        let token_data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::InvalidToken)?;

        if self.clock.now().timestamp() >= token_data.claims.exp {
            return Err(AuthError::InvalidToken);
        }

        Ok(token_data.claims.data)
    }

    /// Hash a password with Argon2id for storage
    pub fn hash_password(password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    /// Sign a token for `user`, valid for four hours from now
    fn issue_token(&self, user: &User) -> AuthResult<IssuedToken> {
        let now = self.clock.now();
        let expires_at = now + self.token_duration;
        let subject = Subject::from(user);

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            data: subject.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(IssuedToken {
            token,
            subject,
            expires_at: truncate_to_seconds(expires_at),
        })
    }
}

/// Verify password against a stored hash.
///
/// Accepts Argon2 PHC strings and the bcrypt hashes written by the legacy
/// seeder. Both comparisons are constant-time.
fn verify_password(password: &str, hash: &str) -> AuthResult<()> {
    if is_bcrypt_hash(hash) {
        return match bcrypt::verify(password, hash) {
            Ok(true) => Ok(()),
            _ => Err(AuthError::InvalidCredentials),
        };
    }

    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

fn truncate_to_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}
