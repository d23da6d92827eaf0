//! Session guard run in front of every protected request.

use std::sync::Arc;
use thiserror::Error;

use super::store::SessionStore;
use crate::auth::{AuthManager, Subject};

/// Why a request was turned away
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GuardRejection {
    /// No session id, or the id does not name a live session
    #[error("No active session")]
    NoSession,

    /// The stored token failed verification; the session has been destroyed
    #[error("Session token is invalid or expired")]
    InvalidToken,
}

/// Resolves a browser session id to the admin identity behind it
#[derive(Clone)]
pub struct SessionGuard {
    sessions: Arc<SessionStore>,
    auth: Arc<AuthManager>,
}

impl SessionGuard {
    pub fn new(sessions: Arc<SessionStore>, auth: Arc<AuthManager>) -> Self {
        Self { sessions, auth }
    }

    /// Check the session named by `session_id`
    ///
    /// # Arguments
    ///
    /// * `session_id` - Value of the session cookie, if the browser sent one
    ///
    /// # Returns
    ///
    /// * `Result<Subject, GuardRejection>` - Identity embedded in the session token
    ///
    /// # Errors
    ///
    /// * `GuardRejection::NoSession` - Missing, unknown, or store-expired session
    /// * `GuardRejection::InvalidToken` - Token rejected by the auth manager. The
    ///   session is removed before returning.
    pub async fn require_session(
        &self,
        session_id: Option<&str>,
    ) -> Result<Subject, GuardRejection> {
        let Some(id) = session_id.filter(|id| !id.is_empty()) else {
            return Err(GuardRejection::NoSession);
        };

        let Some(token) = self.sessions.get(id).await else {
            log::debug!("Rejected request with unknown session");
            return Err(GuardRejection::NoSession);
        };

        match self.auth.verify_token(&token) {
            Ok(subject) => Ok(subject),
            Err(_) => {
                self.sessions.destroy(id).await;
                log::warn!("Destroyed session holding an invalid token");
                Err(GuardRejection::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ADMIN_ROLE, User};
    use crate::clock::mock::ManualClock;
    use crate::db::repository::mock::MockUserRepository;
    use chrono::Duration;

    struct Fixture {
        guard: SessionGuard,
        sessions: Arc<SessionStore>,
        auth: Arc<AuthManager>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = ManualClock::starting_now();
        let users = MockUserRepository::new().with_user(User {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".to_string(),
            first_name: "Super".to_string(),
            last_name: "Admin".to_string(),
            email: "admin@qcall.com".to_string(),
            password_hash: AuthManager::hash_password("admin123").unwrap(),
            role: ADMIN_ROLE.to_string(),
            created_at: None,
        });
        let auth = Arc::new(
            AuthManager::new(
                Arc::new(users),
                "guard_test_secret_value".to_string(),
                "http://localhost:8000".to_string(),
            )
            .with_clock(clock.clone()),
        );
        let sessions = Arc::new(SessionStore::with_clock(24 * 60 * 60, clock.clone()));

        Fixture {
            guard: SessionGuard::new(sessions.clone(), auth.clone()),
            sessions,
            auth,
            clock,
        }
    }

    async fn login(f: &Fixture) -> String {
        let issued = f.auth.authenticate("admin@qcall.com", "admin123").await.unwrap();
        f.sessions.create(issued.token).await
    }

    #[tokio::test]
    async fn test_valid_session_yields_subject() {
        let f = fixture();
        let id = login(&f).await;

        let subject = f.guard.require_session(Some(&id)).await.unwrap();
        assert_eq!(subject.email, "admin@qcall.com");
        assert_eq!(subject.role, "admin");
    }

    #[tokio::test]
    async fn test_missing_or_unknown_session() {
        let f = fixture();

        assert_eq!(
            f.guard.require_session(None).await,
            Err(GuardRejection::NoSession)
        );
        assert_eq!(
            f.guard.require_session(Some("")).await,
            Err(GuardRejection::NoSession)
        );
        assert_eq!(
            f.guard.require_session(Some("not-a-session")).await,
            Err(GuardRejection::NoSession)
        );
    }

    #[tokio::test]
    async fn test_expired_token_destroys_session() {
        let f = fixture();
        let id = login(&f).await;

        f.clock.advance(Duration::hours(4));

        assert_eq!(
            f.guard.require_session(Some(&id)).await,
            Err(GuardRejection::InvalidToken)
        );
        assert!(f.sessions.get(&id).await.is_none());
        assert_eq!(
            f.guard.require_session(Some(&id)).await,
            Err(GuardRejection::NoSession)
        );
    }

    #[tokio::test]
    async fn test_tampered_token_is_rejected() {
        let f = fixture();
        let id = f.sessions.create("forged.token.value".to_string()).await;

        assert_eq!(
            f.guard.require_session(Some(&id)).await,
            Err(GuardRejection::InvalidToken)
        );
        assert!(f.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_destroyed_session_is_rejected() {
        let f = fixture();
        let id = login(&f).await;

        assert!(f.sessions.destroy(&id).await);
        assert_eq!(
            f.guard.require_session(Some(&id)).await,
            Err(GuardRejection::NoSession)
        );
    }
}
