//! Server-side sessions and the guard that checks them.
//!
//! The browser only ever holds an opaque session id. The signed token lives
//! in the [`SessionStore`] and is re-verified by the [`SessionGuard`] on each
//! protected request.

pub mod guard;
pub mod store;

pub use guard::{GuardRejection, SessionGuard};
pub use store::{DEFAULT_SESSION_TTL_SECS, MAX_SESSION_TTL_SECS, SessionId, SessionStore};
