//! Session guard middleware for protected routes.
//!
//! Both layers resolve the `qa_session` cookie through the
//! [`SessionGuard`](qcall_admin::SessionGuard) and, on success, insert the
//! admin [`Subject`](qcall_admin::Subject) into request extensions:
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use qcall_admin::Subject;
//!
//! async fn protected_handler(Extension(subject): Extension<Subject>) -> String {
//!     format!("Authenticated as {}", subject.email)
//! }
//! # let _ = protected_handler;
//! ```
//!
//! They differ in how they reject: JSON endpoints get `401` with the error
//! envelope, pages get a redirect.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use qcall_admin::{GuardRejection, Subject};

use super::{ApiError, AppState, auth::session_id_from_headers, request_id::RequestId};
use crate::logging::log_security_event;

/// Guard for JSON endpoints.
///
/// - **Success**: Injects `Subject` into request extensions → Calls next handler
/// - **No session / invalid token**: `401 {"success": false, "message": "Unauthorized"}`
///
/// The handler is never reached on rejection, so no query runs.
pub async fn require_admin_api(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (session_id, request_id) = session_context(&request);
    match check_session(&state, session_id, request_id).await {
        Ok(subject) => {
            request.extensions_mut().insert(subject);
            next.run(request).await
        }
        Err(_) => ApiError::unauthorized().into_response(),
    }
}

/// Guard for HTML pages.
///
/// - **Success**: Injects `Subject` into request extensions → Calls next handler
/// - **No session**: Redirects to `/`
/// - **Invalid token**: Redirects to `/logout`, which clears the cookie
pub async fn require_admin_page(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let (session_id, request_id) = session_context(&request);
    match check_session(&state, session_id, request_id).await {
        Ok(subject) => {
            request.extensions_mut().insert(subject);
            next.run(request).await
        }
        Err(GuardRejection::NoSession) => Redirect::to("/").into_response(),
        Err(GuardRejection::InvalidToken) => Redirect::to("/logout").into_response(),
    }
}

/// Session id from the cookies and the correlation id of `request`
fn session_context(request: &Request) -> (Option<String>, Option<RequestId>) {
    (
        session_id_from_headers(request.headers()),
        request.extensions().get::<RequestId>().cloned(),
    )
}

async fn check_session(
    state: &AppState,
    session_id: Option<String>,
    request_id: Option<RequestId>,
) -> Result<Subject, GuardRejection> {
    let result = state.guard.require_session(session_id.as_deref()).await;

    if let Err(GuardRejection::InvalidToken) = result {
        log_security_event(
            "invalid_token",
            None,
            request_id.as_ref().map(RequestId::as_str),
            "Session token rejected, session destroyed",
        );
    }

    result
}
