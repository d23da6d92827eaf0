//! Login and logout handlers.
//!
//! A successful login stores the signed token server-side and hands the
//! browser an opaque session id in the `qa_session` cookie. The token itself
//! never leaves the server.
//!
//! ```bash
//! curl -i -X POST http://localhost:8000/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "admin@qcall.com", "password": "admin123"}'
//! ```

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, SET_COOKIE},
    },
    response::{IntoResponse, Redirect, Response},
};
use qcall_admin::AuthError;
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, AppState, request_id::RequestId};
use crate::logging::log_security_event;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "qa_session";

#[derive(Debug, Default, Deserialize)]
pub struct LoginPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Verify admin credentials and start a session.
///
/// # Request Body
///
/// ```json
/// { "email": "admin@qcall.com", "password": "admin123" }
/// ```
///
/// # Response
///
/// `200 OK` with `{"success": true}` and a `Set-Cookie: qa_session=...` header.
///
/// # Errors
///
/// - `400 Bad Request`: Email or password missing or empty, or the body is not JSON
/// - `401 Unauthorized`: Unknown email or wrong password (same message for both)
/// - `500 Internal Server Error`: Credential store unavailable
pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Response, ApiError> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Missing credentials"));
    }

    let issued = match state
        .auth_manager
        .authenticate(&payload.email, &payload.password)
        .await
    {
        Ok(issued) => issued,
        Err(e @ AuthError::InvalidCredentials) => {
            log_security_event(
                "failed_login",
                Some(&payload.email),
                Some(request_id.as_str()),
                "Invalid email or password",
            );
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, e.client_message()));
        }
        Err(e) => {
            tracing::error!(request_id = %request_id.as_str(), error = %e, "Login failed");
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.client_message(),
            ));
        }
    };

    // A fresh id on every login; any session the browser still carries is dropped.
    if let Some(previous) = session_id_from_headers(&headers) {
        state.sessions.destroy(&previous).await;
    }
    let session_id = state.sessions.create(issued.token).await;

    tracing::info!(
        request_id = %request_id.as_str(),
        email = %issued.subject.email,
        "Admin logged in"
    );

    let cookie = session_cookie(&session_id).map_err(|_| ApiError::internal())?;
    Ok((
        [(SET_COOKIE, cookie)],
        Json(json!({ "success": true })),
    )
        .into_response())
}

/// End the session and return to the login page.
///
/// Always succeeds: the session (if any) is destroyed, the cookie is cleared,
/// and the browser is sent to `/` with `303 See Other`.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(session_id) = session_id_from_headers(&headers) {
        state.sessions.destroy(&session_id).await;
    }

    (
        [(SET_COOKIE, HeaderValue::from_static(CLEAR_SESSION_COOKIE))],
        Redirect::to("/"),
    )
        .into_response()
}

const CLEAR_SESSION_COOKIE: &str = "qa_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0";

/// `Set-Cookie` value carrying `session_id`
fn session_cookie(session_id: &str) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax"
    ))
}

/// Session id from the request's `Cookie` headers, if present and non-empty
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
