//! Static HTML pages.
//!
//! Both pages are compiled into the binary; the dashboard fetches its data
//! from `/stats` with the session cookie.

use axum::{extract::Extension, response::Html};
use qcall_admin::Subject;

const LOGIN_PAGE: &str = include_str!("../../static/index.html");
const DASHBOARD_PAGE: &str = include_str!("../../static/dashboard.html");

/// `GET /`
pub async fn login_page() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// `GET /dashboard`, behind [`require_admin_page`](super::middleware::require_admin_page)
pub async fn dashboard_page(Extension(subject): Extension<Subject>) -> Html<&'static str> {
    tracing::debug!(admin = %subject.email, "Dashboard opened");
    Html(DASHBOARD_PAGE)
}
