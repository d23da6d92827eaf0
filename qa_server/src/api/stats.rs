//! Dashboard data endpoint.
//!
//! `GET /stats?action=<name>` runs behind [`require_admin_api`](super::middleware::require_admin_api).

use axum::{
    extract::{Extension, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::Response,
};
use qcall_admin::{Subject, db::DbError, stats::MAX_LISTING};
use serde::Deserialize;
use std::str::FromStr;

use super::{ApiError, AppState, success};

/// Query selecting what the dashboard asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsAction {
    /// Headline counters
    Stats,
    /// Latest spam reports
    RecentSpam,
    /// Flagged numbers per risk band
    Risk,
    /// Most frequent report tags
    Categories,
}

impl FromStr for StatsAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stats" => Ok(Self::Stats),
            "recent_spam" => Ok(Self::RecentSpam),
            "risk" => Ok(Self::Risk),
            "categories" => Ok(Self::Categories),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub action: Option<String>,
}

/// Serve one dashboard query.
///
/// # Query Parameters
///
/// - `action`: `stats` (default), `recent_spam`, `risk` or `categories`
///
/// # Response
///
/// ```json
/// { "success": true, "data": { "userCount": 3, "spamCount": 10, "highRiskCount": 2 } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unrecognized action or unparsable query string
/// - `500 Internal Server Error`: Query failed
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(subject): Extension<Subject>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| {
        tracing::debug!(error = %e, "Rejected stats query string");
        ApiError::new(StatusCode::BAD_REQUEST, "Unknown action")
    })?;

    let action = query
        .action
        .as_deref()
        .unwrap_or("stats")
        .parse::<StatsAction>()
        .map_err(|_| ApiError::new(StatusCode::BAD_REQUEST, "Unknown action"))?;

    tracing::debug!(?action, admin = %subject.email, "Dashboard query");

    let service = &state.stats_service;
    let response = match action {
        StatsAction::Stats => success(service.get_stats().await.map_err(query_failed)?),
        StatsAction::RecentSpam => success(
            service
                .get_recent_spam(MAX_LISTING)
                .await
                .map_err(query_failed)?,
        ),
        StatsAction::Risk => success(
            service
                .get_risk_distribution()
                .await
                .map_err(query_failed)?,
        ),
        StatsAction::Categories => success(
            service
                .get_top_categories(MAX_LISTING)
                .await
                .map_err(query_failed)?,
        ),
    };

    Ok(response)
}

fn query_failed(e: DbError) -> ApiError {
    tracing::error!(error = %e, "Dashboard query failed");
    ApiError::internal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!("stats".parse(), Ok(StatsAction::Stats));
        assert_eq!("recent_spam".parse(), Ok(StatsAction::RecentSpam));
        assert_eq!("risk".parse(), Ok(StatsAction::Risk));
        assert_eq!("categories".parse(), Ok(StatsAction::Categories));
    }

    #[test]
    fn test_unknown_actions_rejected() {
        assert!("".parse::<StatsAction>().is_err());
        assert!("STATS".parse::<StatsAction>().is_err());
        assert!("drop_users".parse::<StatsAction>().is_err());
    }
}
