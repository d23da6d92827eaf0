//! Dashboard data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Label shown for reports that were filed without a tag
pub const DEFAULT_TAG: &str = "Spam";

/// Label for the tag group of untagged reports
pub const UNTAGGED_CATEGORY: &str = "Other";

/// A spam report as stored in `spamreports`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpamReport {
    pub phone_number: String,
    pub tag: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Raw tag group returned by the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: Option<String>,
    pub count: u64,
}

/// Headline counters of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub user_count: u64,
    pub spam_count: u64,
    pub high_risk_count: u64,
}

/// One row of the recent spam table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentSpam {
    pub phone_number: String,
    pub tag: String,
    pub date: String,
}

/// Flagged numbers per risk band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub safe: u64,
    pub suspicious: u64,
    pub dangerous: u64,
}

/// Report count for one tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub tag: String,
    pub count: u64,
}
