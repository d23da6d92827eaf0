//! Read-only queries behind the dashboard.

use std::sync::Arc;

use super::models::{
    CategoryCount, DEFAULT_TAG, DashboardStats, RecentSpam, RiskDistribution, SpamReport,
    UNTAGGED_CATEGORY,
};
use crate::db::{DbResult, ReportRepository, ScoreRange, UserRepository};

/// Largest number of rows any listing returns
pub const MAX_LISTING: usize = 5;

/// Display format for report dates, e.g. `Jan 05, 2025`
const DATE_FORMAT: &str = "%b %d, %Y";

/// Dashboard query service
#[derive(Clone)]
pub struct StatsService {
    users: Arc<dyn UserRepository>,
    reports: Arc<dyn ReportRepository>,
}

impl StatsService {
    pub fn new(users: Arc<dyn UserRepository>, reports: Arc<dyn ReportRepository>) -> Self {
        Self { users, reports }
    }

    /// Total users, total spam reports and high-risk numbers.
    ///
    /// The three counts are independent queries issued concurrently.
    pub async fn get_stats(&self) -> DbResult<DashboardStats> {
        let (user_count, spam_count, high_risk_count) = tokio::try_join!(
            self.users.count_users(),
            self.reports.count_spam_reports(),
            self.reports.count_flagged_numbers(ScoreRange::HIGH_RISK),
        )?;

        Ok(DashboardStats {
            user_count,
            spam_count,
            high_risk_count,
        })
    }

    /// Most recent spam reports, newest first.
    ///
    /// `limit` is clamped to [`MAX_LISTING`].
    pub async fn get_recent_spam(&self, limit: usize) -> DbResult<Vec<RecentSpam>> {
        let limit = limit.min(MAX_LISTING);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let reports = self.reports.recent_spam_reports(limit as i64).await?;
        Ok(reports.into_iter().take(limit).map(recent_spam_row).collect())
    }

    /// Flagged numbers split into safe (< 40), suspicious (40..80) and dangerous (>= 80)
    pub async fn get_risk_distribution(&self) -> DbResult<RiskDistribution> {
        let (safe, suspicious, dangerous) = tokio::try_join!(
            self.reports.count_flagged_numbers(ScoreRange::SAFE),
            self.reports.count_flagged_numbers(ScoreRange::SUSPICIOUS),
            self.reports.count_flagged_numbers(ScoreRange::HIGH_RISK),
        )?;

        Ok(RiskDistribution {
            safe,
            suspicious,
            dangerous,
        })
    }

    /// Most frequent report tags, highest count first; `limit` is clamped to [`MAX_LISTING`]
    pub async fn get_top_categories(&self, limit: usize) -> DbResult<Vec<CategoryCount>> {
        let limit = limit.min(MAX_LISTING);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let groups = self.reports.spam_tag_counts(limit as i64).await?;
        Ok(groups
            .into_iter()
            .take(limit)
            .map(|group| CategoryCount {
                tag: group.tag.unwrap_or_else(|| UNTAGGED_CATEGORY.to_string()),
                count: group.count,
            })
            .collect())
    }

    /// Check the backing store answers
    pub async fn health_check(&self) -> DbResult<()> {
        self.reports.ping().await
    }
}

fn recent_spam_row(report: SpamReport) -> RecentSpam {
    RecentSpam {
        phone_number: report.phone_number,
        tag: report
            .tag
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| DEFAULT_TAG.to_string()),
        date: report.created_at.format(DATE_FORMAT).to_string(),
    }
}
