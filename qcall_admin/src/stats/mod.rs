//! Dashboard query service.
//!
//! All operations are read-only and assume the caller already passed the
//! session guard.

pub mod models;
pub mod service;

pub use models::{
    CategoryCount, DashboardStats, RecentSpam, RiskDistribution, SpamReport, TagCount,
};
pub use service::{MAX_LISTING, StatsService};
