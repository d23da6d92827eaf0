//! Repository trait definitions for testability and dependency injection.
//!
//! The token issuer and the query service depend on these traits rather than
//! on a MongoDB handle, so tests can swap in the in-memory [`mock`] versions.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection,
    bson::{Bson, Document, doc},
};

use super::documents::{GLOBAL_NUMBERS, SPAM_REPORTS, SpamReportDocument, USERS, UserDocument};
use super::{Database, DbError, DbResult};
use crate::auth::{ADMIN_ROLE, NewUser, User, UserId};
use crate::stats::{SpamReport, TagCount};

/// Spam-score band of a flagged number.
///
/// `min` is inclusive and `max` exclusive; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl ScoreRange {
    /// `spamScore < 40`
    pub const SAFE: ScoreRange = ScoreRange {
        min: None,
        max: Some(40),
    };

    /// `40 <= spamScore < 80`
    pub const SUSPICIOUS: ScoreRange = ScoreRange {
        min: Some(40),
        max: Some(80),
    };

    /// `spamScore >= 80`
    pub const HIGH_RISK: ScoreRange = ScoreRange {
        min: Some(80),
        max: None,
    };

    pub fn contains(&self, score: i32) -> bool {
        self.min.is_none_or(|min| score >= min) && self.max.is_none_or(|max| score < max)
    }

    fn to_filter(self) -> Document {
        let mut bounds = Document::new();
        if let Some(min) = self.min {
            bounds.insert("$gte", min);
        }
        if let Some(max) = self.max {
            bounds.insert("$lt", max);
        }
        doc! { "spamScore": bounds }
    }
}

/// Trait for the credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user with the given email whose role is `admin`
    async fn find_admin_by_email(&self, email: &str) -> DbResult<Option<User>>;

    /// Find a user with the given email regardless of role
    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>>;

    /// Count every document in `users`
    async fn count_users(&self) -> DbResult<u64>;

    /// Insert a new user and return its id
    async fn insert_user(&self, user: NewUser) -> DbResult<UserId>;

    /// Replace the password hash of the user with the given email.
    ///
    /// Returns `false` when no user matched.
    async fn update_password(&self, email: &str, password_hash: &str) -> DbResult<bool>;
}

/// Trait for the read-only report collections
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Count every document in `spamreports`
    async fn count_spam_reports(&self) -> DbResult<u64>;

    /// Newest spam reports first, at most `limit`
    async fn recent_spam_reports(&self, limit: i64) -> DbResult<Vec<SpamReport>>;

    /// Count flagged numbers whose score falls in `range`
    async fn count_flagged_numbers(&self, range: ScoreRange) -> DbResult<u64>;

    /// Report counts grouped by tag, highest first, at most `limit` groups
    async fn spam_tag_counts(&self, limit: i64) -> DbResult<Vec<TagCount>>;

    /// Round-trip to the backing store
    async fn ping(&self) -> DbResult<()>;
}

/// MongoDB implementation of [`UserRepository`] and [`ReportRepository`]
#[derive(Clone)]
pub struct MongoRepository {
    db: Database,
}

impl MongoRepository {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    fn users(&self) -> Collection<UserDocument> {
        self.db.handle().collection(USERS)
    }

    fn spam_reports(&self) -> Collection<SpamReportDocument> {
        self.db.handle().collection(SPAM_REPORTS)
    }

    fn global_numbers(&self) -> Collection<Document> {
        self.db.handle().collection(GLOBAL_NUMBERS)
    }
}

#[async_trait]
impl UserRepository for MongoRepository {
    async fn find_admin_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let found = self
            .users()
            .find_one(doc! { "email": email, "role": ADMIN_ROLE })
            .await?;
        Ok(found.map(UserDocument::into_user))
    }

    async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let found = self.users().find_one(doc! { "email": email }).await?;
        Ok(found.map(UserDocument::into_user))
    }

    async fn count_users(&self) -> DbResult<u64> {
        Ok(self.users().count_documents(doc! {}).await?)
    }

    async fn insert_user(&self, user: NewUser) -> DbResult<UserId> {
        let result = self.users().insert_one(UserDocument::from(user)).await?;
        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(oid.to_hex()),
            other => Err(DbError::Malformed {
                collection: USERS,
                reason: format!("unexpected inserted id {other}"),
            }),
        }
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> DbResult<bool> {
        let result = self
            .users()
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "password": password_hash } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}

#[async_trait]
impl ReportRepository for MongoRepository {
    async fn count_spam_reports(&self) -> DbResult<u64> {
        Ok(self.spam_reports().count_documents(doc! {}).await?)
    }

    async fn recent_spam_reports(&self, limit: i64) -> DbResult<Vec<SpamReport>> {
        let documents: Vec<SpamReportDocument> = self
            .spam_reports()
            .find(doc! {})
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .await?
            .try_collect()
            .await?;

        documents
            .into_iter()
            .map(|document| {
                document.into_report().ok_or_else(|| DbError::Malformed {
                    collection: SPAM_REPORTS,
                    reason: "createdAt out of range".to_string(),
                })
            })
            .collect()
    }

    async fn count_flagged_numbers(&self, range: ScoreRange) -> DbResult<u64> {
        Ok(self
            .global_numbers()
            .count_documents(range.to_filter())
            .await?)
    }

    async fn spam_tag_counts(&self, limit: i64) -> DbResult<Vec<TagCount>> {
        let pipeline = [
            doc! { "$group": { "_id": "$tag", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
            doc! { "$limit": limit },
        ];

        let groups: Vec<Document> = self
            .db
            .handle()
            .collection::<Document>(SPAM_REPORTS)
            .aggregate(pipeline)
            .await?
            .try_collect()
            .await?;

        groups.iter().map(tag_count_from_group).collect()
    }

    async fn ping(&self) -> DbResult<()> {
        self.db.health_check().await
    }
}

fn tag_count_from_group(group: &Document) -> DbResult<TagCount> {
    let tag = match group.get("_id") {
        Some(Bson::String(tag)) => Some(tag.clone()),
        _ => None,
    };
    let count = match group.get("count") {
        Some(Bson::Int32(n)) => u64::try_from(*n).unwrap_or_default(),
        Some(Bson::Int64(n)) => u64::try_from(*n).unwrap_or_default(),
        other => {
            return Err(DbError::Malformed {
                collection: SPAM_REPORTS,
                reason: format!("group count was {other:?}"),
            });
        }
    };
    Ok(TagCount { tag, count })
}

/// In-memory repositories for tests.
///
/// Every trait call bumps a shared counter so tests can assert that a code
/// path never reached the database.
#[cfg(any(test, feature = "test-util"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// A flagged number as stored in `globalnumbers`
    #[derive(Debug, Clone)]
    pub struct FlaggedNumber {
        pub phone_number: String,
        pub spam_score: i32,
    }

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<Vec<User>>,
        next_id: Mutex<u64>,
        calls: Arc<AtomicUsize>,
    }

    impl MockUserRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_user(self, user: User) -> Self {
            self.users.lock().unwrap().push(user);
            self
        }

        /// Number of repository calls made so far
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_admin_by_email(&self, email: &str) -> DbResult<Option<User>> {
            self.record();
            let users = self.users.lock().unwrap();
            Ok(users
                .iter()
                .find(|u| u.email == email && u.role == ADMIN_ROLE)
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
            self.record();
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn count_users(&self) -> DbResult<u64> {
            self.record();
            Ok(self.users.lock().unwrap().len() as u64)
        }

        async fn insert_user(&self, user: NewUser) -> DbResult<UserId> {
            self.record();
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let id = format!("{:024x}", *next_id);

            self.users.lock().unwrap().push(User {
                id: id.clone(),
                first_name: user.first_name,
                last_name: user.last_name,
                email: user.email,
                password_hash: user.password_hash,
                role: user.role,
                created_at: Some(chrono::Utc::now()),
            });
            Ok(id)
        }

        async fn update_password(&self, email: &str, password_hash: &str) -> DbResult<bool> {
            self.record();
            let mut users = self.users.lock().unwrap();
            match users.iter_mut().find(|u| u.email == email) {
                Some(user) => {
                    user.password_hash = password_hash.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }
    }

    #[derive(Default)]
    pub struct MockReportRepository {
        reports: Mutex<Vec<SpamReport>>,
        numbers: Mutex<Vec<FlaggedNumber>>,
        calls: Arc<AtomicUsize>,
        unavailable: bool,
    }

    impl MockReportRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_report(self, report: SpamReport) -> Self {
            self.reports.lock().unwrap().push(report);
            self
        }

        pub fn with_number(self, phone_number: &str, spam_score: i32) -> Self {
            self.numbers.lock().unwrap().push(FlaggedNumber {
                phone_number: phone_number.to_string(),
                spam_score,
            });
            self
        }

        /// Make every query fail as if the server were down
        pub fn unavailable(mut self) -> Self {
            self.unavailable = true;
            self
        }

        /// Number of repository calls made so far
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn record(&self) -> DbResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_available()
        }

        fn check_available(&self) -> DbResult<()> {
            if self.unavailable {
                return Err(DbError::ConnectionFailure(
                    "mock server unavailable".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl ReportRepository for MockReportRepository {
        async fn count_spam_reports(&self) -> DbResult<u64> {
            self.record()?;
            Ok(self.reports.lock().unwrap().len() as u64)
        }

        async fn recent_spam_reports(&self, limit: i64) -> DbResult<Vec<SpamReport>> {
            self.record()?;
            let mut reports = self.reports.lock().unwrap().clone();
            reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            reports.truncate(usize::try_from(limit).unwrap_or_default());
            Ok(reports)
        }

        async fn count_flagged_numbers(&self, range: ScoreRange) -> DbResult<u64> {
            self.record()?;
            let numbers = self.numbers.lock().unwrap();
            Ok(numbers
                .iter()
                .filter(|n| range.contains(n.spam_score))
                .count() as u64)
        }

        async fn spam_tag_counts(&self, limit: i64) -> DbResult<Vec<TagCount>> {
            self.record()?;
            let mut groups: HashMap<Option<String>, u64> = HashMap::new();
            for report in self.reports.lock().unwrap().iter() {
                *groups.entry(report.tag.clone()).or_default() += 1;
            }

            let mut counts: Vec<TagCount> = groups
                .into_iter()
                .map(|(tag, count)| TagCount { tag, count })
                .collect();
            counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
            counts.truncate(usize::try_from(limit).unwrap_or_default());
            Ok(counts)
        }

        async fn ping(&self) -> DbResult<()> {
            self.check_available()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use chrono::{Duration, Utc};

        fn report(tag: Option<&str>, minutes_ago: i64) -> SpamReport {
            SpamReport {
                phone_number: format!("+9100000{minutes_ago:05}"),
                tag: tag.map(str::to_string),
                created_at: Utc::now() - Duration::minutes(minutes_ago),
            }
        }

        #[tokio::test]
        async fn test_mock_insert_and_find() {
            let repo = MockUserRepository::new();

            let id = repo
                .insert_user(NewUser {
                    first_name: "Super".to_string(),
                    last_name: "Admin".to_string(),
                    email: "admin@qcall.com".to_string(),
                    password_hash: "hash".to_string(),
                    role: ADMIN_ROLE.to_string(),
                })
                .await
                .unwrap();
            assert_eq!(id.len(), 24);

            let found = repo.find_admin_by_email("admin@qcall.com").await.unwrap();
            assert_eq!(found.unwrap().id, id);
            assert_eq!(repo.calls(), 2);
        }

        #[tokio::test]
        async fn test_mock_admin_lookup_ignores_other_roles() {
            let repo = MockUserRepository::new();
            repo.insert_user(NewUser {
                first_name: "App".to_string(),
                last_name: "User".to_string(),
                email: "user@qcall.com".to_string(),
                password_hash: "hash".to_string(),
                role: "user".to_string(),
            })
            .await
            .unwrap();

            assert!(repo.find_admin_by_email("user@qcall.com").await.unwrap().is_none());
            assert!(repo.find_by_email("user@qcall.com").await.unwrap().is_some());
        }

        #[tokio::test]
        async fn test_mock_update_password() {
            let repo = MockUserRepository::new();
            assert!(!repo.update_password("nobody@qcall.com", "x").await.unwrap());
        }

        #[tokio::test]
        async fn test_mock_recent_reports_are_newest_first() {
            let repo = MockReportRepository::new()
                .with_report(report(Some("Scam"), 30))
                .with_report(report(None, 10))
                .with_report(report(Some("Spam"), 20));

            let recent = repo.recent_spam_reports(2).await.unwrap();
            assert_eq!(recent.len(), 2);
            assert!(recent[0].created_at > recent[1].created_at);
        }

        #[tokio::test]
        async fn test_mock_score_ranges() {
            let repo = MockReportRepository::new()
                .with_number("+911", 10)
                .with_number("+912", 40)
                .with_number("+913", 79)
                .with_number("+914", 80)
                .with_number("+915", 100);

            assert_eq!(repo.count_flagged_numbers(ScoreRange::SAFE).await.unwrap(), 1);
            assert_eq!(repo.count_flagged_numbers(ScoreRange::SUSPICIOUS).await.unwrap(), 2);
            assert_eq!(repo.count_flagged_numbers(ScoreRange::HIGH_RISK).await.unwrap(), 2);
        }

        #[tokio::test]
        async fn test_mock_unavailable_fails_every_query() {
            let repo = MockReportRepository::new().unavailable();

            assert!(matches!(
                repo.count_spam_reports().await,
                Err(DbError::ConnectionFailure(_))
            ));
            assert!(repo.ping().await.is_err());
            assert_eq!(repo.calls(), 1);
        }
    }
}
