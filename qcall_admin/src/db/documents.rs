//! BSON shapes of the stored collections.
//!
//! Field names follow the camelCase keys written by the mobile backend and the
//! seeder; the password hash is stored under `password`.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::auth::{NewUser, User};
use crate::stats::SpamReport;

pub const USERS: &str = "users";
pub const SPAM_REPORTS: &str = "spamreports";
pub const GLOBAL_NUMBERS: &str = "globalnumbers";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "password", default)]
    pub password_hash: String,
    #[serde(default)]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
}

impl UserDocument {
    pub fn into_user(self) -> User {
        User {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role,
            created_at: self.created_at.and_then(to_chrono),
        }
    }
}

impl From<NewUser> for UserDocument {
    fn from(user: NewUser) -> Self {
        Self {
            id: None,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Some(bson::DateTime::now()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpamReportDocument {
    pub phone_number: String,
    #[serde(default)]
    pub tag: Option<String>,
    pub created_at: bson::DateTime,
}

impl SpamReportDocument {
    pub fn into_report(self) -> Option<SpamReport> {
        Some(SpamReport {
            phone_number: self.phone_number,
            tag: self.tag,
            created_at: to_chrono(self.created_at)?,
        })
    }
}

fn to_chrono(value: bson::DateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value.timestamp_millis())
}
