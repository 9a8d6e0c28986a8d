//! Account models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user. The password hash never leaves the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A logged-in session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
}

/// Email and password as submitted by a client
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
