use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    /// `None` for placeholder accounts, which can never log in.
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
    pub groups: BTreeSet<u64>,
    pub created_at: DateTime<Utc>,
}
