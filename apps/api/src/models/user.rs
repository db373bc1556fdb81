use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub id: Uuid,
    pub activity: String,
    pub timestamp: DateTime<Utc>,
}

/// A registered account. Experience, portfolio and activity lists are owned
/// exclusively by the user and persisted with it as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub portfolio: Vec<PortfolioItem>,
    /// Newest first.
    pub recent_activity: Vec<RecentActivity>,
    pub rating: f64,
    pub completed_jobs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(full_name: &str, email: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email),
            full_name: full_name.trim().to_string(),
            password_hash,
            profile_image: None,
            bio: String::new(),
            skills: Vec::new(),
            experience: Vec::new(),
            portfolio: Vec::new(),
            recent_activity: Vec::new(),
            rating: 0.0,
            completed_jobs: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Emails are stored and looked up trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: Json<Vec<Experience>>,
    pub portfolio: Json<Vec<PortfolioItem>>,
    pub recent_activity: Json<Vec<RecentActivity>>,
    pub rating: f64,
    pub completed_jobs: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            password_hash: row.password_hash,
            profile_image: row.profile_image,
            bio: row.bio,
            skills: row.skills,
            experience: row.experience.0,
            portfolio: row.portfolio.0,
            recent_activity: row.recent_activity.0,
            rating: row.rating,
            completed_jobs: row.completed_jobs,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub profile_image: Option<String>,
    pub bio: String,
    pub skills: Vec<String>,
    pub experience: Vec<Experience>,
    pub portfolio: Vec<PortfolioItem>,
    pub recent_activity: Vec<RecentActivity>,
    pub rating: f64,
    pub completed_jobs: i32,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            profile_image: user.profile_image,
            bio: user.bio,
            skills: user.skills,
            experience: user.experience,
            portfolio: user.portfolio,
            recent_activity: user.recent_activity,
            rating: user.rating,
            completed_jobs: user.completed_jobs,
        }
    }
}
