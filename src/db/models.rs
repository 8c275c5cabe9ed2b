// Database model structs

use chrono::{DateTime, Utc};

#[derive(Clone, sqlx::FromRow)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub status: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        matches!(self.role.as_str(), "super_admin" | "admin" | "moderator" | "viewer")
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == "super_admin"
    }
}

#[derive(Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub university: String,
    pub year: Option<i64>,
    pub role: String,
    pub status: String,
    pub subscription_plan: Option<String>,
    pub subscription_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct UserStatistics {
    pub total: i64,
    pub active: i64,
    pub pending: i64,
    pub blocked: i64,
}

#[derive(Clone, sqlx::FromRow)]
pub struct QuestionRow {
    pub id: i64,
    pub question_text: String,
    pub module_name: String,
    pub course_name: String,
    pub year: i64,
    pub difficulty: String,
    pub explanation: String,
    pub is_active: bool,
}

#[derive(Clone, sqlx::FromRow)]
pub struct QuestionOptionRow {
    pub id: i64,
    pub question_id: i64,
    pub option_letter: String,
    pub option_text: String,
    pub is_correct: bool,
}

/// A question with its options, as loaded for a quiz session or for the
/// admin editor.
#[derive(Clone)]
pub struct QuestionWithOptions {
    pub question: QuestionRow,
    pub options: Vec<QuestionOptionRow>,
}

#[derive(Clone, sqlx::FromRow)]
pub struct AccessCodeRow {
    pub id: i64,
    pub code: String,
    pub package: String,
    pub status: String,
    pub used_by: Option<i64>,
    pub used_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
pub struct CodeStatistics {
    pub total: i64,
    pub unused: i64,
    pub used: i64,
    pub expired: i64,
}

#[derive(Clone, sqlx::FromRow)]
pub struct AdminAccountRow {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub permissions: String,
    pub created_at: DateTime<Utc>,
}

impl AdminAccountRow {
    /// Stored permissions, decoded from the JSON column. A super_admin is
    /// synthesized as the full catalog at read time, never stored.
    pub fn permission_list(&self) -> Vec<String> {
        if self.role == "super_admin" {
            return crate::names::PERMISSIONS
                .iter()
                .map(|(key, _)| (*key).to_string())
                .collect();
        }
        serde_json::from_str(&self.permissions).unwrap_or_default()
    }
}

#[derive(Clone, sqlx::FromRow)]
pub struct CalendarEventRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub priority: String,
    pub is_completed: bool,
    pub reminder_enabled: bool,
    pub tags: String,
}

impl CalendarEventRow {
    pub fn tag_list(&self) -> Vec<String> {
        serde_json::from_str(&self.tags).unwrap_or_default()
    }
}

#[derive(Clone, sqlx::FromRow)]
pub struct QuizAttemptRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub score: i64,
    pub questions_count: i64,
    pub time_spent_seconds: i64,
    pub taken_at: DateTime<Utc>,
}

/// One page of a server-side paginated list, with the metadata the
/// pagination controls need.
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            1
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }
}
