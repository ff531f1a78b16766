pub mod api;
pub mod db;
pub mod logging;
pub mod matching;
pub mod scheduling;

use chrono::{DateTime, Utc};

use scheduling::status::AppointmentStatus;

// Commonly used data models for the matching and scheduling functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub skills_to_teach: Vec<String>,
    pub skills_to_learn: Vec<String>,
    /// Mean rating over completed, rated sessions as teacher, one decimal.
    /// Written only by the rating aggregation in `db::appointments`.
    pub rating: Option<f64>,
    pub total_sessions: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub teacher_id: i64,
    pub learner_id: i64,
    pub skill: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub rating: Option<i32>,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Slim view of one side of an appointment, resolved for API responses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartySummary {
    pub id: i64,
    pub name: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub teacher: PartySummary,
    pub learner: PartySummary,
}
