use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_len_max, InvalidRequest};
use crate::scheduling::status::AppointmentStatus;
use crate::{AppointmentDetail, PartySummary};

pub const MIN_DURATION_MINUTES: i32 = 15;
pub const MAX_DURATION_MINUTES: i32 = 480;
pub const DEFAULT_DURATION_MINUTES: i32 = 60;

/// Booking request submitted by the learner.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub teacher_id: i64,
    pub skill: String,
    pub title: String,
    pub description: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub meeting_link: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.skill.trim().is_empty() {
            return Err(InvalidRequest("Skill is required".into()));
        }
        if self.title.trim().is_empty() {
            return Err(InvalidRequest("Title is required".into()));
        }
        if let Some(duration) = self.duration_minutes {
            if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
                return Err(InvalidRequest(format!(
                    "Duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"
                )));
            }
        }
        require_len_max(self.description.as_deref(), 500, "Description")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl UpdateStatusRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        require_len_max(self.notes.as_deref(), 1000, "Notes")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub rating: i32,
    pub feedback: Option<String>,
}

impl FeedbackRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if !(1..=5).contains(&self.rating) {
            return Err(InvalidRequest("Rating must be between 1 and 5".into()));
        }
        require_len_max(self.feedback.as_deref(), 500, "Feedback")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentPartyDto {
    pub id: i64,
    pub name: String,
    pub skills: Vec<String>,
}

impl From<PartySummary> for AppointmentPartyDto {
    fn from(party: PartySummary) -> Self {
        Self {
            id: party.id,
            name: party.name,
            skills: party.skills,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentResponse {
    pub id: i64,
    pub teacher: AppointmentPartyDto,
    pub learner: AppointmentPartyDto,
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

impl From<AppointmentDetail> for AppointmentResponse {
    fn from(detail: AppointmentDetail) -> Self {
        let appointment = detail.appointment;
        Self {
            id: appointment.id,
            teacher: detail.teacher.into(),
            learner: detail.learner.into(),
            skill: appointment.skill,
            title: appointment.title,
            description: appointment.description,
            scheduled_at: appointment.scheduled_at,
            duration_minutes: appointment.duration_minutes,
            status: appointment.status,
            meeting_link: appointment.meeting_link,
            notes: appointment.notes,
            rating: appointment.rating,
            feedback: appointment.feedback,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            teacher_id: 2,
            skill: "Rust".into(),
            title: "Ownership walkthrough".into(),
            description: None,
            scheduled_at: Utc::now(),
            duration_minutes: None,
            meeting_link: None,
        }
    }

    #[test]
    fn default_duration_is_left_to_the_store() {
        assert_eq!(booking().validate(), Ok(()));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut req = booking();
        req.title = "   ".into();
        assert!(req.validate().is_err());
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        for (duration, ok) in [(14, false), (15, true), (480, true), (481, false)] {
            let mut req = booking();
            req.duration_minutes = Some(duration);
            assert_eq!(req.validate().is_ok(), ok, "duration {duration}");
        }
    }

    #[test]
    fn oversized_description_is_rejected() {
        let mut req = booking();
        req.description = Some("d".repeat(501));
        assert!(req.validate().is_err());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let req = FeedbackRequest {
                rating,
                feedback: None,
            };
            assert_eq!(req.validate().is_ok(), ok, "rating {rating}");
        }
    }

    #[test]
    fn oversized_feedback_and_notes_are_rejected() {
        let feedback = FeedbackRequest {
            rating: 4,
            feedback: Some("f".repeat(501)),
        };
        assert!(feedback.validate().is_err());

        let status = UpdateStatusRequest {
            status: AppointmentStatus::Cancelled,
            notes: Some("n".repeat(1001)),
        };
        assert!(status.validate().is_err());
    }
}
