use std::str::FromStr;

use chrono::{DateTime, Utc};
use deadpool_postgres::{GenericClient, PoolError};
use serde::Deserialize;
use thiserror::Error;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::api::appointment::{
    CreateAppointmentRequest, FeedbackRequest, UpdateStatusRequest, DEFAULT_DURATION_MINUTES,
};
use crate::db::PgPool;
use crate::matching::skills::teacher_offers;
use crate::scheduling::policy::{authorize_feedback, authorize_status_change, PolicyError};
use crate::scheduling::rating::aggregate_ratings;
use crate::scheduling::status::AppointmentStatus;
use crate::{Appointment, AppointmentDetail, PartySummary};

#[derive(Debug, Error)]
pub enum AppointmentStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("appointment not found: {0}")]
    NotFound(i64),
    #[error("teacher not found: {0}")]
    TeacherNotFound(i64),
    #[error("users cannot book a session with themselves")]
    SelfBooking,
    #[error("teacher {teacher_id} does not offer {skill}")]
    SkillNotOffered { teacher_id: i64, skill: String },
    #[error("teacher {teacher_id} already has a booking at {scheduled_at}")]
    SlotTaken {
        teacher_id: i64,
        scheduled_at: DateTime<Utc>,
    },
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error("appointment {id} carries an unknown status: {value}")]
    CorruptStatus { id: i64, value: String },
}

/// Narrow a user's appointment listing to one side of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleFilter {
    Teaching,
    Learning,
}

impl RoleFilter {
    fn as_str(&self) -> &'static str {
        match self {
            RoleFilter::Teaching => "teaching",
            RoleFilter::Learning => "learning",
        }
    }
}

const DETAIL_QUERY: &str = "SELECT a.id, a.teacher_id, a.learner_id, a.skill, a.title, \
            a.description, a.scheduled_at, a.duration_minutes, a.status, a.meeting_link, \
            a.notes, a.rating, a.feedback, a.created_at, a.updated_at, \
            t.name AS teacher_name, t.skills_to_teach AS teacher_skills, \
            l.name AS learner_name, l.skills_to_learn AS learner_skills \
     FROM swap.appointments a \
     JOIN swap.users t ON t.id = a.teacher_id \
     JOIN swap.users l ON l.id = a.learner_id";

fn detail_from_row(row: &Row) -> Result<AppointmentDetail, AppointmentStorageError> {
    let id: i64 = row.get("id");
    let raw_status: String = row.get("status");
    let status = AppointmentStatus::from_str(&raw_status).map_err(|_| {
        AppointmentStorageError::CorruptStatus {
            id,
            value: raw_status.clone(),
        }
    })?;

    Ok(AppointmentDetail {
        appointment: Appointment {
            id,
            teacher_id: row.get("teacher_id"),
            learner_id: row.get("learner_id"),
            skill: row.get("skill"),
            title: row.get("title"),
            description: row.get("description"),
            scheduled_at: row.get("scheduled_at"),
            duration_minutes: row.get("duration_minutes"),
            status,
            meeting_link: row.get("meeting_link"),
            notes: row.get("notes"),
            rating: row.get("rating"),
            feedback: row.get("feedback"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        },
        teacher: PartySummary {
            id: row.get("teacher_id"),
            name: row.get("teacher_name"),
            skills: row.get("teacher_skills"),
        },
        learner: PartySummary {
            id: row.get("learner_id"),
            name: row.get("learner_name"),
            skills: row.get("learner_skills"),
        },
    })
}

async fn fetch_detail(
    client: &impl GenericClient,
    appointment_id: i64,
) -> Result<AppointmentDetail, AppointmentStorageError> {
    let sql = format!("{DETAIL_QUERY} WHERE a.id = $1");
    let row = client
        .query_opt(sql.as_str(), &[&appointment_id])
        .await?
        .ok_or(AppointmentStorageError::NotFound(appointment_id))?;

    detail_from_row(&row)
}

#[instrument(skip(pool))]
pub async fn fetch_appointment(
    pool: &PgPool,
    appointment_id: i64,
) -> Result<AppointmentDetail, AppointmentStorageError> {
    let client = pool.get().await?;
    fetch_detail(&client, appointment_id).await
}

fn map_insert_error(
    err: PgError,
    teacher_id: i64,
    scheduled_at: DateTime<Utc>,
) -> AppointmentStorageError {
    // The partial unique index over live bookings backs the in-transaction
    // conflict check, so a concurrent create surfaces here.
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        AppointmentStorageError::SlotTaken {
            teacher_id,
            scheduled_at,
        }
    } else {
        AppointmentStorageError::Postgres(err)
    }
}

/// Book a session with a teacher. The booking lands as `pending`; the
/// conflict check and the insert run in one transaction, with the unique
/// index as backstop against concurrent creates for the same slot.
#[instrument(skip(pool, request), fields(teacher_id = request.teacher_id))]
pub async fn create_appointment(
    pool: &PgPool,
    learner_id: i64,
    request: &CreateAppointmentRequest,
) -> Result<AppointmentDetail, AppointmentStorageError> {
    if request.teacher_id == learner_id {
        return Err(AppointmentStorageError::SelfBooking);
    }

    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let teacher_skills: Vec<String> = tx
        .query_opt(
            "SELECT skills_to_teach FROM swap.users WHERE id = $1",
            &[&request.teacher_id],
        )
        .await?
        .ok_or(AppointmentStorageError::TeacherNotFound(request.teacher_id))?
        .get("skills_to_teach");

    if !teacher_offers(&teacher_skills, &request.skill) {
        return Err(AppointmentStorageError::SkillNotOffered {
            teacher_id: request.teacher_id,
            skill: request.skill.clone(),
        });
    }

    // Exact-timestamp clash only; overlapping intervals are not flagged.
    let clash = tx
        .query_opt(
            "SELECT 1 FROM swap.appointments
             WHERE teacher_id = $1 AND scheduled_at = $2
               AND status IN ('pending', 'accepted')
             FOR UPDATE",
            &[&request.teacher_id, &request.scheduled_at],
        )
        .await?;

    if clash.is_some() {
        return Err(AppointmentStorageError::SlotTaken {
            teacher_id: request.teacher_id,
            scheduled_at: request.scheduled_at,
        });
    }

    let duration = request
        .duration_minutes
        .unwrap_or(DEFAULT_DURATION_MINUTES);

    let inserted = tx
        .query_one(
            "INSERT INTO swap.appointments (
                teacher_id, learner_id, skill, title, description,
                scheduled_at, duration_minutes, status, meeting_link
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', $8)
             RETURNING id",
            &[
                &request.teacher_id,
                &learner_id,
                &request.skill,
                &request.title,
                &request.description,
                &request.scheduled_at,
                &duration,
                &request.meeting_link,
            ],
        )
        .await
        .map_err(|err| map_insert_error(err, request.teacher_id, request.scheduled_at))?;

    let appointment_id: i64 = inserted.get("id");
    let detail = fetch_detail(&tx, appointment_id).await?;
    tx.commit().await?;

    Ok(detail)
}

/// Apply a status change after running it through the role policy. Only
/// roles are checked, not the source status.
#[instrument(skip(pool, request))]
pub async fn update_status(
    pool: &PgPool,
    appointment_id: i64,
    requester: i64,
    request: &UpdateStatusRequest,
) -> Result<AppointmentDetail, AppointmentStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let row = tx
        .query_opt(
            "SELECT teacher_id, learner_id FROM swap.appointments WHERE id = $1 FOR UPDATE",
            &[&appointment_id],
        )
        .await?
        .ok_or(AppointmentStorageError::NotFound(appointment_id))?;

    let teacher_id: i64 = row.get("teacher_id");
    let learner_id: i64 = row.get("learner_id");
    authorize_status_change(teacher_id, learner_id, requester, request.status)?;

    tx.execute(
        "UPDATE swap.appointments
         SET status = $2, notes = COALESCE($3, notes), updated_at = NOW()
         WHERE id = $1",
        &[&appointment_id, &request.status.as_str(), &request.notes],
    )
    .await?;

    let detail = fetch_detail(&tx, appointment_id).await?;
    tx.commit().await?;

    Ok(detail)
}

/// Record the learner's rating and feedback on a completed session, then
/// refresh the teacher's aggregate rating in the same transaction.
/// Re-submission overwrites the previous values.
#[instrument(skip(pool, request))]
pub async fn submit_feedback(
    pool: &PgPool,
    appointment_id: i64,
    requester: i64,
    request: &FeedbackRequest,
) -> Result<AppointmentDetail, AppointmentStorageError> {
    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let row = tx
        .query_opt(
            "SELECT teacher_id, learner_id, status FROM swap.appointments
             WHERE id = $1 FOR UPDATE",
            &[&appointment_id],
        )
        .await?
        .ok_or(AppointmentStorageError::NotFound(appointment_id))?;

    let teacher_id: i64 = row.get("teacher_id");
    let learner_id: i64 = row.get("learner_id");
    let raw_status: String = row.get("status");
    let status = AppointmentStatus::from_str(&raw_status).map_err(|_| {
        AppointmentStorageError::CorruptStatus {
            id: appointment_id,
            value: raw_status.clone(),
        }
    })?;

    authorize_feedback(learner_id, requester, status)?;

    tx.execute(
        "UPDATE swap.appointments
         SET rating = $2, feedback = $3, updated_at = NOW()
         WHERE id = $1",
        &[&appointment_id, &request.rating, &request.feedback],
    )
    .await?;

    recompute_teacher_rating(&tx, teacher_id).await?;

    let detail = fetch_detail(&tx, appointment_id).await?;
    tx.commit().await?;

    Ok(detail)
}

/// Recompute a teacher's mean rating and session count from completed,
/// rated appointments. The teacher's user row is locked first so two
/// concurrent feedback submissions serialize instead of losing an update.
async fn recompute_teacher_rating(
    client: &impl GenericClient,
    teacher_id: i64,
) -> Result<(), AppointmentStorageError> {
    client
        .query_opt(
            "SELECT id FROM swap.users WHERE id = $1 FOR UPDATE",
            &[&teacher_id],
        )
        .await?;

    let rows = client
        .query(
            "SELECT rating FROM swap.appointments
             WHERE teacher_id = $1 AND status = 'completed' AND rating IS NOT NULL",
            &[&teacher_id],
        )
        .await?;

    let ratings: Vec<i32> = rows.iter().map(|row| row.get("rating")).collect();

    if let Some(aggregate) = aggregate_ratings(&ratings) {
        client
            .execute(
                "UPDATE swap.users
                 SET rating = $2, total_sessions = $3, updated_at = NOW()
                 WHERE id = $1",
                &[&teacher_id, &aggregate.mean, &aggregate.sessions],
            )
            .await?;
    }

    Ok(())
}

/// All appointments the user participates in, oldest scheduled first,
/// optionally narrowed by status or by which side of the table they sit on.
#[instrument(skip(pool))]
pub async fn list_appointments(
    pool: &PgPool,
    user_id: i64,
    status: Option<AppointmentStatus>,
    role: Option<RoleFilter>,
) -> Result<Vec<AppointmentDetail>, AppointmentStorageError> {
    let client = pool.get().await?;

    let status_param: Option<&str> = status.map(|s| s.as_str());
    let role_param: Option<&str> = role.map(|r| r.as_str());

    let sql = format!(
        "{DETAIL_QUERY}
         WHERE (a.teacher_id = $1 OR a.learner_id = $1)
           AND ($2::text IS NULL OR a.status = $2)
           AND ($3::text IS NULL
                OR ($3 = 'teaching' AND a.teacher_id = $1)
                OR ($3 = 'learning' AND a.learner_id = $1))
         ORDER BY a.scheduled_at ASC, a.id ASC"
    );

    let rows = client
        .query(sql.as_str(), &[&user_id, &status_param, &role_param])
        .await?;

    rows.iter().map(detail_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_filter_parses_lowercase() {
        let teaching: RoleFilter = serde_json::from_str("\"teaching\"").unwrap();
        assert_eq!(teaching, RoleFilter::Teaching);
        assert!(serde_json::from_str::<RoleFilter>("\"observer\"").is_err());
    }

    #[test]
    fn policy_violations_pass_through_transparently() {
        let err = AppointmentStorageError::from(PolicyError::NotLearner);
        assert_eq!(err.to_string(), PolicyError::NotLearner.to_string());
    }
}
