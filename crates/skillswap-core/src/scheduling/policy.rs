use thiserror::Error;

use super::status::AppointmentStatus;

/// Per-appointment role. Any user may be teacher on one appointment and
/// learner on another; the role is resolved against the record, never
/// stored on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Teacher,
    Learner,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("requester is not a participant in this appointment")]
    NotParticipant,
    #[error("only the teacher can move an appointment to {0}")]
    TeacherOnly(AppointmentStatus),
    #[error("appointments cannot be moved to {0}")]
    InvalidTarget(AppointmentStatus),
    #[error("only the learner can leave feedback")]
    NotLearner,
    #[error("feedback requires a completed appointment, current status is {0}")]
    NotCompleted(AppointmentStatus),
}

/// Which roles may set each target status. Statuses absent from the table
/// (`pending`) are never a valid target of an update.
const STATUS_CHANGE_POLICY: &[(AppointmentStatus, &[PartyRole])] = &[
    (AppointmentStatus::Accepted, &[PartyRole::Teacher]),
    (AppointmentStatus::Rejected, &[PartyRole::Teacher]),
    (
        AppointmentStatus::Completed,
        &[PartyRole::Teacher, PartyRole::Learner],
    ),
    (
        AppointmentStatus::Cancelled,
        &[PartyRole::Teacher, PartyRole::Learner],
    ),
];

pub fn role_of(teacher_id: i64, learner_id: i64, user_id: i64) -> Option<PartyRole> {
    if user_id == teacher_id {
        Some(PartyRole::Teacher)
    } else if user_id == learner_id {
        Some(PartyRole::Learner)
    } else {
        None
    }
}

/// Gate a status write through the policy table. Role checks only; the
/// source status is deliberately not consulted.
pub fn authorize_status_change(
    teacher_id: i64,
    learner_id: i64,
    requester: i64,
    target: AppointmentStatus,
) -> Result<(), PolicyError> {
    let role = role_of(teacher_id, learner_id, requester).ok_or(PolicyError::NotParticipant)?;

    let allowed = STATUS_CHANGE_POLICY
        .iter()
        .find(|(status, _)| *status == target)
        .map(|(_, roles)| *roles)
        .ok_or(PolicyError::InvalidTarget(target))?;

    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(PolicyError::TeacherOnly(target))
    }
}

/// Feedback is learner-only and only for completed sessions.
pub fn authorize_feedback(
    learner_id: i64,
    requester: i64,
    status: AppointmentStatus,
) -> Result<(), PolicyError> {
    if requester != learner_id {
        return Err(PolicyError::NotLearner);
    }
    if status != AppointmentStatus::Completed {
        return Err(PolicyError::NotCompleted(status));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEACHER: i64 = 10;
    const LEARNER: i64 = 20;
    const STRANGER: i64 = 30;

    #[test]
    fn resolves_roles_from_the_record() {
        assert_eq!(role_of(TEACHER, LEARNER, TEACHER), Some(PartyRole::Teacher));
        assert_eq!(role_of(TEACHER, LEARNER, LEARNER), Some(PartyRole::Learner));
        assert_eq!(role_of(TEACHER, LEARNER, STRANGER), None);
    }

    #[test]
    fn only_the_teacher_accepts_or_rejects() {
        for target in [AppointmentStatus::Accepted, AppointmentStatus::Rejected] {
            assert_eq!(
                authorize_status_change(TEACHER, LEARNER, LEARNER, target),
                Err(PolicyError::TeacherOnly(target))
            );
            assert_eq!(
                authorize_status_change(TEACHER, LEARNER, TEACHER, target),
                Ok(())
            );
        }
    }

    #[test]
    fn either_party_completes_or_cancels() {
        for target in [AppointmentStatus::Completed, AppointmentStatus::Cancelled] {
            assert_eq!(
                authorize_status_change(TEACHER, LEARNER, TEACHER, target),
                Ok(())
            );
            assert_eq!(
                authorize_status_change(TEACHER, LEARNER, LEARNER, target),
                Ok(())
            );
        }
    }

    #[test]
    fn outsiders_are_rejected_before_role_rules() {
        assert_eq!(
            authorize_status_change(TEACHER, LEARNER, STRANGER, AppointmentStatus::Cancelled),
            Err(PolicyError::NotParticipant)
        );
    }

    #[test]
    fn pending_is_not_a_valid_target() {
        assert_eq!(
            authorize_status_change(TEACHER, LEARNER, TEACHER, AppointmentStatus::Pending),
            Err(PolicyError::InvalidTarget(AppointmentStatus::Pending))
        );
    }

    #[test]
    fn feedback_is_learner_only_on_completed() {
        assert_eq!(
            authorize_feedback(LEARNER, TEACHER, AppointmentStatus::Completed),
            Err(PolicyError::NotLearner)
        );
        assert_eq!(
            authorize_feedback(LEARNER, LEARNER, AppointmentStatus::Pending),
            Err(PolicyError::NotCompleted(AppointmentStatus::Pending))
        );
        assert_eq!(
            authorize_feedback(LEARNER, LEARNER, AppointmentStatus::Completed),
            Ok(())
        );
    }
}
