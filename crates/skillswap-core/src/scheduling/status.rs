use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Appointment lifecycle. A booking starts as `pending`; the teacher moves
/// it to `accepted` or `rejected`; an accepted session ends `completed` or
/// `cancelled`. Feedback only ever attaches to `completed`.
///
/// Status writes are gated by role, not by source state (see
/// `scheduling::policy`): a learner may mark a session completed and either
/// party may cancel whatever the current state is.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Accepted => "accepted",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }
}
