use serde::Serialize;

use super::user::PublicUser;
use crate::matching::{MatchKind, MatchOutcome, MutualOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct MatchEntry {
    pub user: PublicUser,
    pub match_type: MatchKind,
    pub common_skills: Vec<String>,
    pub match_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wants_to_learn_from_me: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchListResponse {
    pub matches: Vec<MatchEntry>,
    pub total_matches: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<MatchOutcome> for MatchListResponse {
    fn from(outcome: MatchOutcome) -> Self {
        Self {
            matches: outcome
                .matches
                .into_iter()
                .map(|m| MatchEntry {
                    user: m.user.into(),
                    match_type: m.kind,
                    common_skills: m.common_skills,
                    match_score: m.match_score,
                    wants_to_learn_from_me: m.wants_to_learn_from_me,
                })
                .collect(),
            total_matches: outcome.total_matches,
            message: outcome.message.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MutualMatchEntry {
    pub user: PublicUser,
    pub match_type: MatchKind,
    pub can_teach_me: Vec<String>,
    pub wants_to_learn_from_me: Vec<String>,
    pub match_score: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MutualMatchListResponse {
    pub matches: Vec<MutualMatchEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<MutualOutcome> for MutualMatchListResponse {
    fn from(outcome: MutualOutcome) -> Self {
        Self {
            matches: outcome
                .matches
                .into_iter()
                .map(|m| MutualMatchEntry {
                    user: m.user.into(),
                    match_type: MatchKind::Mutual,
                    can_teach_me: m.can_teach_me,
                    wants_to_learn_from_me: m.wants_to_learn_from_me,
                    match_score: m.match_score,
                })
                .collect(),
            message: outcome.message.map(str::to_string),
        }
    }
}
