use std::cmp::Ordering;

use serde::Serialize;

use super::skills::matching_skills;
use crate::UserProfile;

/// Ranked results are cut to the strongest candidates; the pre-truncation
/// count is still reported so callers can show "N total".
pub const MATCH_LIMIT: usize = 20;

const NO_LEARN_SKILLS_MESSAGE: &str = "Add skills you want to learn to find matches";
const NO_MUTUAL_SKILLS_MESSAGE: &str = "Add both skills to teach and learn to find mutual matches";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Teacher,
    Learner,
    Mutual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch {
    pub user: UserProfile,
    pub kind: MatchKind,
    pub common_skills: Vec<String>,
    pub match_score: f64,
    /// Present only after a teacher match is merged with the reverse
    /// direction: what this candidate wants to learn from the current user.
    pub wants_to_learn_from_me: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome {
    pub matches: Vec<SkillMatch>,
    pub total_matches: usize,
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutualMatch {
    pub user: UserProfile,
    pub can_teach_me: Vec<String>,
    pub wants_to_learn_from_me: Vec<String>,
    pub match_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MutualOutcome {
    pub matches: Vec<MutualMatch>,
    pub message: Option<&'static str>,
}

fn is_candidate(current: &UserProfile, candidate: &UserProfile) -> bool {
    candidate.is_active && candidate.id != current.id
}

fn reputation_bonus(candidate: &UserProfile) -> f64 {
    candidate.rating.unwrap_or(0.0) + candidate.total_sessions as f64 * 0.1
}

/// Rank `candidates` against `current` in both directions.
///
/// Teacher matches (they teach something the current user wants) earn a
/// reputation bonus on top of the shared-skill count; learner-only matches
/// (they want something the current user teaches) score on shared-skill
/// count alone. A candidate hit in both directions collapses into a single
/// mutual entry whose score sums both contributions.
pub fn find_matches(current: &UserProfile, candidates: &[UserProfile]) -> MatchOutcome {
    if current.skills_to_learn.is_empty() {
        return MatchOutcome {
            matches: Vec::new(),
            total_matches: 0,
            message: Some(NO_LEARN_SKILLS_MESSAGE),
        };
    }

    let mut matches: Vec<SkillMatch> = Vec::new();

    for candidate in candidates {
        if !is_candidate(current, candidate) {
            continue;
        }

        let common = matching_skills(&candidate.skills_to_teach, &current.skills_to_learn);
        if common.is_empty() {
            continue;
        }

        let match_score = common.len() as f64 + reputation_bonus(candidate);
        matches.push(SkillMatch {
            user: candidate.clone(),
            kind: MatchKind::Teacher,
            common_skills: common,
            match_score,
            wants_to_learn_from_me: None,
        });
    }

    for candidate in candidates {
        if !is_candidate(current, candidate) {
            continue;
        }

        let common = matching_skills(&candidate.skills_to_learn, &current.skills_to_teach);
        if common.is_empty() {
            continue;
        }

        if let Some(existing) = matches.iter_mut().find(|m| m.user.id == candidate.id) {
            existing.kind = MatchKind::Mutual;
            existing.match_score += common.len() as f64;
            existing.wants_to_learn_from_me = Some(common);
        } else {
            matches.push(SkillMatch {
                user: candidate.clone(),
                kind: MatchKind::Learner,
                common_skills: common.clone(),
                match_score: common.len() as f64,
                wants_to_learn_from_me: None,
            });
        }
    }

    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(Ordering::Equal)
    });

    let total_matches = matches.len();
    matches.truncate(MATCH_LIMIT);

    MatchOutcome {
        matches,
        total_matches,
        message: None,
    }
}

/// Stricter variant: only candidates where both directions hold at once.
/// Scored by the two shared-skill counts plus the candidate's rating; no
/// session bonus and no truncation.
pub fn find_mutual_matches(current: &UserProfile, candidates: &[UserProfile]) -> MutualOutcome {
    if current.skills_to_learn.is_empty() || current.skills_to_teach.is_empty() {
        return MutualOutcome {
            matches: Vec::new(),
            message: Some(NO_MUTUAL_SKILLS_MESSAGE),
        };
    }

    let mut matches: Vec<MutualMatch> = Vec::new();

    for candidate in candidates {
        if !is_candidate(current, candidate) {
            continue;
        }

        let can_teach_me = matching_skills(&candidate.skills_to_teach, &current.skills_to_learn);
        let wants_to_learn_from_me =
            matching_skills(&candidate.skills_to_learn, &current.skills_to_teach);

        if can_teach_me.is_empty() || wants_to_learn_from_me.is_empty() {
            continue;
        }

        let match_score = can_teach_me.len() as f64
            + wants_to_learn_from_me.len() as f64
            + candidate.rating.unwrap_or(0.0);

        matches.push(MutualMatch {
            user: candidate.clone(),
            can_teach_me,
            wants_to_learn_from_me,
            match_score,
        });
    }

    matches.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(Ordering::Equal)
    });

    MutualOutcome {
        matches,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, teach: &[&str], learn: &[&str]) -> UserProfile {
        UserProfile {
            id,
            name: format!("user-{id}"),
            skills_to_teach: teach.iter().map(|s| s.to_string()).collect(),
            skills_to_learn: learn.iter().map(|s| s.to_string()).collect(),
            is_active: true,
            ..UserProfile::default()
        }
    }

    #[test]
    fn empty_learn_list_short_circuits() {
        let current = user(1, &["Rust"], &[]);
        let candidates = vec![user(2, &["Rust"], &["Guitar"])];

        let outcome = find_matches(&current, &candidates);

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.total_matches, 0);
        assert_eq!(outcome.message, Some(NO_LEARN_SKILLS_MESSAGE));
    }

    #[test]
    fn teacher_match_scores_skills_plus_reputation() {
        let current = user(1, &[], &["Rust", "Guitar"]);
        let mut teacher = user(2, &["Rust", "Guitar"], &[]);
        teacher.rating = Some(4.5);
        teacher.total_sessions = 10;

        let outcome = find_matches(&current, &[teacher]);

        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.kind, MatchKind::Teacher);
        assert_eq!(m.common_skills.len(), 2);
        // 2 common + 4.5 rating + 10 * 0.1 sessions
        assert!((m.match_score - 7.5).abs() < 1e-9);
    }

    #[test]
    fn learner_match_gets_no_reputation_bonus() {
        let current = user(1, &["Rust"], &["Sketching"]);
        let mut learner = user(2, &[], &["Rust"]);
        learner.rating = Some(5.0);
        learner.total_sessions = 40;

        let outcome = find_matches(&current, &[learner]);

        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.kind, MatchKind::Learner);
        assert!((m.match_score - 1.0).abs() < 1e-9);
        assert!(m.wants_to_learn_from_me.is_none());
    }

    #[test]
    fn both_directions_collapse_into_one_mutual_entry() {
        let current = user(1, &["Spanish"], &["Rust"]);
        let mut other = user(2, &["Rust"], &["Spanish"]);
        other.rating = Some(3.0);

        let outcome = find_matches(&current, &[other]);

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.total_matches, 1);
        let m = &outcome.matches[0];
        assert_eq!(m.kind, MatchKind::Mutual);
        // teacher direction: 1 common + 3.0 rating; learner direction: +1
        assert!((m.match_score - 5.0).abs() < 1e-9);
        assert_eq!(
            m.wants_to_learn_from_me.as_deref(),
            Some(&["Spanish".to_string()][..])
        );
    }

    #[test]
    fn inactive_and_self_candidates_are_skipped() {
        let current = user(1, &["Rust"], &["Guitar"]);
        let mut inactive = user(2, &["Guitar"], &[]);
        inactive.is_active = false;
        let same_id = user(1, &["Guitar"], &[]);

        let outcome = find_matches(&current, &[inactive, same_id]);

        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn ranking_truncates_but_reports_full_total() {
        let current = user(1, &[], &["Rust"]);
        let candidates: Vec<UserProfile> = (2..=30)
            .map(|id| {
                let mut c = user(id, &["Rust"], &[]);
                c.total_sessions = id as i32;
                c
            })
            .collect();

        let outcome = find_matches(&current, &candidates);

        assert_eq!(outcome.matches.len(), MATCH_LIMIT);
        assert_eq!(outcome.total_matches, 29);
        // Highest session count ranks first.
        assert_eq!(outcome.matches[0].user.id, 30);
    }

    #[test]
    fn sort_is_descending_by_score() {
        let current = user(1, &[], &["Rust", "Guitar"]);
        let weak = user(2, &["Rust"], &[]);
        let mut strong = user(3, &["Rust", "Guitar"], &[]);
        strong.rating = Some(4.0);

        let outcome = find_matches(&current, &[weak, strong]);

        assert_eq!(outcome.matches[0].user.id, 3);
        assert_eq!(outcome.matches[1].user.id, 2);
    }

    #[test]
    fn mutual_requires_both_skill_lists() {
        let current = user(1, &[], &["Rust"]);
        let outcome = find_mutual_matches(&current, &[user(2, &["Rust"], &[])]);

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.message, Some(NO_MUTUAL_SKILLS_MESSAGE));
    }

    #[test]
    fn mutual_requires_both_directions_at_once() {
        let current = user(1, &["Spanish"], &["Rust"]);
        let one_way = user(2, &["Rust"], &["Piano"]);
        let mut both_ways = user(3, &["Rust"], &["Spanish"]);
        both_ways.rating = Some(2.0);

        let outcome = find_mutual_matches(&current, &[one_way, both_ways]);

        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.user.id, 3);
        assert_eq!(m.can_teach_me, vec!["Rust".to_string()]);
        assert_eq!(m.wants_to_learn_from_me, vec!["Spanish".to_string()]);
        // 1 + 1 + 2.0 rating; session count is ignored here.
        assert!((m.match_score - 4.0).abs() < 1e-9);
    }
}
