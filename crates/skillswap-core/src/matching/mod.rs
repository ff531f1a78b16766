pub mod engine;
pub mod skills;

pub use engine::{
    find_matches, find_mutual_matches, MatchKind, MatchOutcome, MutualMatch, MutualOutcome,
    SkillMatch, MATCH_LIMIT,
};
pub use skills::{matching_skills, skills_equivalent};
