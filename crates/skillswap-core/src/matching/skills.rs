/// Two skill labels are interchangeable when either contains the other,
/// case-insensitively. Substring containment is deliberately permissive and
/// not transitive: "C" pairs with both "C++" and "C#" even though those two
/// never pair with each other. No stemming, no synonym table.
pub fn skills_equivalent(a: &str, b: &str) -> bool {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    a.contains(&b) || b.contains(&a)
}

/// Subset of `pool` with at least one equivalent entry in `against`,
/// preserving the order of `pool`.
pub fn matching_skills(pool: &[String], against: &[String]) -> Vec<String> {
    pool.iter()
        .filter(|skill| against.iter().any(|other| skills_equivalent(skill, other)))
        .cloned()
        .collect()
}

/// Whether a teacher's offered skill list covers the requested skill.
pub fn teacher_offers(skills_to_teach: &[String], skill: &str) -> bool {
    skills_to_teach
        .iter()
        .any(|offered| skills_equivalent(offered, skill))
}
