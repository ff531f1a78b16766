use serde::{Deserialize, Serialize};

use super::{require_len_max, InvalidRequest};
use crate::UserProfile;

/// Profile as exposed over the API. Credential columns are never selected
/// by the storage layer, so this is a total view of what leaves the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub skills_to_teach: Vec<String>,
    pub skills_to_learn: Vec<String>,
    pub rating: Option<f64>,
    pub total_sessions: i32,
    pub is_active: bool,
}

impl From<UserProfile> for PublicUser {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            bio: profile.bio,
            location: profile.location,
            skills_to_teach: profile.skills_to_teach,
            skills_to_learn: profile.skills_to_learn,
            rating: profile.rating,
            total_sessions: profile.total_sessions,
            is_active: profile.is_active,
        }
    }
}

/// Partial profile update; absent fields are left untouched. Rating and
/// session count are derived and cannot be written here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub skills_to_teach: Option<Vec<String>>,
    pub skills_to_learn: Option<Vec<String>>,
}

impl UpdateProfileRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if let Some(name) = &self.name {
            if name.trim().chars().count() < 2 {
                return Err(InvalidRequest(
                    "Name must be at least 2 characters".into(),
                ));
            }
        }
        require_len_max(self.bio.as_deref(), 500, "Bio")?;

        for list in [&self.skills_to_teach, &self.skills_to_learn]
            .into_iter()
            .flatten()
        {
            if list.iter().any(|skill| skill.trim().is_empty()) {
                return Err(InvalidRequest("Skill entries must not be empty".into()));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSearchResponse {
    pub users: Vec<PublicUser>,
    pub total_pages: i64,
    pub current_page: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_mirrors_the_profile() {
        let profile = UserProfile {
            id: 7,
            name: "Dana".into(),
            rating: Some(4.2),
            total_sessions: 3,
            is_active: true,
            ..UserProfile::default()
        };

        let public = PublicUser::from(profile.clone());
        assert_eq!(public.id, 7);
        assert_eq!(public.rating, Some(4.2));
        assert_eq!(public.total_sessions, 3);
    }

    #[test]
    fn short_names_are_rejected() {
        let req = UpdateProfileRequest {
            name: Some("x".into()),
            ..UpdateProfileRequest::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn long_bio_is_rejected() {
        let req = UpdateProfileRequest {
            bio: Some("b".repeat(501)),
            ..UpdateProfileRequest::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn blank_skill_entries_are_rejected() {
        let req = UpdateProfileRequest {
            skills_to_teach: Some(vec!["Rust".into(), "  ".into()]),
            ..UpdateProfileRequest::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn partial_update_passes() {
        let req = UpdateProfileRequest {
            location: Some("Berlin".into()),
            ..UpdateProfileRequest::default()
        };
        assert_eq!(req.validate(), Ok(()));
    }
}
