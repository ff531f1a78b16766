use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::api::user::UpdateProfileRequest;
use crate::db::PgPool;
use crate::UserProfile;

#[derive(Debug, Error)]
pub enum UserStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("user not found: {0}")]
    NotFound(i64),
}

/// Every profile read goes through this column list; credential columns
/// (email, password_hash) are never part of it.
const PROFILE_COLUMNS: &str = "id, name, bio, location, skills_to_teach, skills_to_learn, \
     rating, total_sessions, is_active";

pub(crate) fn profile_from_row(row: &Row) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        name: row.get("name"),
        bio: row.get("bio"),
        location: row.get("location"),
        skills_to_teach: row.get("skills_to_teach"),
        skills_to_learn: row.get("skills_to_learn"),
        rating: row.get("rating"),
        total_sessions: row.get("total_sessions"),
        is_active: row.get("is_active"),
    }
}

#[instrument(skip(pool))]
pub async fn fetch_profile(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<UserProfile>, UserStorageError> {
    let client = pool.get().await?;
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM swap.users WHERE id = $1");
    let row = client.query_opt(sql.as_str(), &[&user_id]).await?;

    Ok(row.as_ref().map(profile_from_row))
}

/// Candidate pool for the matching engine: active users other than the
/// current one, prefiltered to rows whose skill lists intersect the current
/// user's lists under bidirectional case-insensitive containment. The pure
/// engine re-derives the exact common-skill sets; this query only bounds
/// the rows shipped out of the database.
#[instrument(skip(pool, current), fields(user_id = current.id))]
pub async fn fetch_match_pool(
    pool: &PgPool,
    current: &UserProfile,
) -> Result<Vec<UserProfile>, UserStorageError> {
    let client = pool.get().await?;

    let stmt = client
        .prepare_cached(&format!(
            "SELECT {PROFILE_COLUMNS}
             FROM swap.users u
             WHERE u.id <> $1
               AND u.is_active
               AND (
                   EXISTS (
                       SELECT 1
                       FROM unnest(u.skills_to_teach) AS teach,
                            unnest($2::text[]) AS want
                       WHERE teach ILIKE '%' || want || '%'
                          OR want ILIKE '%' || teach || '%'
                   )
                   OR EXISTS (
                       SELECT 1
                       FROM unnest(u.skills_to_learn) AS learn,
                            unnest($3::text[]) AS offer
                       WHERE learn ILIKE '%' || offer || '%'
                          OR offer ILIKE '%' || learn || '%'
                   )
               )
             ORDER BY u.rating DESC NULLS LAST, u.total_sessions DESC, u.id"
        ))
        .await?;

    let rows = client
        .query(
            &stmt,
            &[&current.id, &current.skills_to_learn, &current.skills_to_teach],
        )
        .await?;

    Ok(rows.iter().map(profile_from_row).collect())
}

/// Apply a partial profile update. Derived fields (rating, total_sessions)
/// are not reachable from here.
#[instrument(skip(pool, changes))]
pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    changes: &UpdateProfileRequest,
) -> Result<UserProfile, UserStorageError> {
    let client = pool.get().await?;

    let sql = format!(
        "UPDATE swap.users SET
            name = COALESCE($2, name),
            bio = COALESCE($3, bio),
            location = COALESCE($4, location),
            skills_to_teach = COALESCE($5, skills_to_teach),
            skills_to_learn = COALESCE($6, skills_to_learn),
            updated_at = NOW()
         WHERE id = $1
         RETURNING {PROFILE_COLUMNS}"
    );
    let row = client
        .query_opt(
            sql.as_str(),
            &[
                &user_id,
                &changes.name,
                &changes.bio,
                &changes.location,
                &changes.skills_to_teach,
                &changes.skills_to_learn,
            ],
        )
        .await?
        .ok_or(UserStorageError::NotFound(user_id))?;

    Ok(profile_from_row(&row))
}

#[derive(Debug, Clone)]
pub struct TeacherSearchPage {
    pub users: Vec<UserProfile>,
    pub total_pages: i64,
    pub current_page: i64,
}

/// Browse active teachers, optionally narrowed to those offering a skill,
/// newest profiles first.
#[instrument(skip(pool))]
pub async fn search_teachers(
    pool: &PgPool,
    current_user_id: i64,
    skill: Option<&str>,
    page: i64,
    limit: i64,
) -> Result<TeacherSearchPage, UserStorageError> {
    let client = pool.get().await?;

    let offset = (page - 1) * limit;
    let params: &[&(dyn ToSql + Sync)] = &[&current_user_id, &skill, &limit, &offset];

    let sql = format!(
        "SELECT {PROFILE_COLUMNS}, COUNT(*) OVER () AS total_count
         FROM swap.users
         WHERE id <> $1
           AND is_active
           AND ($2::text IS NULL OR EXISTS (
               SELECT 1 FROM unnest(skills_to_teach) AS s
               WHERE s ILIKE '%' || $2 || '%'
           ))
         ORDER BY created_at DESC, id DESC
         LIMIT $3 OFFSET $4"
    );
    let rows = client.query(sql.as_str(), params).await?;

    let total: i64 = rows
        .first()
        .map(|row| row.get("total_count"))
        .unwrap_or(0);

    Ok(TeacherSearchPage {
        users: rows.iter().map(profile_from_row).collect(),
        total_pages: (total + limit - 1) / limit,
        current_page: page,
    })
}
