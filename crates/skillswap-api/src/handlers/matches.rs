use axum::{extract::State, Json};

use skillswap_core::api::match_response::{MatchListResponse, MutualMatchListResponse};
use skillswap_core::db::{fetch_match_pool, fetch_profile};
use skillswap_core::matching::{find_matches, find_mutual_matches};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

/// Ranked teacher/learner/mutual matches for the calling user. The engine
/// itself is pure; this handler only assembles its inputs.
pub async fn list_matches(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<MatchListResponse>, ApiError> {
    let current = fetch_profile(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", auth.user_id)))?;

    let candidates = fetch_match_pool(&state.pool, &current).await?;
    let outcome = find_matches(&current, &candidates);

    Ok(Json(MatchListResponse::from(outcome)))
}

/// Candidates where both directions hold at once.
pub async fn list_mutual_matches(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<MutualMatchListResponse>, ApiError> {
    let current = fetch_profile(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", auth.user_id)))?;

    let candidates = fetch_match_pool(&state.pool, &current).await?;
    let outcome = find_mutual_matches(&current, &candidates);

    Ok(Json(MutualMatchListResponse::from(outcome)))
}
