use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use skillswap_core::api::user::{PublicUser, UpdateProfileRequest, UserSearchResponse};
use skillswap_core::db::{fetch_profile, search_teachers, update_profile};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::SharedState;

pub async fn me(
    State(state): State<SharedState>,
    auth: AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let profile = fetch_profile(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", auth.user_id)))?;

    Ok(Json(PublicUser::from(profile)))
}

pub async fn update_me(
    State(state): State<SharedState>,
    auth: AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    payload.validate()?;

    let profile = update_profile(&state.pool, auth.user_id, &payload).await?;

    Ok(Json(PublicUser::from(profile)))
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchQuery {
    pub skill: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_page() -> i64 {
    1
}

const fn default_limit() -> i64 {
    10
}

pub async fn search(
    State(state): State<SharedState>,
    auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<UserSearchResponse>, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 50);

    let result = search_teachers(
        &state.pool,
        auth.user_id,
        query.skill.as_deref(),
        page,
        limit,
    )
    .await?;

    Ok(Json(UserSearchResponse {
        users: result.users.into_iter().map(PublicUser::from).collect(),
        total_pages: result.total_pages,
        current_page: result.current_page,
    }))
}
