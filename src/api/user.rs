use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::{follow_service, profile_service, user_service};

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

pub async fn list_users(State(state): State<AppState>, _claims: Claims) -> impl IntoResponse {
    match user_service::list_users(&state).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn search_users(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    match user_service::search_users(&state, &query.q, Some(claims.uid)).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_user(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match user_service::get_user(&state, id).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    if claims.uid != id {
        tracing::warn!("User {} tried to delete account {}", claims.uid, id);
        return DomainError::Forbidden("You can only delete your own account".to_string())
            .into_response();
    }

    match user_service::delete_account(&state, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Profile header; `is_following` is filled in when the caller is authenticated
pub async fn get_profile(
    State(state): State<AppState>,
    claims: Option<Claims>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    let viewer = claims.map(|c| c.uid);
    match profile_service::get_profile(&state, id, viewer).await {
        Ok(profile) => Json(profile).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn get_album(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match profile_service::get_album(&state, id).await {
        Ok(album) => Json(json!({ "user_id": id, "cities": album })).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn following(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match follow_service::following(&state, id).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn followers(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match follow_service::followers(&state, id).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn friends(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match follow_service::friends(&state, id).await {
        Ok(users) => Json(users).into_response(),
        Err(e) => e.into_response(),
    }
}
