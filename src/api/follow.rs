use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::follow_service;

pub async fn follow(
    State(state): State<AppState>,
    claims: Claims,
    Path(followee_id): Path<i32>,
) -> impl IntoResponse {
    match follow_service::follow(&state, claims.uid, followee_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn unfollow(
    State(state): State<AppState>,
    claims: Claims,
    Path(followee_id): Path<i32>,
) -> impl IntoResponse {
    match follow_service::unfollow(&state, claims.uid, followee_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
