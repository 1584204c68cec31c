use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use super::proximity::PositionReport;
use crate::domain::NewPlace;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::{place_service, visit_service};

#[derive(Deserialize)]
pub struct PlaceFilter {
    city: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/places",
    params(("city" = Option<String>, Query, description = "Only places in this city")),
    responses((status = 200, description = "Places on the map"))
)]
pub async fn list_places(
    State(state): State<AppState>,
    Query(filter): Query<PlaceFilter>,
) -> impl IntoResponse {
    match place_service::list_places(&state, filter.city).await {
        Ok(places) => Json(places).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn list_cities(State(state): State<AppState>) -> impl IntoResponse {
    match place_service::list_cities(&state).await {
        Ok(cities) => Json(cities).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/places/{id}",
    params(("id" = i32, Path, description = "Place id")),
    responses(
        (status = 200, description = "Place found"),
        (status = 404, description = "Place not found")
    )
)]
pub async fn get_place(State(state): State<AppState>, Path(id): Path<i32>) -> impl IntoResponse {
    match place_service::get_place(&state, id).await {
        Ok(place) => Json(place).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn create_place(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<NewPlace>,
) -> impl IntoResponse {
    tracing::info!("User {} creates place {}", claims.sub, payload.name);
    match place_service::create_place(&state, payload).await {
        Ok(place) => (StatusCode::CREATED, Json(place)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Gate check ahead of the camera; records nothing
#[utoipa::path(
    post,
    path = "/api/places/{id}/proximity",
    params(("id" = i32, Path, description = "Place id")),
    responses(
        (status = 200, description = "Gate decision with distance"),
        (status = 400, description = "Missing or invalid coordinates"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Place not found"),
        (status = 422, description = "Location fix unavailable or stale")
    ),
    security(("bearer" = []))
)]
pub async fn check_place_proximity(
    State(state): State<AppState>,
    _claims: Claims,
    Path(id): Path<i32>,
    Json(report): Json<PositionReport>,
) -> impl IntoResponse {
    let (fix, initiated_at) = match report.into_fix() {
        Ok(v) => v,
        Err(e) => return e.into_response(),
    };

    match visit_service::check_place_proximity(&state, id, &fix, initiated_at).await {
        Ok(decision) => Json(json!({
            "place_id": id,
            "allowed": decision.is_allowed(),
            "message": decision.result().distance_label(),
            "gate": decision,
        }))
        .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn visited_status(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match visit_service::has_visited(&state, claims.uid, id).await {
        Ok(visited) => Json(json!({ "place_id": id, "visited": visited })).into_response(),
        Err(e) => e.into_response(),
    }
}
