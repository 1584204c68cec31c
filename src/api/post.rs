use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::str::FromStr;

use super::proximity::PositionReport;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::{MarkVisitedInput, visit_service};

#[derive(Deserialize)]
pub struct PostFilter {
    user_id: Option<i32>,
}

/// Posts of `user_id`, or of the caller when omitted
pub async fn list_posts(
    State(state): State<AppState>,
    claims: Claims,
    Query(filter): Query<PostFilter>,
) -> impl IntoResponse {
    let user_id = filter.user_id.unwrap_or(claims.uid);
    match visit_service::list_posts(&state, user_id).await {
        Ok(posts) => Json(posts).into_response(),
        Err(e) => e.into_response(),
    }
}

fn parse_field<T: FromStr>(name: &str, text: &str) -> Result<T, DomainError> {
    text.trim()
        .parse()
        .map_err(|_| DomainError::InvalidInput(format!("'{}' is not a valid {}", text, name)))
}

fn parse_timestamp(name: &str, text: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| DomainError::InvalidInput(format!("'{}' is not an RFC 3339 {}", text, name)))
}

async fn read_visit_form(mut multipart: Multipart) -> Result<MarkVisitedInput, DomainError> {
    let mut place_id = None;
    let mut description = None;
    let mut photo = None;
    let mut report = PositionReport::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::Validation(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "file" {
            let data = field
                .bytes()
                .await
                .map_err(|e| DomainError::Validation(format!("Failed to read photo: {}", e)))?;
            if !data.is_empty() {
                photo = Some(data.to_vec());
            }
            continue;
        }

        let text = field
            .text()
            .await
            .map_err(|e| DomainError::Validation(format!("Failed to read {}: {}", name, e)))?;

        match name.as_str() {
            "place_id" | "placeID" => place_id = Some(parse_field::<i32>("place id", &text)?),
            "description" => description = Some(text),
            "latitude" => report.latitude = Some(parse_field("latitude", &text)?),
            "longitude" => report.longitude = Some(parse_field("longitude", &text)?),
            "accuracy_m" => report.accuracy_m = Some(parse_field("accuracy", &text)?),
            "captured_at" => report.captured_at = Some(parse_timestamp("captured_at", &text)?),
            "initiated_at" => report.initiated_at = Some(parse_timestamp("initiated_at", &text)?),
            other => tracing::debug!("Ignoring unknown form field {}", other),
        }
    }

    let place_id =
        place_id.ok_or_else(|| DomainError::Validation("place_id is required".to_string()))?;
    let (fix, initiated_at) = report.into_fix()?;

    Ok(MarkVisitedInput {
        place_id,
        fix,
        initiated_at,
        description,
        photo,
    })
}

/// Mark a place visited: multipart form with the photo under `file`
#[utoipa::path(
    post,
    path = "/api/posts",
    responses(
        (status = 201, description = "Visit recorded"),
        (status = 400, description = "Missing or invalid form fields"),
        (status = 403, description = "Too far from the place"),
        (status = 404, description = "Place not found"),
        (status = 409, description = "Place already visited"),
        (status = 422, description = "Location fix unavailable or stale")
    ),
    security(("bearer" = []))
)]
pub async fn create_post(
    State(state): State<AppState>,
    claims: Claims,
    multipart: Multipart,
) -> impl IntoResponse {
    let input = match read_visit_form(multipart).await {
        Ok(input) => input,
        Err(e) => return e.into_response(),
    };

    match visit_service::mark_visited(&state, claims.uid, input).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn delete_post(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match visit_service::delete_post(&state, claims.uid, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields() {
        assert_eq!(parse_field::<f64>("latitude", " 49.84 ").unwrap(), 49.84);
        assert!(matches!(
            parse_field::<i32>("place id", "seven"),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn timestamps_are_normalized_to_utc() {
        let t = parse_timestamp("captured_at", "2024-05-01T12:00:00+03:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-05-01T09:00:00+00:00");
        assert!(parse_timestamp("captured_at", "yesterday").is_err());
    }
}
