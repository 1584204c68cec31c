use axum::{Json, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{DomainError, GeoPoint, LocationFix, check_proximity, geo::DEFAULT_THRESHOLD_M};

/// A device position as reported by the client
///
/// Coordinates are optional on the wire so that a missing value surfaces as
/// a 400 instead of a generic body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PositionReport {
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub initiated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
}

impl PositionReport {
    pub fn into_fix(self) -> Result<(LocationFix, Option<DateTime<Utc>>), DomainError> {
        let point = GeoPoint::from_parts(self.latitude, self.longitude)?;
        let captured_at = self.captured_at.ok_or_else(|| {
            DomainError::LocationUnavailable("location fix has no captured_at timestamp".to_string())
        })?;

        let mut fix = LocationFix::new(point, captured_at);
        fix.accuracy_m = self.accuracy_m.filter(|a| a.is_finite() && *a >= 0.0);
        Ok((fix, self.initiated_at))
    }
}

#[derive(Deserialize)]
pub struct CheckProximityRequest {
    current: GeoPoint,
    target: GeoPoint,
    #[serde(default)]
    threshold_m: Option<f64>,
}

/// Stateless distance check between two points
#[utoipa::path(
    post,
    path = "/api/proximity",
    responses(
        (status = 200, description = "Distance and threshold verdict"),
        (status = 400, description = "Coordinates or threshold out of range")
    )
)]
pub async fn check(Json(payload): Json<CheckProximityRequest>) -> impl IntoResponse {
    let threshold = payload.threshold_m.unwrap_or(DEFAULT_THRESHOLD_M);
    match check_proximity(payload.current, payload.target, threshold) {
        Ok(result) => Json(result).into_response(),
        Err(e) => DomainError::from(e).into_response(),
    }
}
