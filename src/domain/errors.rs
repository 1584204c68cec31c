//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

use super::geo::GeoError;
use super::location::LocationError;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// Validation error with message
    Validation(String),
    /// Coordinates missing or out of range; the gated action must be aborted
    InvalidInput(String),
    /// No usable device position
    LocationUnavailable(String),
    /// The user is outside the place's radius
    TooFar { distance_m: f64, threshold_m: f64 },
    /// Unique constraint violated (already visited, username taken...)
    Conflict(String),
    /// Missing or wrong credentials
    Unauthorized(String),
    /// Authenticated, but not allowed to touch this resource
    Forbidden(String),
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            DomainError::LocationUnavailable(msg) => write!(f, "{}", msg),
            DomainError::TooFar { distance_m, .. } => write!(
                f,
                "You are too far from the place. Distance: {:.2}m",
                distance_m
            ),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            DomainError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<GeoError> for DomainError {
    fn from(e: GeoError) -> Self {
        match e {
            GeoError::InvalidInput(msg) => DomainError::InvalidInput(msg),
        }
    }
}

impl From<LocationError> for DomainError {
    fn from(e: LocationError) -> Self {
        DomainError::LocationUnavailable(e.to_string())
    }
}
