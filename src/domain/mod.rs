//! Domain layer - Pure business abstractions
//!
//! This layer contains NO framework dependencies (no SeaORM, no Axum).
//! Geographic math, location rules, repository traits and domain errors.

pub mod errors;
pub mod geo;
pub mod location;
pub mod repositories;

pub use errors::DomainError;
pub use geo::{GeoError, GeoPoint, ProximityResult, check_proximity};
pub use location::{LocationError, LocationFix, LocationProvider, ReportedLocation};
pub use repositories::*;
