//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.
//! Services can be called directly via FFI or through Axum handlers.

pub mod follow_service;
pub mod place_service;
pub mod profile_service;
pub mod proximity_service;
pub mod user_service;
pub mod visit_service;

// Re-export for convenience
pub use proximity_service::{GateDecision, ProximityGate};
pub use visit_service::MarkVisitedInput;
