//! Repository implementations using SeaORM

pub mod follow_repository;
pub mod place_repository;
pub mod post_repository;
pub mod user_repository;

pub use follow_repository::SeaOrmFollowRepository;
pub use place_repository::SeaOrmPlaceRepository;
pub use post_repository::SeaOrmPostRepository;
pub use user_repository::SeaOrmUserRepository;

use sea_orm::{DbErr, SqlErr};

use crate::domain::DomainError;

/// Turn a UNIQUE violation into `Conflict`, anything else into `Database`
pub(crate) fn map_unique_violation(e: DbErr, conflict_msg: &str) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::Conflict(conflict_msg.to_string()),
        _ => DomainError::from(e),
    }
}
