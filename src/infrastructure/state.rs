//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::config::Config;
use super::photo_store::PhotoStore;
use crate::domain::{FollowRepository, PlaceRepository, PostRepository, UserRepository};
use crate::infrastructure::{
    SeaOrmFollowRepository, SeaOrmPlaceRepository, SeaOrmPostRepository, SeaOrmUserRepository,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection
    db: DatabaseConnection,
    /// Runtime configuration
    pub config: Arc<Config>,
    /// User repository
    pub user_repo: Arc<dyn UserRepository>,
    /// Place repository
    pub place_repo: Arc<dyn PlaceRepository>,
    /// Post (visit) repository
    pub post_repo: Arc<dyn PostRepository>,
    /// Follow graph repository
    pub follow_repo: Arc<dyn FollowRepository>,
    /// Visit photo storage
    pub photos: PhotoStore,
}

impl AppState {
    /// Create a new AppState with default configuration
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, Config::default())
    }

    /// Create a new AppState with all repositories initialized
    pub fn with_config(db: DatabaseConnection, config: Config) -> Self {
        let user_repo = Arc::new(SeaOrmUserRepository::new(db.clone()));
        let place_repo = Arc::new(SeaOrmPlaceRepository::new(db.clone()));
        let post_repo = Arc::new(SeaOrmPostRepository::new(db.clone()));
        let follow_repo = Arc::new(SeaOrmFollowRepository::new(db.clone()));
        let photos = PhotoStore::new(config.photo_dir.clone());

        Self {
            db,
            config: Arc::new(config),
            user_repo,
            place_repo,
            post_repo,
            follow_repo,
            photos,
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
