//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;
use super::geo::{GeoError, GeoPoint};

/// User data for API responses (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub photo: Option<String>,
    pub role: String,
    pub created_at: String,
}

/// A user together with the stored password hash, for login
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub photo: Option<String>,
}

/// Partial profile update; `None` leaves the field untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    /// Home region picked during sign-up ("location" in older clients)
    #[serde(alias = "location")]
    pub region: Option<String>,
    pub photo: Option<String>,
}

/// Repository trait for User entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find all users
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError>;

    /// Find a user by username or email, with credentials
    async fn find_by_login(&self, login: &str) -> Result<Option<UserCredentials>, DomainError>;

    /// Create a new user; `Conflict` when username or email is taken
    async fn create(&self, input: NewUser) -> Result<User, DomainError>;

    /// Update profile fields
    async fn update_profile(&self, id: i32, input: UpdateUserInput) -> Result<User, DomainError>;

    /// Replace the stored password hash
    async fn set_password_hash(&self, id: i32, password_hash: String) -> Result<(), DomainError>;

    /// Delete a user by ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub visit_radius_m: Option<f64>,
}

impl Place {
    /// The place's position, failing when the record has no usable coordinates
    pub fn position(&self) -> Result<GeoPoint, GeoError> {
        GeoPoint::from_parts(self.latitude, self.longitude)
    }
}

/// Input for creating a place
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlace {
    pub name: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
    pub visit_radius_m: Option<f64>,
}

/// Repository trait for Place entity
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    /// Find all places, optionally restricted to one city
    async fn find_all(&self, city: Option<String>) -> Result<Vec<Place>, DomainError>;

    /// Find a place by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Place>, DomainError>;

    /// Create a new place
    async fn create(&self, input: NewPlace) -> Result<Place, DomainError>;

    /// Total number of places
    async fn count(&self) -> Result<u64, DomainError>;

    /// Distinct city names, sorted
    async fn cities(&self) -> Result<Vec<String>, DomainError>;
}

/// A visited-place record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub place_id: i32,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_m: f64,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i32,
    pub place_id: i32,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub position: GeoPoint,
    pub distance_m: f64,
}

/// Repository trait for Post entity
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Posts of a user, newest first, with place name and city
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Post>, DomainError>;

    /// Find a post by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, DomainError>;

    /// The user's post for a place, if any
    async fn find_by_user_and_place(
        &self,
        user_id: i32,
        place_id: i32,
    ) -> Result<Option<Post>, DomainError>;

    /// Create a post; `Conflict` when the place is already visited
    async fn create(&self, input: NewPost) -> Result<Post, DomainError>;

    /// Delete a post by ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}

/// Repository trait for follow edges
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Create the edge; following twice is not an error
    async fn follow(&self, follower_id: i32, followee_id: i32) -> Result<(), DomainError>;

    /// Remove the edge; removing a missing edge is not an error
    async fn unfollow(&self, follower_id: i32, followee_id: i32) -> Result<(), DomainError>;

    /// IDs of users `user_id` follows
    async fn following(&self, user_id: i32) -> Result<Vec<i32>, DomainError>;

    /// IDs of users following `user_id`
    async fn followers(&self, user_id: i32) -> Result<Vec<i32>, DomainError>;

    async fn is_following(&self, follower_id: i32, followee_id: i32) -> Result<bool, DomainError>;
}
