pub mod auth;
pub mod errors;
pub mod follow;
pub mod frb; // FFI API for flutter_rust_bridge
pub mod health;
pub mod place;
pub mod post;
pub mod proximity;
pub mod user;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};

use crate::infrastructure::AppState;
use crate::infrastructure::photo_store::MAX_UPLOAD_BYTES;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/change-user", put(auth::change_user))
        .route("/auth/change-password", put(auth::change_password))
        // Users
        .route("/users", get(user::list_users))
        .route("/users/search", get(user::search_users))
        .route("/users/:id", get(user::get_user).delete(user::delete_user))
        .route("/users/:id/profile", get(user::get_profile))
        .route("/users/:id/album", get(user::get_album))
        .route("/users/:id/following", get(user::following))
        .route("/users/:id/followers", get(user::followers))
        .route("/users/:id/friends", get(user::friends))
        // Follows
        .route(
            "/follows/:followee_id",
            post(follow::follow).delete(follow::unfollow),
        )
        // Places
        .route("/places", get(place::list_places).post(place::create_place))
        .route("/places/cities", get(place::list_cities))
        .route("/places/:id", get(place::get_place))
        .route("/places/:id/proximity", post(place::check_place_proximity))
        .route("/places/:id/visited", get(place::visited_status))
        .route("/proximity", post(proximity::check))
        // Posts
        .route(
            "/posts",
            get(post::list_posts)
                .post(post::create_post)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/posts/:id", delete(post::delete_post))
        .with_state(state)
}
