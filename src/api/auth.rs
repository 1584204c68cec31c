use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

use crate::domain::{DomainError, UpdateUserInput, User};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{Claims, create_jwt};
use crate::services::user_service::{self, RegisterInput};

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email
    #[serde(alias = "email")]
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
    #[serde(default, alias = "dateOfBirth")]
    date_of_birth: Option<String>,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default, alias = "location")]
    region: Option<String>,
    #[serde(default)]
    photo: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

fn token_response(status: StatusCode, user: User) -> axum::response::Response {
    match create_jwt(user.id, &user.username, &user.role) {
        Ok(token) => (status, Json(json!({ "token": token, "user": user }))).into_response(),
        Err(e) => DomainError::Internal(e).into_response(),
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    tracing::info!("Registration attempt for user: {}", payload.username);

    let input = RegisterInput {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        date_of_birth: payload.date_of_birth,
        gender: payload.gender,
        region: payload.region,
        photo: payload.photo,
    };

    match user_service::register(&state, input).await {
        Ok(user) => token_response(StatusCode::CREATED, user),
        Err(e) => e.into_response(),
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for user: {}", payload.username);

    match user_service::authenticate(&state, &payload.username, &payload.password).await {
        Ok(user) => token_response(StatusCode::OK, user),
        Err(e) => {
            tracing::warn!("Login failed for {}: {}", payload.username, e);
            e.into_response()
        }
    }
}

pub async fn me(State(state): State<AppState>, claims: Claims) -> impl IntoResponse {
    match user_service::get_user(&state, claims.uid).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn change_user(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<UpdateUserInput>,
) -> impl IntoResponse {
    match user_service::update_profile(&state, claims.uid, payload).await {
        Ok(user) => Json(user).into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn change_password(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<ChangePasswordRequest>,
) -> impl IntoResponse {
    match user_service::change_password(
        &state,
        claims.uid,
        &payload.current_password,
        &payload.new_password,
    )
    .await
    {
        Ok(()) => Json(json!({ "message": "Password updated" })).into_response(),
        Err(e) => e.into_response(),
    }
}
