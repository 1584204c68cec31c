use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use mandrivka::api;
use mandrivka::auth::{create_jwt, decode_jwt, hash_password, verify_password};
use mandrivka::db;
use mandrivka::domain::UserRepository;
use mandrivka::infrastructure::AppState;
use mandrivka::services::user_service::{self, RegisterInput};
use serde_json::json;
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test app state
async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db)
}

async fn create_user(state: &AppState, username: &str, password: &str) -> i32 {
    user_service::register(
        state,
        RegisterInput {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password: password.to_string(),
            date_of_birth: None,
            gender: None,
            region: None,
            photo: None,
        },
    )
    .await
    .expect("Failed to create user")
    .id
}

fn login_request(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": username, "password": password }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let token = create_jwt(7, "traveller", "user").expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "traveller");
    assert_eq!(claims.uid, 7);
    assert_eq!(claims.role, "user");
}

#[tokio::test]
async fn test_tampered_token_is_rejected() {
    let token = create_jwt(7, "traveller", "user").unwrap();
    let mut tampered = token.clone();
    tampered.push('x');
    assert!(decode_jwt(&tampered).is_err());
}

#[tokio::test]
async fn test_login_flow() {
    let state = setup_test_state().await;
    create_user(&state, "olena", "correct_horse").await;

    let app = Router::new()
        .route("/auth/login", axum::routing::post(api::auth::login))
        .with_state(state);

    let response = app
        .clone()
        .oneshot(login_request("olena", "correct_horse"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(login_request("olena", "wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Unknown users get the same answer as a wrong password
    let response = app
        .oneshot(login_request("nobody", "correct_horse"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let state = setup_test_state().await;
    create_user(&state, "olena", "secret123").await;

    let err = user_service::register(
        &state,
        RegisterInput {
            username: "olena".into(),
            email: "other@example.com".into(),
            password: "secret123".into(),
            date_of_birth: None,
            gender: None,
            region: None,
            photo: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, mandrivka::domain::DomainError::Conflict(_)));
}

#[tokio::test]
async fn test_cannot_delete_another_account() {
    let state = setup_test_state().await;
    let olena = create_user(&state, "olena", "secret123").await;
    let taras = create_user(&state, "taras", "secret123").await;
    let token = create_jwt(taras, "taras", "user").unwrap();

    let app = Router::new()
        .route(
            "/users/:id",
            axum::routing::delete(api::user::delete_user),
        )
        .with_state(state.clone());

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/users/{}", olena))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(state.user_repo.find_by_id(olena).await.unwrap().is_some());

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/users/{}", taras))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(state.user_repo.find_by_id(taras).await.unwrap().is_none());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let state = setup_test_state().await;

    let app = Router::new()
        .route("/auth/me", axum::routing::get(api::auth::me))
        .route("/posts", axum::routing::get(api::post::list_posts))
        .with_state(state);

    for uri in ["/auth/me", "/posts"] {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let req = Request::builder()
        .uri("/auth/me")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
