use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use mandrivka::config::Config;
use mandrivka::db;
use mandrivka::infrastructure::AppState;
use mandrivka::server::build_router;
use serde_json::{Value, json};
use std::path::PathBuf;
use tower::util::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "mandrivka-test-boundary";

// Rynok Square, Lviv
const PLACE_LAT: f64 = 49.8419;
const PLACE_LON: f64 = 24.0315;

fn temp_photo_dir() -> PathBuf {
    std::env::temp_dir().join(format!("mandrivka-test-{}", uuid::Uuid::new_v4()))
}

// Helper to create the full application against an in-memory database
async fn setup_app() -> (Router, PathBuf) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");

    let photo_dir = temp_photo_dir();
    let config = Config {
        photo_dir: photo_dir.clone(),
        ..Config::default()
    };

    (build_router(AppState::with_config(db, config)), photo_dir)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_request(token: &str, fields: &[(&str, String)], photo: Option<Vec<u8>>) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some(photo) = photo {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"visit.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(&photo);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/posts")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

fn png_photo(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([30, 90, 200]));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn visit_fields(place_id: i64, lat: f64, lon: f64, captured_at: chrono::DateTime<Utc>) -> Vec<(&'static str, String)> {
    vec![
        ("place_id", place_id.to_string()),
        ("latitude", lat.to_string()),
        ("longitude", lon.to_string()),
        ("captured_at", captured_at.to_rfc3339()),
        ("description", "  Coffee on the square  ".to_string()),
    ]
}

async fn register(app: &Router, username: &str) -> (String, i64) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "secret123",
                "region": "Lviv"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_i64().unwrap(),
    )
}

async fn create_place(app: &Router, token: &str, name: &str, lat: Option<f64>, lon: Option<f64>) -> i64 {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/places",
            Some(token),
            json!({ "name": name, "city": "Lviv", "latitude": lat, "longitude": lon }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create place failed: {}", body);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app().await;
    let (status, body) = send(&app, get_request("/api/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let (app, _) = setup_app().await;
    let (token, id) = register(&app, "traveller").await;

    let (status, body) = send(&app, get_request("/api/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64(), Some(id));
    assert_eq!(body["region"], "Lviv");
    assert!(body.get("password_hash").is_none());

    // Login by email works as well as by username
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "email": "traveller@example.com", "password": "secret123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_raw_proximity_check() {
    let (app, _) = setup_app().await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/proximity",
            None,
            json!({
                "current": { "latitude": PLACE_LAT, "longitude": PLACE_LON },
                "target": { "latitude": PLACE_LAT + 0.001, "longitude": PLACE_LON }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["within_threshold"], false);
    assert_eq!(body["threshold_meters"], 50.0);
    let distance = body["distance_meters"].as_f64().unwrap();
    assert!((distance - 111.19).abs() < 0.5, "distance was {}", distance);
}

#[tokio::test]
async fn test_place_proximity_decision() {
    let (app, _) = setup_app().await;
    let (token, _) = register(&app, "traveller").await;
    let place_id = create_place(&app, &token, "Rynok Square", Some(PLACE_LAT), Some(PLACE_LON)).await;

    let uri = format!("/api/places/{}/proximity", place_id);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &uri,
            Some(&token),
            json!({ "latitude": PLACE_LAT, "longitude": PLACE_LON, "captured_at": Utc::now() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
    assert_eq!(body["gate"]["decision"], "allowed");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &uri,
            Some(&token),
            json!({ "latitude": PLACE_LAT + 0.002, "longitude": PLACE_LON, "captured_at": Utc::now() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
    assert_eq!(body["gate"]["decision"], "denied");
    assert!(body["message"].as_str().unwrap().starts_with("Distance: 222."));
}

#[tokio::test]
async fn test_visit_flow_end_to_end() {
    let (app, photo_dir) = setup_app().await;
    let (token, user_id) = register(&app, "traveller").await;
    let place_id = create_place(&app, &token, "Rynok Square", Some(PLACE_LAT), Some(PLACE_LON)).await;
    create_place(&app, &token, "Vysokyi Zamok", Some(49.8483), Some(24.0393)).await;

    // Too far: about 111m north
    let (status, body) = send(
        &app,
        multipart_request(
            &token,
            &visit_fields(place_id, PLACE_LAT + 0.001, PLACE_LON, Utc::now()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["distance_m"].as_f64().unwrap() > 100.0);
    assert!(body["error"].as_str().unwrap().contains("Distance: 111."));

    // Stale fix
    let (status, _) = send(
        &app,
        multipart_request(
            &token,
            &visit_fields(place_id, PLACE_LAT, PLACE_LON, Utc::now() - Duration::minutes(5)),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Nothing was recorded by the rejected attempts
    let (_, body) = send(
        &app,
        get_request(&format!("/api/places/{}/visited", place_id), Some(&token)),
    )
    .await;
    assert_eq!(body["visited"], false);

    // On the spot, with a photo
    let (status, post) = send(
        &app,
        multipart_request(
            &token,
            &visit_fields(place_id, PLACE_LAT + 0.0001, PLACE_LON, Utc::now()),
            Some(png_photo(1600, 1200)),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "visit failed: {}", post);
    assert_eq!(post["user_id"].as_i64(), Some(user_id));
    assert_eq!(post["description"], "Coffee on the square");
    assert!(post["distance_m"].as_f64().unwrap() < 50.0);

    let photo_path = post["photo_path"].as_str().unwrap().to_string();
    let stored = image::open(photo_dir.join(&photo_path)).unwrap();
    assert_eq!(stored.width(), 800);
    assert_eq!(stored.height(), 600);

    let response = app
        .clone()
        .oneshot(get_request(&format!("/photos/{}", photo_path), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // A second visit to the same place is a conflict
    let (status, _) = send(
        &app,
        multipart_request(
            &token,
            &visit_fields(place_id, PLACE_LAT, PLACE_LON, Utc::now()),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, posts) = send(&app, get_request("/api/posts", Some(&token))).await;
    assert_eq!(posts.as_array().unwrap().len(), 1);
    assert_eq!(posts[0]["place_name"], "Rynok Square");

    // Profile and album
    let (status, profile) = send(
        &app,
        get_request(&format!("/api/users/{}/profile", user_id), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["visited_count"], 1);
    assert_eq!(profile["explored_percent"], 50.0);

    let (_, album) = send(
        &app,
        get_request(&format!("/api/users/{}/album", user_id), None),
    )
    .await;
    assert_eq!(album["cities"][0]["city"], "Lviv");
    assert_eq!(album["cities"][0]["years"][0]["posts"].as_array().unwrap().len(), 1);

    // Deleting the post removes the photo file
    let post_id = post["id"].as_i64().unwrap();
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/posts/{}", post_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!photo_dir.join(&photo_path).exists());

    let _ = std::fs::remove_dir_all(&photo_dir);
}

fn follow(token: &str, id: i64) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/follows/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_follow_graph_and_friends() {
    let (app, _) = setup_app().await;
    let (alice, alice_id) = register(&app, "alice").await;
    let (bob, bob_id) = register(&app, "bob").await;
    let (_carol, carol_id) = register(&app, "carol").await;

    assert_eq!(send(&app, follow(&alice, bob_id)).await.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, follow(&alice, carol_id)).await.0, StatusCode::NO_CONTENT);
    assert_eq!(send(&app, follow(&bob, alice_id)).await.0, StatusCode::NO_CONTENT);
    // Following twice is idempotent
    assert_eq!(send(&app, follow(&bob, alice_id)).await.0, StatusCode::NO_CONTENT);

    let (_, friends) = send(
        &app,
        get_request(&format!("/api/users/{}/friends", alice_id), None),
    )
    .await;
    let friends = friends.as_array().unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0]["username"], "bob");

    let (_, followers) = send(
        &app,
        get_request(&format!("/api/users/{}/followers", carol_id), None),
    )
    .await;
    assert_eq!(followers.as_array().unwrap().len(), 1);

    let (_, profile) = send(
        &app,
        get_request(&format!("/api/users/{}/profile", carol_id), Some(&bob)),
    )
    .await;
    assert_eq!(profile["followers_count"], 1);
    assert_eq!(profile["is_following"], false);

    let (_, found) = send(&app, get_request("/api/users/search?q=CAR", Some(&alice))).await;
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["username"], "carol");
}

#[tokio::test]
async fn test_seeded_places_and_cities() {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    mandrivka::seed::seed_demo_data(&db).await.unwrap();
    // Seeding twice does not duplicate anything
    mandrivka::seed::seed_demo_data(&db).await.unwrap();

    let app = build_router(AppState::new(db));

    let (status, cities) = send(&app, get_request("/api/places/cities", None)).await;
    assert_eq!(status, StatusCode::OK);
    let cities: Vec<&str> = cities
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|c| c.as_str())
        .collect();
    assert!(cities.contains(&"Lviv"));
    assert!(cities.windows(2).all(|w| w[0] <= w[1]));

    let (_, lviv) = send(&app, get_request("/api/places?city=Lviv", None)).await;
    let lviv = lviv.as_array().unwrap();
    assert_eq!(lviv.len(), 3);
    assert!(lviv.iter().all(|p| p["city"] == "Lviv"));

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "traveller", "password": "traveller123" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
