// FFI API module for flutter_rust_bridge
// Exposes the proximity gate and visit flow to Flutter without the HTTP layer

use chrono::{DateTime, Utc};
use flutter_rust_bridge::frb;
use std::sync::OnceLock;

use crate::domain::{GeoPoint, LocationFix, Place, Post, geo::DEFAULT_THRESHOLD_M};
use crate::infrastructure::AppState;
use crate::infrastructure::config::Config;
use crate::services::{GateDecision, MarkVisitedInput, place_service, visit_service};

// Global state (initialized once on app start)
static STATE: OnceLock<AppState> = OnceLock::new();

/// Install a panic hook to prevent crashes on iOS
/// This converts panics into logs instead of aborting
fn install_panic_hook() {
    use std::sync::Once;
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|panic_info| {
            let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "unknown location".to_string());
            eprintln!("FFI PANIC at {}: {}", location, message);
        }));
    });
}

fn state() -> Result<&'static AppState, String> {
    STATE.get().ok_or_else(|| "Backend not initialized".to_string())
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("Invalid timestamp '{}': {}", value, e))
}

// ============ FFI-Compatible Data Structures ============

#[frb(dart_metadata=("freezed"))]
pub struct FrbProximityResult {
    pub distance_meters: f64,
    pub within_threshold: bool,
    pub threshold_meters: f64,
    pub message: String,
}

impl From<crate::domain::ProximityResult> for FrbProximityResult {
    fn from(r: crate::domain::ProximityResult) -> Self {
        FrbProximityResult {
            message: r.distance_label(),
            distance_meters: r.distance_meters,
            within_threshold: r.within_threshold,
            threshold_meters: r.threshold_meters,
        }
    }
}

#[frb(dart_metadata=("freezed"))]
pub struct FrbPlace {
    pub id: i32,
    pub name: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

impl From<Place> for FrbPlace {
    fn from(p: Place) -> Self {
        FrbPlace {
            id: p.id,
            name: p.name,
            city: p.city,
            latitude: p.latitude,
            longitude: p.longitude,
            description: p.description,
        }
    }
}

#[frb(dart_metadata=("freezed"))]
pub struct FrbPost {
    pub id: i32,
    pub place_id: i32,
    pub description: Option<String>,
    pub photo_path: Option<String>,
    pub distance_m: f64,
    pub created_at: String,
}

impl From<Post> for FrbPost {
    fn from(p: Post) -> Self {
        FrbPost {
            id: p.id,
            place_id: p.place_id,
            description: p.description,
            photo_path: p.photo_path,
            distance_m: p.distance_m,
            created_at: p.created_at,
        }
    }
}

/// A position fix as captured by the device plugin
#[frb(dart_metadata=("freezed"))]
pub struct FrbLocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// RFC 3339
    pub captured_at: String,
    pub accuracy_m: Option<f64>,
}

impl FrbLocationFix {
    fn into_fix(self) -> Result<LocationFix, String> {
        let point = GeoPoint::new(self.latitude, self.longitude).map_err(|e| e.to_string())?;
        let mut fix = LocationFix::new(point, parse_instant(&self.captured_at)?);
        fix.accuracy_m = self.accuracy_m;
        Ok(fix)
    }
}

// ============ Initialization ============

/// Initialize the FFI backend with database and photo directory
/// Must be called before any other FFI functions
pub async fn init_backend(db_path: String, photo_dir: String) -> Result<String, String> {
    // Install panic hook first thing to catch any panics
    install_panic_hook();

    // The host app may already have installed a subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mandrivka=info".into()),
        )
        .with_writer(std::io::stderr)
        .try_init();

    if STATE.get().is_some() {
        return Ok("Already initialized".to_string());
    }

    let mut config = Config::from_env();
    config.database_url = format!("sqlite:{}?mode=rwc", db_path);
    config.photo_dir = photo_dir.into();
    tracing::info!("FFI: Opening database at {}", config.database_url);

    match crate::db::init_db(&config.database_url).await {
        Ok(conn) => match STATE.set(AppState::with_config(conn, config)) {
            Ok(_) => Ok("Backend initialized successfully".to_string()),
            Err(_) => Err("Failed to set backend state".to_string()),
        },
        Err(e) => Err(format!("Database initialization failed: {}", e)),
    }
}

// ============ Health Check ============

/// Check if the FFI backend is healthy
#[frb(sync)]
pub fn health_check() -> String {
    if STATE.get().is_some() {
        "OK".to_string()
    } else {
        "NOT_INITIALIZED".to_string()
    }
}

/// Get the FFI backend version
#[frb(sync)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// ============ Proximity ============

/// Pure distance check; usable before the backend is initialized
#[frb(sync)]
pub fn check_proximity(
    current_latitude: f64,
    current_longitude: f64,
    target_latitude: f64,
    target_longitude: f64,
    threshold_m: Option<f64>,
) -> Result<FrbProximityResult, String> {
    let current = GeoPoint::new(current_latitude, current_longitude).map_err(|e| e.to_string())?;
    let target = GeoPoint::new(target_latitude, target_longitude).map_err(|e| e.to_string())?;

    crate::domain::check_proximity(current, target, threshold_m.unwrap_or(DEFAULT_THRESHOLD_M))
        .map(FrbProximityResult::from)
        .map_err(|e| e.to_string())
}

/// Gate check for a place; `within_threshold` is false when the user is too far
pub async fn check_place_proximity(
    place_id: i32,
    fix: FrbLocationFix,
    initiated_at: Option<String>,
) -> Result<FrbProximityResult, String> {
    let state = state()?;
    let fix = fix.into_fix()?;
    let initiated_at = initiated_at.as_deref().map(parse_instant).transpose()?;

    let decision = visit_service::check_place_proximity(state, place_id, &fix, initiated_at)
        .await
        .map_err(|e| e.to_string())?;

    Ok(match decision {
        GateDecision::Allowed(r) | GateDecision::Denied(r) => r.into(),
    })
}

/// Record a visit; errors carry the user-facing message (e.g. the distance)
pub async fn mark_visited(
    user_id: i32,
    place_id: i32,
    fix: FrbLocationFix,
    initiated_at: Option<String>,
    description: Option<String>,
    photo: Option<Vec<u8>>,
) -> Result<FrbPost, String> {
    let state = state()?;
    let input = MarkVisitedInput {
        place_id,
        fix: fix.into_fix()?,
        initiated_at: initiated_at.as_deref().map(parse_instant).transpose()?,
        description,
        photo,
    };

    visit_service::mark_visited(state, user_id, input)
        .await
        .map(FrbPost::from)
        .map_err(|e| e.to_string())
}

pub async fn list_places(city: Option<String>) -> Result<Vec<FrbPlace>, String> {
    let state = state()?;
    place_service::list_places(state, city)
        .await
        .map(|places| places.into_iter().map(FrbPlace::from).collect())
        .map_err(|e| e.to_string())
}

// ============ HTTP Server (FFI) ============

/// Start the embedded HTTP server; returns the port actually bound
pub async fn start_http_server(port: u16) -> Result<u16, String> {
    let state = state()?.clone();
    crate::server::start_server(state, port).await
}
