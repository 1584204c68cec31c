// Server module - Provides reusable HTTP server functionality
// Used by both CLI (main.rs) and FFI (frb.rs)

use axum::Router;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api;
use crate::api_docs::ApiDoc;
use crate::infrastructure::AppState;

// Global flag to track if server is running
static SERVER_RUNNING: AtomicBool = AtomicBool::new(false);

/// Check if the HTTP server is currently running
pub fn is_server_running() -> bool {
    SERVER_RUNNING.load(Ordering::SeqCst)
}

/// Build the full application router: API, photos, docs and CORS
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let photos = ServeDir::new(state.photos.root().to_path_buf());

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api::api_router(state))
        .nest_service("/photos", photos)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let mut allowed = Vec::new();
    for origin in origins {
        match origin.parse::<axum::http::HeaderValue>() {
            Ok(v) => allowed.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Find an available port starting from the preferred port on a specific IP
pub fn find_available_port_on_ip(preferred_port: u16, ip: &str) -> Option<u16> {
    // Try preferred port first
    if TcpListener::bind((ip, preferred_port)).is_ok() {
        return Some(preferred_port);
    }

    // Scan next 100 ports
    ((preferred_port.saturating_add(1))..(preferred_port.saturating_add(100)))
        .find(|&port| TcpListener::bind((ip, port)).is_ok())
}

/// Start the HTTP server on a background task
/// Returns the actual port used
pub async fn start_server(state: AppState, preferred_port: u16) -> Result<u16, String> {
    // Check if already running
    if SERVER_RUNNING.swap(true, Ordering::SeqCst) {
        return Err("HTTP server is already running".to_string());
    }

    // Try 0.0.0.0 first so phones on the LAN can reach it, then fall back to loopback
    let (port, addr) = if let Some(p) = find_available_port_on_ip(preferred_port, "0.0.0.0") {
        (p, SocketAddr::from(([0, 0, 0, 0], p)))
    } else if let Some(p) = find_available_port_on_ip(preferred_port, "127.0.0.1") {
        tracing::warn!("Falling back to 127.0.0.1 binding");
        (p, SocketAddr::from(([127, 0, 0, 1], p)))
    } else {
        SERVER_RUNNING.store(false, Ordering::SeqCst);
        return Err("Failed to find available port on 0.0.0.0 or 127.0.0.1".to_string());
    };

    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            SERVER_RUNNING.store(false, Ordering::SeqCst);
            return Err(format!("Failed to bind to {}: {}", addr, e));
        }
    };

    tracing::info!("Embedded HTTP server started on {}", addr);

    // Spawn server on background task (won't block FFI)
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
        SERVER_RUNNING.store(false, Ordering::SeqCst);
    });

    Ok(port)
}
