use std::env;
use std::path::PathBuf;

use crate::domain::geo::DEFAULT_THRESHOLD_M;

/// Upper bound for `MAX_FIX_AGE_SECS` and `LOCATION_TIMEOUT_SECS`
pub const MAX_LOCATION_WINDOW_SECS: i64 = 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    /// Where visit photos are written and served from
    pub photo_dir: PathBuf,
    /// Global proximity threshold; places may override it
    pub proximity_threshold_m: f64,
    /// Oldest acceptable location fix, in seconds
    pub max_fix_age_secs: i64,
    /// How long to wait for a location fix before giving up
    pub location_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://mandrivka.db?mode=rwc".to_string(),
            port: 8000,
            cors_allowed_origins: Vec::new(),
            profile: "default".to_string(),
            photo_dir: PathBuf::from("photos"),
            proximity_threshold_m: DEFAULT_THRESHOLD_M,
            max_fix_age_secs: 30,
            location_timeout_secs: 15,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                defaults.database_url.clone()
            } else {
                format!("sqlite://mandrivka_{}.db?mode=rwc", profile)
            }
        });

        let proximity_threshold_m = env::var("PROXIMITY_THRESHOLD_M")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .unwrap_or(defaults.proximity_threshold_m);

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(Vec::new),
            photo_dir: env::var("PHOTO_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.photo_dir),
            proximity_threshold_m,
            max_fix_age_secs: env::var("MAX_FIX_AGE_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|v| (1..=MAX_LOCATION_WINDOW_SECS).contains(v))
                .unwrap_or(defaults.max_fix_age_secs),
            location_timeout_secs: env::var("LOCATION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| (1..=MAX_LOCATION_WINDOW_SECS as u64).contains(v))
                .unwrap_or(defaults.location_timeout_secs),
            profile,
        }
    }
}
