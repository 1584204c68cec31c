//! Device location readings and their freshness rules
//!
//! A gated action must be evaluated against a fix acquired *after* the user
//! initiated it. The checks below take explicit instants so they stay pure.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::geo::GeoPoint;

/// Tolerated clock difference between the device and the core
pub const CLOCK_SKEW_ALLOWANCE_MS: i64 = 2_000;

/// A timestamped reading from the device's location service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub point: GeoPoint,
    pub captured_at: DateTime<Utc>,
    /// Horizontal accuracy radius reported by the device, in meters
    #[serde(default)]
    pub accuracy_m: Option<f64>,
}

impl LocationFix {
    pub fn new(point: GeoPoint, captured_at: DateTime<Utc>) -> Self {
        Self {
            point,
            captured_at,
            accuracy_m: None,
        }
    }

    /// Reject fixes taken before the action started or older than `max_age`.
    pub fn ensure_fresh(
        &self,
        initiated_at: DateTime<Utc>,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> Result<(), LocationError> {
        let skew = Duration::milliseconds(CLOCK_SKEW_ALLOWANCE_MS);
        // Differences only: client instants may sit at chrono's limits
        let age = now - self.captured_at;
        let lag = initiated_at - self.captured_at;

        if lag > skew || age > max_age {
            return Err(LocationError::Stale {
                age_ms: age.num_milliseconds(),
            });
        }
        if age < -skew {
            return Err(LocationError::Unavailable(format!(
                "fix timestamp {} is in the future",
                self.captured_at.to_rfc3339()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationError {
    /// The user refused location access
    PermissionDenied,
    /// Hardware or service failure
    Unavailable(String),
    /// No fix arrived in time
    Timeout,
    /// The fix predates the action or is too old
    Stale { age_ms: i64 },
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "Location permission denied"),
            LocationError::Unavailable(msg) => write!(f, "Location unavailable: {}", msg),
            LocationError::Timeout => write!(f, "Timed out waiting for a location fix"),
            LocationError::Stale { age_ms } => {
                write!(f, "Location fix is stale ({} ms old)", age_ms)
            }
        }
    }
}

impl std::error::Error for LocationError {}

/// Source of current device positions
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Acquire a new fix; implementations must not hand back a cached one
    async fn current_fix(&self) -> Result<LocationFix, LocationError>;
}

/// Provider backed by a fix the client already acquired and reported
pub struct ReportedLocation {
    fix: Option<LocationFix>,
}

impl ReportedLocation {
    pub fn new(fix: Option<LocationFix>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl LocationProvider for ReportedLocation {
    async fn current_fix(&self) -> Result<LocationFix, LocationError> {
        self.fix.ok_or_else(|| {
            LocationError::Unavailable("client did not report a position".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(captured_at: DateTime<Utc>) -> LocationFix {
        LocationFix::new(GeoPoint::new(49.84, 24.03).unwrap(), captured_at)
    }

    #[test]
    fn fix_after_initiation_is_fresh() {
        let initiated = Utc::now();
        let fix = fix_at(initiated + Duration::seconds(1));
        let now = initiated + Duration::seconds(3);
        assert!(fix.ensure_fresh(initiated, now, Duration::seconds(30)).is_ok());
    }

    #[test]
    fn fix_before_initiation_is_stale() {
        let initiated = Utc::now();
        let fix = fix_at(initiated - Duration::minutes(5));
        let err = fix
            .ensure_fresh(initiated, initiated, Duration::hours(1))
            .unwrap_err();
        assert!(matches!(err, LocationError::Stale { .. }));
    }

    #[test]
    fn old_fix_is_stale() {
        let initiated = Utc::now() - Duration::minutes(10);
        let fix = fix_at(initiated + Duration::seconds(1));
        let now = initiated + Duration::minutes(10);
        assert!(matches!(
            fix.ensure_fresh(initiated, now, Duration::seconds(30)),
            Err(LocationError::Stale { .. })
        ));
    }

    #[test]
    fn future_fix_is_rejected() {
        let now = Utc::now();
        let fix = fix_at(now + Duration::minutes(1));
        assert!(matches!(
            fix.ensure_fresh(now, now, Duration::seconds(30)),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[test]
    fn far_future_fix_is_rejected_without_panicking() {
        let captured: DateTime<Utc> =
            serde_json::from_str("\"+262142-12-31T23:59:59Z\"").unwrap();
        let now = Utc::now();
        assert!(matches!(
            fix_at(captured).ensure_fresh(now, now, Duration::seconds(30)),
            Err(LocationError::Unavailable(_))
        ));
    }

    #[test]
    fn far_past_fix_is_stale_without_panicking() {
        let now = Utc::now();
        assert!(matches!(
            fix_at(DateTime::<Utc>::MIN_UTC).ensure_fresh(now, now, Duration::seconds(30)),
            Err(LocationError::Stale { .. })
        ));
    }

    #[test]
    fn extreme_initiation_instant_does_not_panic() {
        let now = Utc::now();
        let fix = fix_at(now);
        assert!(fix.ensure_fresh(DateTime::<Utc>::MIN_UTC, now, Duration::seconds(30)).is_ok());
        assert!(matches!(
            fix.ensure_fresh(DateTime::<Utc>::MAX_UTC, now, Duration::seconds(30)),
            Err(LocationError::Stale { .. })
        ));
    }

    #[tokio::test]
    async fn reported_location_returns_the_reported_fix() {
        let fix = fix_at(Utc::now());
        assert_eq!(ReportedLocation::new(Some(fix)).current_fix().await, Ok(fix));
    }

    #[tokio::test]
    async fn reported_location_without_fix_is_unavailable() {
        let provider = ReportedLocation::new(None);
        assert!(matches!(
            provider.current_fix().await,
            Err(LocationError::Unavailable(_))
        ));
    }
}
