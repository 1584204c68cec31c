//! Proximity Gate - decides whether a location-bound action may proceed
//!
//! The gate never talks to the user. It hands back a [`GateDecision`] and the
//! caller decides whether to alert, abort or continue to the camera.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::domain::{
    DomainError, GeoPoint, LocationError, LocationFix, LocationProvider, Place, ProximityResult,
    check_proximity,
};
use crate::infrastructure::config::Config;

/// Tagged outcome of a gate evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "decision", content = "result", rename_all = "snake_case")]
pub enum GateDecision {
    Allowed(ProximityResult),
    Denied(ProximityResult),
}

impl GateDecision {
    pub fn result(&self) -> &ProximityResult {
        match self {
            GateDecision::Allowed(r) | GateDecision::Denied(r) => r,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed(_))
    }

    /// Convert a denial into [`DomainError::TooFar`]
    pub fn into_allowed(self) -> Result<ProximityResult, DomainError> {
        match self {
            GateDecision::Allowed(r) => Ok(r),
            GateDecision::Denied(r) => Err(DomainError::TooFar {
                distance_m: r.distance_meters,
                threshold_m: r.threshold_meters,
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProximityGate {
    threshold_m: f64,
    max_fix_age: Duration,
    fix_timeout: std::time::Duration,
}

impl ProximityGate {
    pub fn new(threshold_m: f64, max_fix_age: Duration, fix_timeout: std::time::Duration) -> Self {
        Self {
            threshold_m,
            max_fix_age,
            fix_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.proximity_threshold_m,
            Duration::seconds(config.max_fix_age_secs),
            std::time::Duration::from_secs(config.location_timeout_secs),
        )
    }

    /// Default start of an action whose initiation instant was not reported:
    /// only the age limit then constrains the fix.
    pub fn earliest_initiation(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.max_fix_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Threshold for a place: its own radius when set and sane, else the global one
    pub fn threshold_for(&self, place: &Place) -> f64 {
        place
            .visit_radius_m
            .filter(|r| r.is_finite() && *r >= 0.0)
            .unwrap_or(self.threshold_m)
    }

    /// Validate the fix and compare it with `target`
    pub fn evaluate(
        &self,
        fix: &LocationFix,
        initiated_at: DateTime<Utc>,
        now: DateTime<Utc>,
        target: GeoPoint,
        threshold_m: f64,
    ) -> Result<GateDecision, DomainError> {
        fix.ensure_fresh(initiated_at, now, self.max_fix_age)?;

        let result = check_proximity(fix.point, target, threshold_m)?;
        tracing::debug!(
            "Proximity check {} -> {}: {:.2}m (threshold {:.2}m)",
            fix.point,
            target,
            result.distance_meters,
            threshold_m
        );

        Ok(if result.within_threshold {
            GateDecision::Allowed(result)
        } else {
            GateDecision::Denied(result)
        })
    }

    /// Run a gated action started at `initiated_at`: wait for a fix from
    /// `provider`, then evaluate it. Permission, hardware and timeout
    /// failures abort without retrying.
    pub async fn run(
        &self,
        provider: &dyn LocationProvider,
        initiated_at: DateTime<Utc>,
        target: GeoPoint,
        threshold_m: f64,
    ) -> Result<GateDecision, DomainError> {
        let fix = tokio::time::timeout(self.fix_timeout, provider.current_fix())
            .await
            .map_err(|_| LocationError::Timeout)?
            .inspect_err(|e| tracing::warn!("Gated action aborted: {}", e))?;

        self.evaluate(&fix, initiated_at, Utc::now(), target, threshold_m)
    }
}

impl Default for ProximityGate {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedProvider(Result<LocationFix, LocationError>);

    #[async_trait]
    impl LocationProvider for FixedProvider {
        async fn current_fix(&self) -> Result<LocationFix, LocationError> {
            self.0.clone()
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl LocationProvider for SlowProvider {
        async fn current_fix(&self) -> Result<LocationFix, LocationError> {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Err(LocationError::Unavailable("never".into()))
        }
    }

    fn opera() -> GeoPoint {
        GeoPoint::new(49.8441, 24.0262).unwrap()
    }

    fn gate() -> ProximityGate {
        ProximityGate::new(
            50.0,
            Duration::seconds(30),
            std::time::Duration::from_millis(200),
        )
    }

    fn place(radius: Option<f64>) -> Place {
        Place {
            id: 1,
            name: "Lviv Opera".into(),
            city: "Lviv".into(),
            latitude: Some(49.8441),
            longitude: Some(24.0262),
            description: None,
            visit_radius_m: radius,
        }
    }

    #[tokio::test]
    async fn close_fix_is_allowed() {
        let here = GeoPoint::new(49.8442, 24.0263).unwrap();
        let provider = FixedProvider(Ok(LocationFix::new(here, Utc::now() + Duration::milliseconds(10))));

        let decision = gate().run(&provider, Utc::now(), opera(), 50.0).await.unwrap();
        assert!(decision.is_allowed());
        assert!(decision.result().distance_meters < 50.0);
    }

    #[tokio::test]
    async fn far_fix_is_denied_with_distance() {
        let far = GeoPoint::new(49.8397, 24.0297).unwrap();
        let provider = FixedProvider(Ok(LocationFix::new(far, Utc::now() + Duration::milliseconds(10))));

        let decision = gate().run(&provider, Utc::now(), opera(), 50.0).await.unwrap();
        assert!(!decision.is_allowed());
        match decision.into_allowed() {
            Err(DomainError::TooFar { distance_m, threshold_m }) => {
                assert!(distance_m > 400.0);
                assert_eq!(threshold_m, 50.0);
            }
            other => panic!("expected TooFar, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn cached_fix_is_refused() {
        let here = GeoPoint::new(49.8441, 24.0262).unwrap();
        let provider = FixedProvider(Ok(LocationFix::new(here, Utc::now() - Duration::minutes(10))));

        let err = gate().run(&provider, Utc::now(), opera(), 50.0).await.unwrap_err();
        assert!(matches!(err, DomainError::LocationUnavailable(_)));
    }

    #[tokio::test]
    async fn permission_denied_aborts() {
        let provider = FixedProvider(Err(LocationError::PermissionDenied));
        let err = gate().run(&provider, Utc::now(), opera(), 50.0).await.unwrap_err();
        assert!(matches!(err, DomainError::LocationUnavailable(msg) if msg.contains("permission")));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let err = gate().run(&SlowProvider, Utc::now(), opera(), 50.0).await.unwrap_err();
        assert!(matches!(err, DomainError::LocationUnavailable(msg) if msg.contains("Timed out")));
    }

    #[tokio::test]
    async fn fix_reported_before_processing_passes_when_initiated_earlier() {
        // The client tapped, captured a fix, and the request arrived 5 s later
        let initiated_at = Utc::now() - Duration::seconds(6);
        let fix = LocationFix::new(opera(), initiated_at + Duration::seconds(1));
        let provider = FixedProvider(Ok(fix));

        let decision = gate()
            .run(&provider, initiated_at, opera(), 50.0)
            .await
            .unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn place_radius_overrides_global_threshold() {
        assert_eq!(gate().threshold_for(&place(Some(120.0))), 120.0);
        assert_eq!(gate().threshold_for(&place(None)), 50.0);
        assert_eq!(gate().threshold_for(&place(Some(-5.0))), 50.0);
    }

    #[test]
    fn decision_serializes_tagged() {
        let decision = GateDecision::Denied(ProximityResult {
            distance_meters: 132.45,
            within_threshold: false,
            threshold_meters: 50.0,
        });
        let json = serde_json::to_value(decision).unwrap();
        assert_eq!(json["decision"], "denied");
        assert_eq!(json["result"]["distance_meters"], 132.45);
    }
}
