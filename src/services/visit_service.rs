//! Visit Service - the gated "mark as visited" flow

use chrono::{DateTime, Utc};

use super::proximity_service::{GateDecision, ProximityGate};
use crate::domain::{DomainError, LocationFix, NewPost, Place, Post, ReportedLocation};
use crate::infrastructure::AppState;

/// Everything the client sends when marking a place visited
#[derive(Debug, Clone)]
pub struct MarkVisitedInput {
    pub place_id: i32,
    pub fix: LocationFix,
    /// When the user tapped "mark visited"; defaults to the oldest acceptable instant
    pub initiated_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub photo: Option<Vec<u8>>,
}

async fn load_place(state: &AppState, place_id: i32) -> Result<Place, DomainError> {
    state
        .place_repo
        .find_by_id(place_id)
        .await?
        .ok_or(DomainError::NotFound)
}

/// Evaluate a reported fix against a place without recording anything
pub async fn check_place_proximity(
    state: &AppState,
    place_id: i32,
    fix: &LocationFix,
    initiated_at: Option<DateTime<Utc>>,
) -> Result<GateDecision, DomainError> {
    let place = load_place(state, place_id).await?;
    let target = place.position()?;

    let gate = ProximityGate::from_config(&state.config);
    let initiated_at = initiated_at.unwrap_or_else(|| gate.earliest_initiation(Utc::now()));

    gate.run(
        &ReportedLocation::new(Some(*fix)),
        initiated_at,
        target,
        gate.threshold_for(&place),
    )
    .await
}

/// Record a visit if, and only if, the user is close enough to the place
pub async fn mark_visited(
    state: &AppState,
    user_id: i32,
    input: MarkVisitedInput,
) -> Result<Post, DomainError> {
    let place = load_place(state, input.place_id).await?;

    // A place without coordinates can never be visited
    let target = place.position().inspect_err(|e| {
        tracing::warn!("Place {} cannot be gated: {}", place.id, e);
    })?;

    let gate = ProximityGate::from_config(&state.config);
    let initiated_at = input
        .initiated_at
        .unwrap_or_else(|| gate.earliest_initiation(Utc::now()));

    let result = gate
        .run(
            &ReportedLocation::new(Some(input.fix)),
            initiated_at,
            target,
            gate.threshold_for(&place),
        )
        .await?
        .into_allowed()
        .inspect_err(|e| tracing::info!("User {} denied visit to place {}: {}", user_id, place.id, e))?;

    if state
        .post_repo
        .find_by_user_and_place(user_id, place.id)
        .await?
        .is_some()
    {
        return Err(DomainError::Conflict(
            "Place already marked as visited".to_string(),
        ));
    }

    let photo_path = match input.photo {
        Some(bytes) => Some(state.photos.save(bytes).await?),
        None => None,
    };

    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let created = state
        .post_repo
        .create(NewPost {
            user_id,
            place_id: place.id,
            description,
            photo_path: photo_path.clone(),
            position: input.fix.point,
            distance_m: result.distance_meters,
        })
        .await;

    match created {
        Ok(post) => {
            tracing::info!(
                "User {} visited {} ({}) at {:.2}m",
                user_id,
                place.name,
                place.city,
                result.distance_meters
            );
            Ok(post)
        }
        Err(e) => {
            if let Some(path) = photo_path {
                state.photos.remove(&path).await;
            }
            Err(e)
        }
    }
}

/// Posts of a user, newest first
pub async fn list_posts(state: &AppState, user_id: i32) -> Result<Vec<Post>, DomainError> {
    state.post_repo.find_by_user(user_id).await
}

pub async fn has_visited(state: &AppState, user_id: i32, place_id: i32) -> Result<bool, DomainError> {
    Ok(state
        .post_repo
        .find_by_user_and_place(user_id, place_id)
        .await?
        .is_some())
}

/// Delete one of the caller's own posts together with its photo
pub async fn delete_post(state: &AppState, user_id: i32, post_id: i32) -> Result<(), DomainError> {
    let post = state
        .post_repo
        .find_by_id(post_id)
        .await?
        .ok_or(DomainError::NotFound)?;

    if post.user_id != user_id {
        return Err(DomainError::Forbidden(
            "Cannot delete another user's post".to_string(),
        ));
    }

    state.post_repo.delete(post_id).await?;
    if let Some(path) = post.photo_path {
        state.photos.remove(&path).await;
    }
    Ok(())
}
