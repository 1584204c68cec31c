//! Place Service - points of interest on the map

use crate::domain::{DomainError, GeoPoint, NewPlace, Place};
use crate::infrastructure::AppState;

pub async fn list_places(state: &AppState, city: Option<String>) -> Result<Vec<Place>, DomainError> {
    let city = city.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    state.place_repo.find_all(city).await
}

pub async fn get_place(state: &AppState, id: i32) -> Result<Place, DomainError> {
    state
        .place_repo
        .find_by_id(id)
        .await?
        .ok_or(DomainError::NotFound)
}

pub async fn list_cities(state: &AppState) -> Result<Vec<String>, DomainError> {
    state.place_repo.cities().await
}

pub fn validate_new_place(input: &NewPlace) -> Result<(), DomainError> {
    if input.name.trim().is_empty() || input.city.trim().is_empty() {
        return Err(DomainError::Validation(
            "Place name and city are required".to_string(),
        ));
    }

    match (input.latitude, input.longitude) {
        (Some(lat), Some(lon)) => {
            GeoPoint::new(lat, lon)?;
        }
        (None, None) => {}
        _ => {
            return Err(DomainError::InvalidInput(
                "latitude and longitude must be given together".to_string(),
            ));
        }
    }

    if let Some(radius) = input.visit_radius_m {
        if !radius.is_finite() || radius < 0.0 {
            return Err(DomainError::Validation(
                "visit_radius_m must be a non-negative number".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn create_place(state: &AppState, input: NewPlace) -> Result<Place, DomainError> {
    validate_new_place(&input)?;
    let place = state.place_repo.create(input).await?;
    tracing::info!("Created place {} in {} (id {})", place.name, place.city, place.id);
    Ok(place)
}
