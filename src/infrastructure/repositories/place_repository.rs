//! SeaORM implementation of PlaceRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::domain::{DomainError, NewPlace, Place, PlaceRepository};
use crate::models::place::{self, ActiveModel, Column, Entity as PlaceEntity};

impl From<place::Model> for Place {
    fn from(p: place::Model) -> Self {
        Place {
            id: p.id,
            name: p.name,
            city: p.city,
            latitude: p.latitude,
            longitude: p.longitude,
            description: p.description,
            visit_radius_m: p.visit_radius_m,
        }
    }
}

/// SeaORM-based implementation of PlaceRepository
pub struct SeaOrmPlaceRepository {
    db: DatabaseConnection,
}

impl SeaOrmPlaceRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PlaceRepository for SeaOrmPlaceRepository {
    async fn find_all(&self, city: Option<String>) -> Result<Vec<Place>, DomainError> {
        let mut query = PlaceEntity::find();

        if let Some(city) = city {
            query = query.filter(Column::City.eq(city));
        }

        let places = query
            .order_by_asc(Column::City)
            .order_by_asc(Column::Name)
            .all(&self.db)
            .await?;

        Ok(places.into_iter().map(Place::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Place>, DomainError> {
        let place = PlaceEntity::find_by_id(id).one(&self.db).await?;
        Ok(place.map(Place::from))
    }

    async fn create(&self, input: NewPlace) -> Result<Place, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let place = ActiveModel {
            name: Set(input.name),
            city: Set(input.city),
            latitude: Set(input.latitude),
            longitude: Set(input.longitude),
            description: Set(input.description),
            visit_radius_m: Set(input.visit_radius_m),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = place.insert(&self.db).await?;
        Ok(Place::from(result))
    }

    async fn count(&self) -> Result<u64, DomainError> {
        Ok(PlaceEntity::find().count(&self.db).await?)
    }

    async fn cities(&self) -> Result<Vec<String>, DomainError> {
        let cities: Vec<String> = PlaceEntity::find()
            .select_only()
            .column(Column::City)
            .distinct()
            .order_by_asc(Column::City)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(cities)
    }
}
