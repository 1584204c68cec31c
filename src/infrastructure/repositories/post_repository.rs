//! SeaORM implementation of PostRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::map_unique_violation;
use crate::domain::{DomainError, NewPost, Post, PostRepository};
use crate::models::place::{self, Entity as PlaceEntity};
use crate::models::post::{self, ActiveModel, Column, Entity as PostEntity};

fn to_post(post: post::Model, place: Option<place::Model>) -> Post {
    Post {
        id: post.id,
        user_id: post.user_id,
        place_id: post.place_id,
        description: post.description,
        photo_path: post.photo_path,
        latitude: post.latitude,
        longitude: post.longitude,
        distance_m: post.distance_m,
        created_at: post.created_at,
        place_name: place.as_ref().map(|p| p.name.clone()),
        city: place.map(|p| p.city),
    }
}

/// SeaORM-based implementation of PostRepository
pub struct SeaOrmPostRepository {
    db: DatabaseConnection,
}

impl SeaOrmPostRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn find_by_user(&self, user_id: i32) -> Result<Vec<Post>, DomainError> {
        let posts = PostEntity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .find_also_related(PlaceEntity)
            .all(&self.db)
            .await?;

        Ok(posts
            .into_iter()
            .map(|(post, place)| to_post(post, place))
            .collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, DomainError> {
        let result = PostEntity::find_by_id(id)
            .find_also_related(PlaceEntity)
            .one(&self.db)
            .await?;

        Ok(result.map(|(post, place)| to_post(post, place)))
    }

    async fn find_by_user_and_place(
        &self,
        user_id: i32,
        place_id: i32,
    ) -> Result<Option<Post>, DomainError> {
        let result = PostEntity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::PlaceId.eq(place_id))
            .find_also_related(PlaceEntity)
            .one(&self.db)
            .await?;

        Ok(result.map(|(post, place)| to_post(post, place)))
    }

    async fn create(&self, input: NewPost) -> Result<Post, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let post = ActiveModel {
            user_id: Set(input.user_id),
            place_id: Set(input.place_id),
            description: Set(input.description),
            photo_path: Set(input.photo_path),
            latitude: Set(input.position.latitude()),
            longitude: Set(input.position.longitude()),
            distance_m: Set(input.distance_m),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = post
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, "Place already marked as visited"))?;

        let place = PlaceEntity::find_by_id(result.place_id).one(&self.db).await?;
        Ok(to_post(result, place))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = PostEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
