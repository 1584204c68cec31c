//! SeaORM implementation of FollowRepository

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};

use crate::domain::{DomainError, FollowRepository};
use crate::models::follow::{ActiveModel, Column, Entity as FollowEntity};

/// SeaORM-based implementation of FollowRepository
pub struct SeaOrmFollowRepository {
    db: DatabaseConnection,
}

impl SeaOrmFollowRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl FollowRepository for SeaOrmFollowRepository {
    async fn follow(&self, follower_id: i32, followee_id: i32) -> Result<(), DomainError> {
        let edge = ActiveModel {
            follower_id: Set(follower_id),
            followee_id: Set(followee_id),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
        };

        FollowEntity::insert(edge)
            .on_conflict(
                OnConflict::columns([Column::FollowerId, Column::FolloweeId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        Ok(())
    }

    async fn unfollow(&self, follower_id: i32, followee_id: i32) -> Result<(), DomainError> {
        FollowEntity::delete_many()
            .filter(Column::FollowerId.eq(follower_id))
            .filter(Column::FolloweeId.eq(followee_id))
            .exec(&self.db)
            .await?;

        Ok(())
    }

    async fn following(&self, user_id: i32) -> Result<Vec<i32>, DomainError> {
        let ids: Vec<i32> = FollowEntity::find()
            .select_only()
            .column(Column::FolloweeId)
            .filter(Column::FollowerId.eq(user_id))
            .order_by_asc(Column::FolloweeId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn followers(&self, user_id: i32) -> Result<Vec<i32>, DomainError> {
        let ids: Vec<i32> = FollowEntity::find()
            .select_only()
            .column(Column::FollowerId)
            .filter(Column::FolloweeId.eq(user_id))
            .order_by_asc(Column::FollowerId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids)
    }

    async fn is_following(&self, follower_id: i32, followee_id: i32) -> Result<bool, DomainError> {
        let count = FollowEntity::find()
            .filter(Column::FollowerId.eq(follower_id))
            .filter(Column::FolloweeId.eq(followee_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
