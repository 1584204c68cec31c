//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::map_unique_violation;
use crate::domain::{DomainError, NewUser, UpdateUserInput, User, UserCredentials, UserRepository};
use crate::models::user::{self, ActiveModel, Column, Entity as UserEntity};

impl From<user::Model> for User {
    fn from(u: user::Model) -> Self {
        User {
            id: u.id,
            username: u.username,
            email: u.email,
            date_of_birth: u.date_of_birth,
            gender: u.gender,
            region: u.region,
            photo: u.photo,
            role: u.role,
            created_at: u.created_at,
        }
    }
}

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let users = UserEntity::find()
            .order_by_asc(Column::Username)
            .all(&self.db)
            .await?;

        Ok(users.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, DomainError> {
        let user = UserEntity::find_by_id(id).one(&self.db).await?;
        Ok(user.map(User::from))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserCredentials>, DomainError> {
        let user = UserEntity::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(login))
                    .add(Column::Email.eq(login)),
            )
            .one(&self.db)
            .await?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            UserCredentials {
                user: User::from(u),
                password_hash,
            }
        }))
    }

    async fn create(&self, input: NewUser) -> Result<User, DomainError> {
        let now = chrono::Utc::now().to_rfc3339();

        let user = ActiveModel {
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            date_of_birth: Set(input.date_of_birth),
            gender: Set(input.gender),
            region: Set(input.region),
            photo: Set(input.photo),
            role: Set("user".to_string()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = user
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, "Username or email already registered"))?;

        Ok(User::from(result))
    }

    async fn update_profile(&self, id: i32, input: UpdateUserInput) -> Result<User, DomainError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(date_of_birth) = input.date_of_birth {
            active.date_of_birth = Set(Some(date_of_birth));
        }
        if let Some(gender) = input.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(region) = input.region {
            active.region = Set(Some(region));
        }
        if let Some(photo) = input.photo {
            active.photo = Set(Some(photo));
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let result = active.update(&self.db).await?;
        Ok(User::from(result))
    }

    async fn set_password_hash(&self, id: i32, password_hash: String) -> Result<(), DomainError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());
        active.update(&self.db).await?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        Ok(())
    }
}
