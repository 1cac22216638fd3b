//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, SqlErr,
};

use crate::domain::{DomainError, NewUser, ProfileChanges, UserRepository};
use crate::models::user::{self, ActiveModel, Column, DEFAULT_AVATAR, Entity as UserEntity, Role};
use crate::utils::time::now_timestamp;

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
    async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, DomainError> {
        Ok(UserEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, DomainError> {
        let email = email.trim().to_lowercase();
        Ok(UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, input: NewUser) -> Result<user::Model, DomainError> {
        let now = now_timestamp();

        let user = ActiveModel {
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            email: Set(input.email.trim().to_lowercase()),
            password_hash: Set(input.password_hash),
            role: Set(input.role.to_string()),
            avatar: Set(Some(DEFAULT_AVATAR.to_string())),
            is_verified: Set(false),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        user.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                DomainError::Conflict("Email already in use".to_string())
            }
            _ => DomainError::from(e),
        })
    }

    async fn update_profile(
        &self,
        id: i32,
        changes: ProfileChanges,
    ) -> Result<user::Model, DomainError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let mut active: ActiveModel = existing.into();

        if let Some(v) = changes.first_name {
            active.first_name = Set(v);
        }
        if let Some(v) = changes.last_name {
            active.last_name = Set(v);
        }

        let optional_fields = [
            (changes.phone, &mut active.phone),
            (changes.bio, &mut active.bio),
            (changes.company, &mut active.company),
            (changes.location, &mut active.location),
            (changes.city, &mut active.city),
            (changes.state, &mut active.state),
            (changes.zip_code, &mut active.zip_code),
            (changes.country, &mut active.country),
            (changes.facebook, &mut active.facebook),
            (changes.twitter, &mut active.twitter),
            (changes.instagram, &mut active.instagram),
            (changes.avatar, &mut active.avatar),
        ];
        for (value, column) in optional_fields {
            if let Some(value) = value {
                *column = Set(Some(value));
            }
        }

        active.updated_at = Set(now_timestamp());

        Ok(active.update(&self.db).await?)
    }

    async fn count_by_role(
        &self,
        role: Role,
        created_before: Option<String>,
    ) -> Result<u64, DomainError> {
        let mut query = UserEntity::find().filter(Column::Role.eq(role.as_str()));
        if let Some(before) = created_before {
            query = query.filter(Column::CreatedAt.lt(before));
        }
        Ok(query.count(&self.db).await?)
    }
}
