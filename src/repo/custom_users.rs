use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter};

use crate::{entities::custom_user, state::DatabaseClient};

#[async_trait]
pub trait CustomUsersRepo: Send + Sync {
    async fn insert(
        &self,
        model: custom_user::ActiveModel,
    ) -> Result<custom_user::Model, sea_orm::DbErr>;
    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<custom_user::Model>, sea_orm::DbErr>;
    async fn update(
        &self,
        model: custom_user::ActiveModel,
    ) -> Result<custom_user::Model, sea_orm::DbErr>;
}

pub struct SeaOrmCustomUsersRepo {
    db: std::sync::Arc<dyn DatabaseClient>,
}

impl SeaOrmCustomUsersRepo {
    pub fn new(db: std::sync::Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomUsersRepo for SeaOrmCustomUsersRepo {
    async fn insert(
        &self,
        model: custom_user::ActiveModel,
    ) -> Result<custom_user::Model, sea_orm::DbErr> {
        model.insert(self.db.conn()).await
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<custom_user::Model>, sea_orm::DbErr> {
        custom_user::Entity::find()
            .filter(custom_user::Column::PhoneNumber.eq(phone_number))
            .one(self.db.conn())
            .await
    }

    async fn update(
        &self,
        model: custom_user::ActiveModel,
    ) -> Result<custom_user::Model, sea_orm::DbErr> {
        model.update(self.db.conn()).await
    }
}
