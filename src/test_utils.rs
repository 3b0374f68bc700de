use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Mutex;

use crate::{entities::custom_user, repo::custom_users::CustomUsersRepo, state::DatabaseClient};

pub fn sample_user(id: i64, username: &str, phone_number: &str) -> custom_user::Model {
    custom_user::Model {
        id,
        username: username.to_string(),
        phone_number: phone_number.to_string(),
        creation_date: chrono::Utc::now().into(),
        is_active: false,
        is_staff: false,
        is_admin: false,
    }
}

pub struct TestDatabaseClient {
    pub conn: DatabaseConnection,
}

impl DatabaseClient for TestDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

/// Keeps rows in memory and enforces the phone number unique index like Postgres would.
#[derive(Default)]
pub struct InMemoryCustomUsersRepo {
    rows: Mutex<Vec<custom_user::Model>>,
    writes: Mutex<usize>,
}

impl InMemoryCustomUsersRepo {
    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap() += 1;
    }
}

#[async_trait]
impl CustomUsersRepo for InMemoryCustomUsersRepo {
    async fn insert(&self, model: custom_user::ActiveModel) -> Result<custom_user::Model, DbErr> {
        let mut rows = self.rows.lock().unwrap();
        let phone_number = model.phone_number.unwrap();
        if rows.iter().any(|row| row.phone_number == phone_number) {
            return Err(DbErr::Custom(format!(
                "duplicate key value violates unique constraint \"{}\"",
                custom_user::PHONE_NUMBER_UNIQUE_INDEX
            )));
        }

        let row = custom_user::Model {
            id: rows.len() as i64 + 1,
            username: model.username.unwrap(),
            phone_number,
            creation_date: model.creation_date.unwrap(),
            is_active: model.is_active.unwrap(),
            is_staff: model.is_staff.unwrap(),
            is_admin: model.is_admin.unwrap(),
        };
        rows.push(row.clone());
        drop(rows);
        self.record_write();
        Ok(row)
    }

    async fn find_by_phone_number(
        &self,
        phone_number: &str,
    ) -> Result<Option<custom_user::Model>, DbErr> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|row| row.phone_number == phone_number).cloned())
    }

    async fn update(&self, model: custom_user::ActiveModel) -> Result<custom_user::Model, DbErr> {
        let mut rows = self.rows.lock().unwrap();
        let id = model.id.unwrap();
        let Some(row) = rows.iter_mut().find(|row| row.id == id) else {
            return Err(DbErr::RecordNotUpdated);
        };

        row.username = model.username.unwrap();
        row.phone_number = model.phone_number.unwrap();
        row.creation_date = model.creation_date.unwrap();
        row.is_active = model.is_active.unwrap();
        row.is_staff = model.is_staff.unwrap();
        row.is_admin = model.is_admin.unwrap();
        let updated = row.clone();
        drop(rows);
        self.record_write();
        Ok(updated)
    }
}
