use async_trait::async_trait;
use chrono::SubsecRound;
use sea_orm::{DbErr, Set, SqlErr};
use tracing::{debug, info};

use crate::{
    entities::custom_user::{
        self, PHONE_NUMBER_MAX_LEN, PHONE_NUMBER_UNIQUE_INDEX, REQUIRED_FIELDS, USERNAME_FIELD,
        USERNAME_MAX_LEN,
    },
    repo::custom_users::CustomUsersRepo,
};

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub code: &'static str,
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(code: &'static str, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("store error: {0}")]
    Store(#[from] DbErr),
}

impl UserError {
    /// True when the store rejected a write because the phone number is already taken.
    pub fn is_unique_violation(&self) -> bool {
        let UserError::Store(err) = self else {
            return false;
        };
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => true,
            _ => err.to_string().contains(PHONE_NUMBER_UNIQUE_INDEX),
        }
    }
}

#[async_trait]
pub trait UsersService: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<custom_user::Model, UserError>;
    /// Staff and admin flags are set, `is_active` is left untouched.
    async fn create_superuser(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<custom_user::Model, UserError>;
    async fn exists(
        &self,
        phone_number: &str,
    ) -> Result<(Option<custom_user::Model>, bool), UserError>;
    async fn activate(&self, user: custom_user::Model) -> Result<custom_user::Model, UserError>;
}

pub struct UsersServiceImpl {
    users_repo: std::sync::Arc<dyn CustomUsersRepo>,
}

impl UsersServiceImpl {
    pub fn new(users_repo: std::sync::Arc<dyn CustomUsersRepo>) -> Self {
        Self { users_repo }
    }

    fn validate_required(
        field: &'static str,
        value: &str,
        max_len: usize,
    ) -> Result<(), ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::new(
                "required",
                field,
                format!("user must have a {}", field.replace('_', " ")),
            ));
        }
        if value.chars().count() > max_len {
            return Err(ValidationError::new(
                "too_long",
                field,
                format!("{field} must be at most {max_len} characters"),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl UsersService for UsersServiceImpl {
    async fn create_user(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<custom_user::Model, UserError> {
        Self::validate_required(REQUIRED_FIELDS[0], username, USERNAME_MAX_LEN)?;
        Self::validate_required(USERNAME_FIELD, phone_number, PHONE_NUMBER_MAX_LEN)?;

        let model = custom_user::ActiveModel {
            username: Set(username.to_string()),
            phone_number: Set(phone_number.to_string()),
            // timestamptz keeps microseconds
            creation_date: Set(chrono::Utc::now().trunc_subsecs(6).into()),
            is_active: Set(false),
            is_staff: Set(false),
            is_admin: Set(false),
            ..Default::default()
        };

        let user = self.users_repo.insert(model).await?;
        info!(user_id = user.id, "created user");
        Ok(user)
    }

    async fn create_superuser(
        &self,
        username: &str,
        phone_number: &str,
    ) -> Result<custom_user::Model, UserError> {
        let user = self.create_user(username, phone_number).await?;

        let mut active: custom_user::ActiveModel = user.into();
        active.is_staff = Set(true);
        active.is_admin = Set(true);

        let user = self.users_repo.update(active).await?;
        info!(user_id = user.id, "promoted user to superuser");
        Ok(user)
    }

    async fn exists(
        &self,
        phone_number: &str,
    ) -> Result<(Option<custom_user::Model>, bool), UserError> {
        let user = self.users_repo.find_by_phone_number(phone_number).await?;
        let found = user.is_some();
        Ok((user, found))
    }

    async fn activate(&self, user: custom_user::Model) -> Result<custom_user::Model, UserError> {
        if user.is_active {
            debug!(user_id = user.id, "user already active");
            return Ok(user);
        }

        let mut active: custom_user::ActiveModel = user.into();
        active.is_active = Set(true);

        let user = self.users_repo.update(active).await?;
        info!(user_id = user.id, "activated user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        repo::custom_users::SeaOrmCustomUsersRepo,
        test_utils::{sample_user, InMemoryCustomUsersRepo, TestDatabaseClient},
    };
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service() -> (UsersServiceImpl, Arc<InMemoryCustomUsersRepo>) {
        let repo = Arc::new(InMemoryCustomUsersRepo::default());
        (UsersServiceImpl::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_user_starts_with_all_flags_cleared() {
        let (service, _) = service();
        let before = chrono::Utc::now();

        let user = service.create_user("alice", "+15551234567").await.unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.phone_number, "+15551234567");
        assert!(!user.is_active);
        assert!(!user.is_staff);
        assert!(!user.is_admin);
        assert!(user.creation_date.with_timezone(&chrono::Utc) >= before.trunc_subsecs(6));
        assert_eq!(user.creation_date.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[tokio::test]
    async fn create_user_rejects_empty_username() {
        let (service, repo) = service();

        let err = service.create_user("", "+15551234567").await.unwrap_err();

        match err {
            UserError::Validation(err) => {
                assert_eq!(err.field, "username");
                assert_eq!(err.code, "required");
                assert_eq!(err.message, "user must have a username");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(repo.writes(), 0);
    }

    #[tokio::test]
    async fn create_user_rejects_empty_phone_number() {
        let (service, repo) = service();

        let err = service.create_user("alice", "").await.unwrap_err();

        match err {
            UserError::Validation(err) => {
                assert_eq!(err.field, "phone_number");
                assert_eq!(err.message, "user must have a phone number");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(repo.writes(), 0);
    }

    #[tokio::test]
    async fn create_user_rejects_values_over_column_limits() {
        let (service, _) = service();

        let err = service
            .create_user(&"a".repeat(31), "+15551234567")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(ref e) if e.code == "too_long"));

        let err = service
            .create_user("alice", "+1555123456789012")
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(ref e) if e.field == "phone_number"));

        assert!(service.create_user(&"a".repeat(30), "123456789012345").await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_phone_number_surfaces_unique_violation() {
        let (service, _) = service();
        service.create_user("alice", "+15551234567").await.unwrap();

        let err = service
            .create_user("alice again", "+15551234567")
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::Store(_)));
        assert!(err.is_unique_violation());
    }

    #[test]
    fn unique_violation_on_other_constraint_is_not_a_phone_conflict() {
        let err = UserError::Store(DbErr::Custom(
            "duplicate key value violates unique constraint \"some_other_key\"".to_string(),
        ));
        assert!(!err.is_unique_violation());

        let err = UserError::Store(DbErr::Custom(format!(
            "duplicate key value violates unique constraint \"{PHONE_NUMBER_UNIQUE_INDEX}\""
        )));
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn same_username_is_allowed_twice() {
        let (service, _) = service();
        service.create_user("alice", "+15551234567").await.unwrap();
        assert!(service.create_user("alice", "+15557654321").await.is_ok());
    }

    #[tokio::test]
    async fn create_superuser_sets_staff_and_admin_but_not_active() {
        let (service, repo) = service();

        let user = service
            .create_superuser("root", "+15550000000")
            .await
            .unwrap();

        assert!(user.is_staff);
        assert!(user.is_admin);
        assert!(!user.is_active);
        assert_eq!(repo.writes(), 2);

        let (stored, found) = service.exists("+15550000000").await.unwrap();
        assert!(found);
        assert_eq!(stored, Some(user));
    }

    #[tokio::test]
    async fn create_superuser_validates_like_create_user() {
        let (service, _) = service();
        let err = service.create_superuser("", "+15550000000").await.unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
    }

    #[tokio::test]
    async fn exists_on_empty_store_is_not_found() {
        let (service, _) = service();

        let (user, found) = service.exists("missing-number").await.unwrap();

        assert!(user.is_none());
        assert!(!found);
    }

    #[tokio::test]
    async fn exists_finds_created_user() {
        let (service, _) = service();
        let created = service.create_user("alice", "+15551234567").await.unwrap();

        let (user, found) = service.exists("+15551234567").await.unwrap();

        assert!(found);
        assert_eq!(user, Some(created));
    }

    #[tokio::test]
    async fn activate_is_idempotent() {
        let (service, repo) = service();
        let user = service.create_user("alice", "+15551234567").await.unwrap();

        let user = service.activate(user).await.unwrap();
        assert!(user.is_active);
        let user = service.activate(user).await.unwrap();
        assert!(user.is_active);

        assert_eq!(repo.writes(), 2);
        let (stored, _) = service.exists("+15551234567").await.unwrap();
        assert!(stored.unwrap().is_active);
    }

    #[tokio::test]
    async fn exists_propagates_store_failures() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection refused".to_string())]);
        let repo = SeaOrmCustomUsersRepo::new(Arc::new(TestDatabaseClient {
            conn: db.into_connection(),
        }));
        let service = UsersServiceImpl::new(Arc::new(repo));

        let err = service.exists("+15551234567").await.unwrap_err();

        assert!(matches!(err, UserError::Store(_)));
        assert!(err.to_string().contains("connection refused"));
        assert!(!err.is_unique_violation());
    }

    #[tokio::test]
    async fn activate_writes_through_sea_orm() {
        let stored = sample_user(3, "alice", "+15551234567");
        let mut activated = stored.clone();
        activated.is_active = true;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![activated.clone()]]);
        let repo = SeaOrmCustomUsersRepo::new(Arc::new(TestDatabaseClient {
            conn: db.into_connection(),
        }));
        let service = UsersServiceImpl::new(Arc::new(repo));

        let user = service.activate(stored).await.unwrap();
        assert_eq!(user, activated);
    }
}
