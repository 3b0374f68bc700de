use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;

use crate::{
    repo::custom_users::SeaOrmCustomUsersRepo,
    service::{
        config::ConfigService,
        permissions::{DenyAllResolver, GrantTableResolver, GrantsError, PermissionResolver},
        users::{UsersService, UsersServiceImpl},
    },
};

pub trait DatabaseClient: Send + Sync {
    fn conn(&self) -> &DatabaseConnection;
}

pub struct SeaOrmDatabaseClient {
    conn: DatabaseConnection,
}

impl SeaOrmDatabaseClient {
    pub async fn new(database_url: &str) -> Result<Self, DbErr> {
        let conn = crate::db::connect(database_url).await?;
        crate::schema::apply(&conn).await?;
        Ok(Self { conn })
    }
}

impl DatabaseClient for SeaOrmDatabaseClient {
    fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("database setup failed: {0}")]
    Database(#[from] DbErr),
    #[error(transparent)]
    Grants(#[from] GrantsError),
}

pub struct AppState {
    users: Arc<dyn UsersService>,
    permissions: Arc<dyn PermissionResolver>,
    config: Arc<dyn ConfigService>,
}

impl AppState {
    pub async fn new(config: Arc<dyn ConfigService>) -> Result<Arc<Self>, StateError> {
        let database_url = config
            .values()
            .database_url
            .clone()
            .ok_or(StateError::MissingDatabaseUrl)?;
        let db = Arc::new(SeaOrmDatabaseClient::new(&database_url).await?);
        let users_repo = Arc::new(SeaOrmCustomUsersRepo::new(db));
        let users = Arc::new(UsersServiceImpl::new(users_repo));
        let permissions = permission_resolver(config.as_ref())?;

        Ok(Self::from_parts(users, permissions, config))
    }

    pub fn from_parts(
        users: Arc<dyn UsersService>,
        permissions: Arc<dyn PermissionResolver>,
        config: Arc<dyn ConfigService>,
    ) -> Arc<Self> {
        Arc::new(Self {
            users,
            permissions,
            config,
        })
    }

    pub fn users(&self) -> &dyn UsersService {
        self.users.as_ref()
    }

    pub fn permissions(&self) -> &dyn PermissionResolver {
        self.permissions.as_ref()
    }

    pub fn config(&self) -> &dyn ConfigService {
        self.config.as_ref()
    }
}

fn permission_resolver(
    config: &dyn ConfigService,
) -> Result<Arc<dyn PermissionResolver>, GrantsError> {
    match config.values().permission_grants.as_deref() {
        Some(raw) => {
            let resolver = GrantTableResolver::from_json(raw)?;
            tracing::info!(accounts = resolver.account_count(), "loaded permission grants");
            Ok(Arc::new(resolver))
        }
        None => Ok(Arc::new(DenyAllResolver)),
    }
}
