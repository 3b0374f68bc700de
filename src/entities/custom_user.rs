use sea_orm::entity::prelude::*;
use std::fmt;

use crate::service::permissions::PermissionResolver;

/// Field the surrounding auth layer uses as the login identifier.
pub const USERNAME_FIELD: &str = "phone_number";
/// Fields that must be supplied when an account is created, besides the login identifier.
pub const REQUIRED_FIELDS: &[&str] = &["username"];

pub const PHONE_NUMBER_UNIQUE_INDEX: &str = "custom_user_phone_number_unique";

pub const USERNAME_MAX_LEN: usize = 30;
pub const PHONE_NUMBER_MAX_LEN: usize = 15;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "custom_user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub username: String,
    #[sea_orm(unique)]
    pub phone_number: String,
    pub creation_date: DateTimeWithTimeZone,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Active admins bypass every permission check.
    pub fn is_active_admin(&self) -> bool {
        self.is_active && self.is_admin
    }

    pub async fn has_perm(
        &self,
        resolver: &dyn PermissionResolver,
        permission: &str,
        target: Option<&str>,
    ) -> bool {
        if self.is_active_admin() {
            return true;
        }
        resolver.resolve(self, permission, target).await
    }

    pub async fn has_perms<S: AsRef<str> + Sync>(
        &self,
        resolver: &dyn PermissionResolver,
        permissions: &[S],
        target: Option<&str>,
    ) -> bool {
        if self.is_active_admin() {
            return true;
        }
        for permission in permissions {
            if !self.has_perm(resolver, permission.as_ref(), target).await {
                return false;
            }
        }
        true
    }

    pub async fn has_module_perms(&self, resolver: &dyn PermissionResolver, app_label: &str) -> bool {
        if self.is_active_admin() {
            return true;
        }
        resolver.resolve_module(self, app_label).await
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.username, self.phone_number)
    }
}
