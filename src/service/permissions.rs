use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::entities::custom_user;

/// Decides fine-grained authorization for accounts that are not active admins.
#[async_trait]
pub trait PermissionResolver: Send + Sync {
    async fn resolve(
        &self,
        account: &custom_user::Model,
        permission: &str,
        target: Option<&str>,
    ) -> bool;
    async fn resolve_module(&self, account: &custom_user::Model, app_label: &str) -> bool;
}

pub struct DenyAllResolver;

#[async_trait]
impl PermissionResolver for DenyAllResolver {
    async fn resolve(
        &self,
        _account: &custom_user::Model,
        _permission: &str,
        _target: Option<&str>,
    ) -> bool {
        false
    }

    async fn resolve_module(&self, _account: &custom_user::Model, _app_label: &str) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid permission grants: {0}")]
pub struct GrantsError(#[from] serde_json::Error);

/// Model-level grants keyed by phone number, e.g. `{"+15551234567": ["orders.view_order"]}`.
///
/// Inactive accounts get nothing, and grants never cover a specific target object.
#[derive(Debug, Default)]
pub struct GrantTableResolver {
    grants: HashMap<String, HashSet<String>>,
}

impl GrantTableResolver {
    pub fn new(grants: HashMap<String, HashSet<String>>) -> Self {
        Self { grants }
    }

    pub fn from_json(raw: &str) -> Result<Self, GrantsError> {
        let grants: HashMap<String, HashSet<String>> = serde_json::from_str(raw)?;
        Ok(Self::new(grants))
    }

    pub fn account_count(&self) -> usize {
        self.grants.len()
    }

    fn granted(&self, account: &custom_user::Model) -> Option<&HashSet<String>> {
        if !account.is_active {
            return None;
        }
        self.grants.get(&account.phone_number)
    }
}

#[async_trait]
impl PermissionResolver for GrantTableResolver {
    async fn resolve(
        &self,
        account: &custom_user::Model,
        permission: &str,
        target: Option<&str>,
    ) -> bool {
        if target.is_some() {
            return false;
        }
        self.granted(account)
            .map(|perms| perms.contains(permission))
            .unwrap_or(false)
    }

    async fn resolve_module(&self, account: &custom_user::Model, app_label: &str) -> bool {
        let prefix = format!("{app_label}.");
        self.granted(account)
            .map(|perms| perms.iter().any(|perm| perm.starts_with(&prefix)))
            .unwrap_or(false)
    }
}
