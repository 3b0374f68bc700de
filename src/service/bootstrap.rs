use tracing::{info, warn};

use crate::{
    config::Config,
    entities::custom_user,
    service::users::{UserError, UsersService},
};

/// Creates the configured superuser on startup unless an account already holds its phone number.
pub async fn ensure_superuser(
    users: &dyn UsersService,
    config: &Config,
) -> Result<Option<custom_user::Model>, UserError> {
    let (username, phone_number) = match (
        config.bootstrap_superuser_username.as_deref(),
        config.bootstrap_superuser_phone.as_deref(),
    ) {
        (Some(username), Some(phone_number)) => (username, phone_number),
        (None, None) => return Ok(None),
        _ => {
            warn!("superuser bootstrap needs both BOOTSTRAP_SUPERUSER_USERNAME and BOOTSTRAP_SUPERUSER_PHONE");
            return Ok(None);
        }
    };

    let (existing, found) = users.exists(phone_number).await?;
    if found {
        info!("bootstrap superuser already exists");
        return Ok(existing);
    }

    let mut user = users.create_superuser(username, phone_number).await?;
    if config.bootstrap_superuser_activate {
        user = users.activate(user).await?;
    }
    info!(user_id = user.id, active = user.is_active, "bootstrapped superuser");
    Ok(Some(user))
}
