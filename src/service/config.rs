use std::{env, sync::Arc};

use crate::config::Config;

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        if value.len() >= 2 {
            let bytes = value.as_bytes();
            let first = bytes[0];
            let last = bytes[value.len() - 1];
            if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    fn normalize(value: Option<String>) -> Option<String> {
        value.and_then(|value| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return None;
            }
            let normalized = Self::strip_wrapping_quotes(trimmed).trim();
            if normalized.is_empty() {
                None
            } else {
                Some(normalized.to_string())
            }
        })
    }

    fn parse_bool(value: Option<String>, default: bool) -> bool {
        value
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| Self::normalize(lookup(key));

        let port = get("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3333);
        let database_url = get("DATABASE_URL");
        let permission_grants = get("PERMISSION_GRANTS");
        let bootstrap_superuser_username = get("BOOTSTRAP_SUPERUSER_USERNAME");
        let bootstrap_superuser_phone = get("BOOTSTRAP_SUPERUSER_PHONE");
        let bootstrap_superuser_activate =
            Self::parse_bool(get("BOOTSTRAP_SUPERUSER_ACTIVATE"), false);

        Self {
            config: Arc::new(Config {
                port,
                database_url,
                permission_grants,
                bootstrap_superuser_username,
                bootstrap_superuser_phone,
                bootstrap_superuser_activate,
            }),
        }
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}
