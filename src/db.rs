use sea_orm::{Database, DatabaseConnection, DbErr};
use tokio::net::lookup_host;
use tracing::{info, warn};

fn redact_db_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let (authority, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };
    let Some((userinfo, host)) = authority.rsplit_once('@') else {
        return url.to_string();
    };
    match userinfo.split_once(':') {
        Some((user, _)) => format!("{scheme}://{user}:***@{host}{path}"),
        None => url.to_string(),
    }
}

fn extract_host_port(url: &str) -> Option<(String, u16)> {
    let after_scheme = url.split("://").nth(1)?;
    let authority = after_scheme.split('/').next().unwrap_or(after_scheme);
    let hostport = authority.split('@').last().unwrap_or(authority);
    let mut parts = hostport.split(':');
    let host = parts.next()?.to_string();
    let port = parts
        .next()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(5432);
    Some((host, port))
}

pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    info!(database_url = %redact_db_url(url), "connecting to database");

    if let Some((host, port)) = extract_host_port(url) {
        match lookup_host((host.as_str(), port)).await {
            Ok(addrs) => {
                let list: Vec<String> = addrs.map(|addr| addr.to_string()).collect();
                info!(%host, port, addrs = ?list, "resolved database host");
            }
            Err(err) => {
                warn!(%host, port, error = %err, "database host lookup failed");
            }
        }
    }
    Database::connect(url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_only() {
        assert_eq!(
            redact_db_url("postgres://app:s3cret@db:5432/accounts"),
            "postgres://app:***@db:5432/accounts"
        );
    }

    #[test]
    fn leaves_urls_without_credentials_alone() {
        assert_eq!(
            redact_db_url("postgres://db:5432/accounts"),
            "postgres://db:5432/accounts"
        );
    }

    #[test]
    fn extracts_host_and_default_port() {
        assert_eq!(
            extract_host_port("postgres://app:pw@db.internal/accounts"),
            Some(("db.internal".to_string(), 5432))
        );
        assert_eq!(
            extract_host_port("postgres://db:6543/accounts"),
            Some(("db".to_string(), 6543))
        );
        assert_eq!(extract_host_port("not a url"), None);
    }
}
