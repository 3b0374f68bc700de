use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod entities;
mod handler;
mod openapi;
mod repo;
mod schema;
mod service;
mod state;
#[cfg(test)]
mod test_utils;

use crate::{
    service::config::{ConfigService, ConfigServiceImpl},
    state::AppState,
};

fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handler::health::routes())
        .merge(handler::users::routes(state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phone_accounts=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(ConfigServiceImpl::new());
    let state = AppState::new(config.clone()).await?;

    service::bootstrap::ensure_superuser(state.users(), config.values())
        .await
        .context("superuser bootstrap failed")?;

    let bind_addr = format!("0.0.0.0:{}", state.config().port());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {bind_addr}"))?;
    info!(%bind_addr, "listening");

    axum::serve(listener, app(state))
        .await
        .context("server error")?;
    Ok(())
}
