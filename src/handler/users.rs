use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::{entities::custom_user, service::users::UserError, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            code: code.to_string(),
            message: message.into(),
        }),
    )
        .into_response()
}

fn user_error_response(err: UserError) -> Response {
    if err.is_unique_violation() {
        return error_response(
            StatusCode::CONFLICT,
            "phone_number_taken",
            "phone number is already registered",
        );
    }
    match err {
        UserError::Validation(err) => error_response(StatusCode::BAD_REQUEST, err.code, err.message),
        UserError::Store(err) => {
            error!(error = %err, "user store failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "user store unavailable",
            )
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    pub username: String,
    pub phone_number: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CheckPermissions {
    #[serde(default)]
    pub permissions: Vec<String>,
    pub target: Option<String>,
    pub app_label: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub phone_number: String,
    pub creation_date: DateTime<Utc>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_admin: bool,
}

impl From<custom_user::Model> for UserResponse {
    fn from(model: custom_user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            phone_number: model.phone_number,
            creation_date: model.creation_date.with_timezone(&Utc),
            is_active: model.is_active,
            is_staff: model.is_staff,
            is_admin: model.is_admin,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ExistsResponse {
    pub exists: bool,
    pub user: Option<UserResponse>,
}

#[derive(Serialize, ToSchema)]
pub struct PermissionsResponse {
    pub granted: bool,
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "Created", body = UserResponse),
        (status = 400, description = "Missing or oversized field", body = ErrorResponse),
        (status = 409, description = "Phone number already registered", body = ErrorResponse)
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUser>,
) -> Response {
    let created = state
        .users()
        .create_user(&payload.username, &payload.phone_number)
        .await;

    match created {
        Ok(user) => (StatusCode::CREATED, Json(UserResponse::from(user))).into_response(),
        Err(err) => user_error_response(err),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{phone_number}",
    tag = "users",
    params(
        ("phone_number" = String, Path, description = "Account phone number")
    ),
    responses(
        (status = 200, description = "Lookup result", body = ExistsResponse)
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(phone_number): Path<String>,
) -> Response {
    match state.users().exists(&phone_number).await {
        Ok((user, exists)) => Json(ExistsResponse {
            exists,
            user: user.map(UserResponse::from),
        })
        .into_response(),
        Err(err) => user_error_response(err),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{phone_number}/activate",
    tag = "users",
    params(
        ("phone_number" = String, Path, description = "Account phone number")
    ),
    responses(
        (status = 200, description = "Activated", body = UserResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    Path(phone_number): Path<String>,
) -> Response {
    let user = match state.users().exists(&phone_number).await {
        Ok((Some(user), _)) => user,
        Ok((None, _)) => {
            return error_response(StatusCode::NOT_FOUND, "user_not_found", "user not found")
        }
        Err(err) => return user_error_response(err),
    };

    match state.users().activate(user).await {
        Ok(user) => Json(UserResponse::from(user)).into_response(),
        Err(err) => user_error_response(err),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{phone_number}/permissions",
    tag = "users",
    request_body = CheckPermissions,
    params(
        ("phone_number" = String, Path, description = "Account phone number")
    ),
    responses(
        (status = 200, description = "Permission decision", body = PermissionsResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    )
)]
pub async fn check_permissions(
    State(state): State<Arc<AppState>>,
    Path(phone_number): Path<String>,
    Json(payload): Json<CheckPermissions>,
) -> Response {
    let user = match state.users().exists(&phone_number).await {
        Ok((Some(user), _)) => user,
        Ok((None, _)) => {
            return error_response(StatusCode::NOT_FOUND, "user_not_found", "user not found")
        }
        Err(err) => return user_error_response(err),
    };

    let resolver = state.permissions();
    let mut granted = user
        .has_perms(resolver, payload.permissions.as_slice(), payload.target.as_deref())
        .await;
    if granted {
        if let Some(app_label) = payload.app_label.as_deref() {
            granted = user.has_module_perms(resolver, app_label).await;
        }
    }

    Json(PermissionsResponse { granted }).into_response()
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users/:phone_number", get(get_user))
        .route("/api/v1/users/:phone_number/activate", post(activate_user))
        .route(
            "/api/v1/users/:phone_number/permissions",
            post(check_permissions),
        )
        .with_state(state)
}
