use utoipa::OpenApi;

use crate::{
    handler,
    handler::{
        health::Health,
        users::{
            CheckPermissions, CreateUser, ErrorResponse, ExistsResponse, PermissionsResponse,
            UserResponse,
        },
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handler::health::health,
        handler::users::create_user,
        handler::users::get_user,
        handler::users::activate_user,
        handler::users::check_permissions
    ),
    components(schemas(
        Health,
        CreateUser,
        CheckPermissions,
        UserResponse,
        ExistsResponse,
        PermissionsResponse,
        ErrorResponse
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "users", description = "Phone number accounts")
    )
)]
pub struct ApiDoc;
