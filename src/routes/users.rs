use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::user_dto::{
        CreateUserPayload, UpdateProfilePayload, UpdateUserPayload, UserListQuery,
        UserListResponse, UserResponse,
    },
    error::Result,
    services::auth_service::Claims,
    utils::extract::{AppJson, AppPath, AppQuery},
    AppState,
};

#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users",
    params(UserListQuery),
    responses((status = 200, description = "Users, newest first", body = UserListResponse)),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn list_users(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<UserListQuery>,
) -> Result<impl IntoResponse> {
    let list = state.user_service.list(query).await?;
    Ok(Json(UserListResponse {
        items: list.items.into_iter().map(UserResponse::from).collect(),
        meta: list.meta,
    }))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse> {
    let user = state.user_service.get(id).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Invalid payload or self-demotion"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<Uuid>,
    AppJson(payload): AppJson<UpdateUserPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let user = state
        .user_service
        .update_as(id, claims.user_id()?, payload)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, description = "Cannot delete own account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppPath(id): AppPath<Uuid>,
) -> Result<impl IntoResponse> {
    state.user_service.delete(id, claims.user_id()?).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/users/me",
    responses((status = 200, description = "Own profile", body = UserResponse)),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let user = state.auth_service.current_user(&claims).await?;
    Ok(Json(UserResponse::from(user)))
}

#[utoipa::path(
    patch,
    path = "/users/me",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Account disabled or removed")
    ),
    security(("bearer" = []))
)]
#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<UpdateProfilePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let current = state.auth_service.current_user(&claims).await?;
    let user = state
        .user_service
        .update(current.id, UpdateUserPayload::from(payload))
        .await?;
    Ok(Json(UserResponse::from(user)))
}
