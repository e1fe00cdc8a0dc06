// src/handlers/users.rs
//
// User administration. Every route here is admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminOnly, RequireRole},
    },
    models::{
        auth::{ChangePasswordPayload, CreateUserPayload, UpdateUserPayload, UserProfile, UserStats},
        listing::ConfirmQuery,
    },
};

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "All user accounts", body = Vec<UserProfile>),
        (status = 403, description = "Admins only")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Json<Vec<UserProfile>> {
    Json(app_state.user_service.list().await)
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created", body = UserProfile),
        (status = 400, description = "Invalid data"),
        (status = 409, description = "Username already taken")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state.user_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/users/{id}
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserProfile),
        (status = 404, description = "No such user")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.user_service.get(id).await?))
}

// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, description = "User updated", body = UserProfile),
        (status = 409, description = "Admins cannot demote themselves")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.user_service.update(&actor, id, payload).await?))
}

// PUT /api/users/{id}/password
#[utoipa::path(
    put,
    path = "/api/users/{id}/password",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ChangePasswordPayload,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Password too short")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_password(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangePasswordPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.user_service.change_password(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

// PUT /api/users/{id}/activate
#[utoipa::path(
    put,
    path = "/api/users/{id}/activate",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "User can sign in again", body = UserProfile)),
    security(("api_jwt" = []))
)]
pub async fn activate_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.user_service.set_active(&actor, id, true).await?))
}

// PUT /api/users/{id}/deactivate
#[utoipa::path(
    put,
    path = "/api/users/{id}/deactivate",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User locked out", body = UserProfile),
        (status = 409, description = "Admins cannot deactivate themselves")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.user_service.set_active(&actor, id, false).await?))
}

// DELETE /api/users/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id"), ConfirmQuery),
    responses(
        (status = 204, description = "User deleted"),
        (status = 409, description = "Admins cannot delete themselves"),
        (status = 428, description = "confirm=true missing")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.user_service.delete(&actor, id, confirm.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/users/stats/overview
#[utoipa::path(
    get,
    path = "/api/users/stats/overview",
    tag = "Users",
    responses((status = 200, description = "Counts per role and activity", body = UserStats)),
    security(("api_jwt" = []))
)]
pub async fn user_stats(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Json<UserStats> {
    Json(app_state.user_service.stats().await)
}
