// src/handlers/banks.rs

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
    middleware::rbac::{BankManagers, RequireRole},
    models::{
        bank::{Bank, BankPayload},
        listing::ConfirmQuery,
    },
};

// GET /api/banks
#[utoipa::path(
    get,
    path = "/api/banks",
    tag = "Banks",
    responses((status = 200, description = "All bank accounts", body = Vec<Bank>)),
    security(("api_jwt" = []))
)]
pub async fn list_banks(State(app_state): State<AppState>) -> Json<Vec<Bank>> {
    Json(app_state.bank_service.list().await)
}

// GET /api/banks/default
#[utoipa::path(
    get,
    path = "/api/banks/default",
    tag = "Banks",
    responses(
        (status = 200, description = "The default bank, or the first one on file", body = Bank),
        (status = 404, description = "No banks configured")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_default_bank(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.bank_service.default_bank().await?))
}

// GET /api/banks/{id}
#[utoipa::path(
    get,
    path = "/api/banks/{id}",
    tag = "Banks",
    params(("id" = Uuid, Path, description = "Bank id")),
    responses(
        (status = 200, description = "The bank account", body = Bank),
        (status = 404, description = "No such bank")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_bank(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.bank_service.get(id).await?))
}

// POST /api/banks
#[utoipa::path(
    post,
    path = "/api/banks",
    tag = "Banks",
    request_body = BankPayload,
    responses(
        (status = 201, description = "Bank account added", body = Bank),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Inspectors cannot manage banks")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bank(
    State(app_state): State<AppState>,
    _guard: RequireRole<BankManagers>,
    Json(payload): Json<BankPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let bank = app_state.bank_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(bank)))
}

// PUT /api/banks/{id}
#[utoipa::path(
    put,
    path = "/api/banks/{id}",
    tag = "Banks",
    params(("id" = Uuid, Path, description = "Bank id")),
    request_body = BankPayload,
    responses(
        (status = 200, description = "Bank account updated", body = Bank),
        (status = 400, description = "Invalid data"),
        (status = 403, description = "Inspectors cannot manage banks"),
        (status = 404, description = "No such bank")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_bank(
    State(app_state): State<AppState>,
    _guard: RequireRole<BankManagers>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BankPayload>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.bank_service.update(id, payload).await?))
}

// PUT /api/banks/{id}/default
#[utoipa::path(
    put,
    path = "/api/banks/{id}/default",
    tag = "Banks",
    params(("id" = Uuid, Path, description = "Bank id")),
    responses(
        (status = 200, description = "Bank is now the only default", body = Bank),
        (status = 403, description = "Inspectors cannot manage banks"),
        (status = 404, description = "No such bank")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_default_bank(
    State(app_state): State<AppState>,
    _guard: RequireRole<BankManagers>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.bank_service.set_default(id).await?))
}

// DELETE /api/banks/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/banks/{id}",
    tag = "Banks",
    params(("id" = Uuid, Path, description = "Bank id"), ConfirmQuery),
    responses(
        (status = 204, description = "Bank account deleted"),
        (status = 403, description = "Inspectors cannot manage banks"),
        (status = 409, description = "The default bank cannot be deleted"),
        (status = 428, description = "confirm=true missing")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_bank(
    State(app_state): State<AppState>,
    _guard: RequireRole<BankManagers>,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.bank_service.delete(id, confirm.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}
