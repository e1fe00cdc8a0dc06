// src/handlers/files.rs

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
    middleware::auth::AuthenticatedUser,
    models::{
        file::{
            AddNotePayload, FilePayload, FileStats, FileStatusPayload, NextNumberResponse,
            ValuationFile,
        },
        listing::{ConfirmQuery, FileQuery, Page},
    },
};

// GET /api/files
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "Files",
    params(FileQuery),
    responses(
        (status = 200, description = "One page of the files visible to the caller", body = Page<ValuationFile>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_files(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<FileQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .file_service
        .list(&user, &query, app_state.config.files_page_size)
        .await;
    Ok(Json(page))
}

// POST /api/files
#[utoipa::path(
    post,
    path = "/api/files",
    tag = "Files",
    request_body = FilePayload,
    responses(
        (status = 201, description = "File created and numbered", body = ValuationFile),
        (status = 400, description = "Invalid data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_file(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<FilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .file_service
        .create(&user, payload, app_state.config.today())
        .await?;
    Ok((StatusCode::CREATED, Json(file)))
}

// GET /api/files/{id}
#[utoipa::path(
    get,
    path = "/api/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File id")),
    responses(
        (status = 200, description = "The file", body = ValuationFile),
        (status = 403, description = "Not visible to the caller"),
        (status = 404, description = "No such file")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_file(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state.file_service.get(&user, id).await?;
    Ok(Json(file))
}

// PUT /api/files/{id}
#[utoipa::path(
    put,
    path = "/api/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File id")),
    request_body = FilePayload,
    responses(
        (status = 200, description = "File updated, changes noted", body = ValuationFile),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "No such file")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_file(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .file_service
        .update(&user, id, payload, app_state.config.today())
        .await?;
    Ok(Json(file))
}

// PUT /api/files/{id}/status
#[utoipa::path(
    put,
    path = "/api/files/{id}/status",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File id")),
    request_body = FileStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = ValuationFile),
        (status = 404, description = "No such file")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_file_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FileStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .file_service
        .set_status(&user, id, payload, app_state.config.today())
        .await?;
    Ok(Json(file))
}

// POST /api/files/{id}/notes
#[utoipa::path(
    post,
    path = "/api/files/{id}/notes",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File id")),
    request_body = AddNotePayload,
    responses(
        (status = 200, description = "Note appended", body = ValuationFile),
        (status = 400, description = "Empty note")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_file_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .file_service
        .add_note(&user, id, &payload.note, app_state.config.today())
        .await?;
    Ok(Json(file))
}

// DELETE /api/files/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/files/{id}",
    tag = "Files",
    params(("id" = Uuid, Path, description = "File id"), ConfirmQuery),
    responses(
        (status = 204, description = "File deleted"),
        (status = 404, description = "No such file"),
        (status = 428, description = "confirm=true missing")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_file(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.file_service.delete(&user, id, confirm.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/files/stats/overview
#[utoipa::path(
    get,
    path = "/api/files/stats/overview",
    tag = "Files",
    responses((status = 200, description = "Count per status", body = FileStats)),
    security(("api_jwt" = []))
)]
pub async fn file_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(app_state.file_service.stats(&user).await))
}

// GET /api/files/next-number
#[utoipa::path(
    get,
    path = "/api/files/next-number",
    tag = "Files",
    responses((status = 200, description = "Number the next file would get", body = NextNumberResponse)),
    security(("api_jwt" = []))
)]
pub async fn next_file_number(State(app_state): State<AppState>) -> Json<NextNumberResponse> {
    let number = app_state
        .file_service
        .next_number(app_state.config.today())
        .await;
    Json(NextNumberResponse { number })
}
