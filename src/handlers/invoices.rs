// src/handlers/invoices.rs

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
        file::{AddNotePayload, NextNumberResponse},
        invoice::{InvoicePayload, InvoiceStats, InvoiceStatusPayload, InvoiceView},
        listing::{ConfirmQuery, InvoiceQuery, NextInvoiceNumberQuery, Page},
    },
};

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(InvoiceQuery),
    responses(
        (status = 200, description = "One page of the invoices visible to the caller", body = Page<InvoiceView>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<InvoiceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .invoice_service
        .list(&user, &query, app_state.config.files_page_size)
        .await;
    Ok(Json(page))
}

// POST /api/invoices
#[utoipa::path(
    post,
    path = "/api/invoices",
    tag = "Invoices",
    request_body = InvoicePayload,
    responses(
        (status = 201, description = "Invoice created and numbered", body = InvoiceView),
        (status = 400, description = "Invalid data or unknown linked file")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .create(&user, payload, app_state.config.today())
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

// GET /api/invoices/{id}
#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "The invoice with its tax lines", body = InvoiceView),
        (status = 403, description = "Not visible to the caller"),
        (status = 404, description = "No such invoice")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state.invoice_service.get(&user, id).await?;
    Ok(Json(invoice))
}

// PUT /api/invoices/{id}
#[utoipa::path(
    put,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = InvoicePayload,
    responses(
        (status = 200, description = "Invoice updated, total recomputed", body = InvoiceView),
        (status = 400, description = "Invalid data"),
        (status = 404, description = "No such invoice"),
        (status = 409, description = "GST applicability cannot change after numbering")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .update(&user, id, payload, app_state.config.today())
        .await?;
    Ok(Json(invoice))
}

// PUT /api/invoices/{id}/status
#[utoipa::path(
    put,
    path = "/api/invoices/{id}/status",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = InvoiceStatusPayload,
    responses(
        (status = 200, description = "Status changed", body = InvoiceView),
        (status = 404, description = "No such invoice")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_invoice_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<InvoiceStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .set_status(&user, id, payload, app_state.config.today())
        .await?;
    Ok(Json(invoice))
}

// POST /api/invoices/{id}/notes
#[utoipa::path(
    post,
    path = "/api/invoices/{id}/notes",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = AddNotePayload,
    responses(
        (status = 200, description = "Note appended", body = InvoiceView),
        (status = 400, description = "Empty note")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_invoice_note(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddNotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let invoice = app_state
        .invoice_service
        .add_note(&user, id, &payload.note, app_state.config.today())
        .await?;
    Ok(Json(invoice))
}

// DELETE /api/invoices/{id}?confirm=true
#[utoipa::path(
    delete,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id"), ConfirmQuery),
    responses(
        (status = 204, description = "Invoice deleted"),
        (status = 404, description = "No such invoice"),
        (status = 428, description = "confirm=true missing")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_invoice(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Query(confirm): Query<ConfirmQuery>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.invoice_service.delete(&user, id, confirm.confirm).await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/invoices/stats/overview
#[utoipa::path(
    get,
    path = "/api/invoices/stats/overview",
    tag = "Invoices",
    responses((status = 200, description = "Counts per status and amount totals", body = InvoiceStats)),
    security(("api_jwt" = []))
)]
pub async fn invoice_stats(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .invoice_service
        .stats(&user, app_state.config.today())
        .await;
    Ok(Json(stats))
}

// GET /api/invoices/next-number
#[utoipa::path(
    get,
    path = "/api/invoices/next-number",
    tag = "Invoices",
    params(NextInvoiceNumberQuery),
    responses((status = 200, description = "Number the next invoice would get", body = NextNumberResponse)),
    security(("api_jwt" = []))
)]
pub async fn next_invoice_number(
    State(app_state): State<AppState>,
    Query(query): Query<NextInvoiceNumberQuery>,
) -> Json<NextNumberResponse> {
    let number = app_state
        .invoice_service
        .next_number(&query.bank_name, query.gst_applicable, app_state.config.today())
        .await;
    Json(NextNumberResponse { number })
}
