// src/routes.rs

use axum::{
    Json, Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Public
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/api/auth/login", post(handlers::auth::login));

    // Everything else needs a valid bearer token
    let protected_routes = Router::new()
        // --- Auth ---
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/auth/profile", put(handlers::auth::update_profile))
        // --- Files ---
        .route(
            "/api/files",
            get(handlers::files::list_files).post(handlers::files::create_file),
        )
        .route("/api/files/next-number", get(handlers::files::next_file_number))
        .route("/api/files/stats/overview", get(handlers::files::file_stats))
        .route(
            "/api/files/{id}",
            get(handlers::files::get_file)
                .put(handlers::files::update_file)
                .delete(handlers::files::delete_file),
        )
        .route("/api/files/{id}/status", put(handlers::files::update_file_status))
        .route("/api/files/{id}/notes", post(handlers::files::add_file_note))
        // --- Invoices ---
        .route(
            "/api/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/api/invoices/next-number", get(handlers::invoices::next_invoice_number))
        .route("/api/invoices/stats/overview", get(handlers::invoices::invoice_stats))
        .route(
            "/api/invoices/{id}",
            get(handlers::invoices::get_invoice)
                .put(handlers::invoices::update_invoice)
                .delete(handlers::invoices::delete_invoice),
        )
        .route("/api/invoices/{id}/status", put(handlers::invoices::update_invoice_status))
        .route("/api/invoices/{id}/notes", post(handlers::invoices::add_invoice_note))
        // --- Banks ---
        .route(
            "/api/banks",
            get(handlers::banks::list_banks).post(handlers::banks::create_bank),
        )
        .route("/api/banks/default", get(handlers::banks::get_default_bank))
        .route(
            "/api/banks/{id}",
            get(handlers::banks::get_bank)
                .put(handlers::banks::update_bank)
                .delete(handlers::banks::delete_bank),
        )
        .route("/api/banks/{id}/default", put(handlers::banks::set_default_bank))
        // --- Users ---
        .route(
            "/api/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route("/api/users/stats/overview", get(handlers::users::user_stats))
        .route(
            "/api/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/api/users/{id}/password", put(handlers::users::change_password))
        .route("/api/users/{id}/activate", put(handlers::users::activate_user))
        .route("/api/users/{id}/deactivate", put(handlers::users::deactivate_user))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}
