// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Valuation Desk API", description = "Valuation files, GST invoices, bank accounts and users"),
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,
        handlers::auth::update_profile,

        // --- Files ---
        handlers::files::list_files,
        handlers::files::create_file,
        handlers::files::get_file,
        handlers::files::update_file,
        handlers::files::update_file_status,
        handlers::files::add_file_note,
        handlers::files::delete_file,
        handlers::files::file_stats,
        handlers::files::next_file_number,

        // --- Invoices ---
        handlers::invoices::list_invoices,
        handlers::invoices::create_invoice,
        handlers::invoices::get_invoice,
        handlers::invoices::update_invoice,
        handlers::invoices::update_invoice_status,
        handlers::invoices::add_invoice_note,
        handlers::invoices::delete_invoice,
        handlers::invoices::invoice_stats,
        handlers::invoices::next_invoice_number,

        // --- Banks ---
        handlers::banks::list_banks,
        handlers::banks::get_default_bank,
        handlers::banks::get_bank,
        handlers::banks::create_bank,
        handlers::banks::update_bank,
        handlers::banks::set_default_bank,
        handlers::banks::delete_bank,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::change_password,
        handlers::users::activate_user,
        handlers::users::deactivate_user,
        handlers::users::delete_user,
        handlers::users::user_stats,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserProfile,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::UpdateProfilePayload,
            models::auth::ChangePasswordPayload,
            models::auth::UserStats,

            // --- Files ---
            models::file::FileStatus,
            models::file::ValuationFile,
            models::file::FilePayload,
            models::file::FileStatusPayload,
            models::file::AddNotePayload,
            models::file::NextNumberResponse,
            models::file::FileStats,

            // --- Invoices ---
            models::invoice::InvoiceStatus,
            models::invoice::GstType,
            models::invoice::GstSettings,
            models::invoice::TaxBreakdown,
            models::invoice::Invoice,
            models::invoice::InvoiceView,
            models::invoice::InvoicePayload,
            models::invoice::InvoiceStatusPayload,
            models::invoice::InvoiceStatusCounts,
            models::invoice::InvoiceAmountTotals,
            models::invoice::InvoicePeriodTotals,
            models::invoice::InvoiceUserTotals,
            models::invoice::InvoiceStats,

            // --- Banks ---
            models::bank::AccountType,
            models::bank::Bank,
            models::bank::BankPayload,

            // --- Listing ---
            models::listing::SortKey,
            models::listing::SortOrder,
        )
    ),
    tags(
        (name = "Auth", description = "Sign in, session and own profile"),
        (name = "Files", description = "Valuation files"),
        (name = "Invoices", description = "Invoices with GST"),
        (name = "Banks", description = "Bank accounts printed on invoices"),
        (name = "Users", description = "User administration (admins only)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
