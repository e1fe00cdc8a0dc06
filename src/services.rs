pub mod access;
pub mod auth;
pub mod bank_service;
pub mod file_service;
pub mod invoice_service;
pub mod listing;
pub mod notes;
pub mod numbering;
pub mod sync;
pub mod tax;
pub mod user_service;

#[cfg(test)]
pub mod fixtures;

pub use auth::AuthService;
pub use bank_service::BankService;
pub use file_service::FileService;
pub use invoice_service::InvoiceService;
pub use user_service::UserService;
