pub mod auth;
pub mod banks;
pub mod files;
pub mod invoices;
pub mod users;
