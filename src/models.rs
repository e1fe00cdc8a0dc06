pub mod auth;
pub mod bank;
pub mod file;
pub mod invoice;
pub mod listing;
