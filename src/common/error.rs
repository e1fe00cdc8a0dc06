// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

// Service-level error. Handlers convert it into an ApiError.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] ValidationErrors),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User account is inactive")]
    UserInactive,

    #[error("Forbidden")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Confirmation required")]
    ConfirmationRequired,

    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Anything unexpected; `anyhow` keeps the context for the log.
    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

// What actually goes over the wire.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl AppError {
    pub fn to_api_error(&self) -> ApiError {
        match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                collect_field_messages(errors, &mut details);
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "One or more fields are invalid.".into(),
                    details: Some(json!(details)),
                }
            }
            AppError::InvalidCredentials => {
                ApiError::new(StatusCode::UNAUTHORIZED, "Invalid username or password.")
            }
            AppError::InvalidToken => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "Authentication token is invalid or missing.",
            ),
            AppError::UserInactive => {
                ApiError::new(StatusCode::FORBIDDEN, "This account has been deactivated.")
            }
            AppError::Forbidden => ApiError::new(
                StatusCode::FORBIDDEN,
                "You are not allowed to perform this action.",
            ),
            AppError::NotFound(entity) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("{} not found.", entity))
            }
            AppError::ConfirmationRequired => ApiError::new(
                StatusCode::PRECONDITION_REQUIRED,
                "This action is destructive. Repeat the request with confirm=true.",
            ),
            AppError::UsernameAlreadyExists => {
                ApiError::new(StatusCode::CONFLICT, "This username is already taken.")
            }
            AppError::Conflict(message) => ApiError::new(StatusCode::CONFLICT, message.clone()),

            // Everything else is a 500. The detail goes to the log only.
            e => {
                tracing::error!("Internal server error: {}", e);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.",
                )
            }
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error().into_response()
    }
}

// Nested structs are flattened into the payload on the wire, so their
// fields are reported at the top level too.
fn collect_field_messages(errors: &ValidationErrors, details: &mut HashMap<String, Vec<String>>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                let messages = field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                });
                details.entry(camel_case(field)).or_default().extend(messages);
            }
            ValidationErrorsKind::Struct(nested) => collect_field_messages(nested, details),
            ValidationErrorsKind::List(items) => {
                for nested in items.values() {
                    collect_field_messages(nested, details);
                }
            }
        }
    }
}

// Payload fields are camelCase on the wire; `validator` reports the Rust names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for ch in field.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

// Builds a single-field ValidationErrors, for checks `validator` can't express.
pub fn field_error(field: &'static str, code: &'static str, message: &'static str) -> AppError {
    let mut err = validator::ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    AppError::ValidationError(errors)
}
