// src/models/file.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    Pending,
    InProgress,
    Completed,
    Hold,
    Returned,
    Cancelled,
}

impl FileStatus {
    pub const ALL: [FileStatus; 6] = [
        FileStatus::Pending,
        FileStatus::InProgress,
        FileStatus::Completed,
        FileStatus::Hold,
        FileStatus::Returned,
        FileStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Pending => "Pending",
            FileStatus::InProgress => "In Progress",
            FileStatus::Completed => "Completed",
            FileStatus::Hold => "Hold",
            FileStatus::Returned => "Returned",
            FileStatus::Cancelled => "Cancelled",
        }
    }
}

/// A valuation job. `file_number` is assigned once, at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuationFile {
    pub id: Uuid,

    #[schema(example = "FILE/001/25-26")]
    pub file_number: String,

    #[schema(value_type = String, format = Date, example = "2025-04-01")]
    pub file_date: NaiveDate,

    pub status: FileStatus,

    // Client
    #[schema(example = "ANIL")]
    pub client_first_name: String,
    pub client_middle_name: Option<String>,
    #[schema(example = "KUMAR")]
    pub client_last_name: String,
    pub client_address: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,

    // Bank
    #[schema(example = "STATE BANK OF INDIA")]
    pub bank_name: String,
    pub branch_name: Option<String>,

    // Property
    #[schema(example = "RESIDENTIAL FLAT")]
    pub description: String,
    #[schema(example = "2500000.00")]
    pub property_value: Decimal,

    // People
    pub made_by: String,
    pub inspected_by: Option<String>,

    pub remarks: Option<String>,

    /// Recorded when the file is completed against an invoice.
    pub invoice_amount: Option<Decimal>,

    /// Newline-delimited audit trail.
    #[serde(default)]
    pub notes: String,

    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ValuationFile {
    pub fn client_name(&self) -> String {
        join_name(
            &self.client_first_name,
            self.client_middle_name.as_deref(),
            &self.client_last_name,
        )
    }
}

pub fn join_name(first: &str, middle: Option<&str>, last: &str) -> String {
    [Some(first), middle, Some(last)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.message = Some("Amount must be a valid positive number".into());
        return Err(err);
    }
    Ok(())
}

// Create / full edit. Missing text fields read as empty so they fail
// validation per field instead of rejecting the whole body.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "First name is required"))]
    pub client_first_name: String,
    pub client_middle_name: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub client_last_name: String,
    pub client_address: Option<String>,
    pub client_phone: Option<String>,
    #[validate(email(message = "Email address is invalid"))]
    pub client_email: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Bank name is required"))]
    pub bank_name: String,
    pub branch_name: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "Property type is required"))]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub property_value: Decimal,

    // Defaults to the creator's full name
    pub made_by: Option<String>,
    pub inspected_by: Option<String>,
    pub remarks: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub file_date: Option<NaiveDate>,
}

impl FilePayload {
    /// Trims and upper-cases every free-text field; blank optionals become None.
    pub fn normalized(mut self) -> Self {
        self.client_first_name = upper(&self.client_first_name);
        self.client_middle_name = upper_opt(self.client_middle_name);
        self.client_last_name = upper(&self.client_last_name);
        self.client_address = upper_opt(self.client_address);
        self.client_phone = upper_opt(self.client_phone);
        self.client_email = upper_opt(self.client_email);
        self.bank_name = upper(&self.bank_name);
        self.branch_name = upper_opt(self.branch_name);
        self.description = upper(&self.description);
        self.remarks = upper_opt(self.remarks);
        self.made_by = trim_opt(self.made_by);
        self.inspected_by = trim_opt(self.inspected_by);
        self
    }
}

pub(crate) fn upper(value: &str) -> String {
    value.trim().to_uppercase()
}

pub(crate) fn upper_opt(value: Option<String>) -> Option<String> {
    trim_opt(value).map(|v| v.to_uppercase())
}

pub(crate) fn trim_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileStatusPayload {
    pub status: FileStatus,
    pub invoice_amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddNotePayload {
    #[validate(length(min = 1, message = "Note cannot be empty"))]
    pub note: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberResponse {
    #[schema(example = "FILE/002/25-26")]
    pub number: String,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub hold: usize,
    pub returned: usize,
    pub cancelled: usize,
}
