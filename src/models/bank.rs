// src/models/bank.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::file::upper;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AccountType {
    #[default]
    Current,
    Savings,
}

/// A bank account of the firm. At most one has `is_default` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub id: Uuid,
    #[schema(example = "STATE BANK OF INDIA")]
    pub bank_name: String,
    #[schema(example = "SALT LAKE")]
    pub branch_name: String,
    #[schema(example = "30012345678")]
    pub account_number: String,
    #[schema(example = "SBIN0001234")]
    pub ifsc_code: String,
    pub account_type: AccountType,
    #[schema(example = "S. SEN & ASSOCIATES")]
    pub account_holder_name: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ^[A-Z]{4}0[A-Z0-9]{6}$
fn validate_ifsc(code: &str) -> Result<(), ValidationError> {
    let code = code.trim().to_uppercase();
    let bytes = code.as_bytes();
    let well_formed = bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());

    if !well_formed {
        let mut err = ValidationError::new("ifsc");
        err.message = Some("Invalid IFSC code format".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankPayload {
    #[validate(length(min = 1, message = "Bank name is required"))]
    pub bank_name: String,
    #[validate(length(min = 1, message = "Branch name is required"))]
    pub branch_name: String,
    #[validate(length(min = 1, message = "Account number is required"))]
    pub account_number: String,
    #[validate(custom(function = "validate_ifsc"))]
    pub ifsc_code: String,
    #[serde(default)]
    pub account_type: AccountType,
    #[validate(length(min = 1, message = "Account holder name is required"))]
    pub account_holder_name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl BankPayload {
    pub fn normalized(mut self) -> Self {
        self.bank_name = upper(&self.bank_name);
        self.branch_name = upper(&self.branch_name);
        self.account_number = self.account_number.trim().to_string();
        self.ifsc_code = upper(&self.ifsc_code);
        self.account_holder_name = upper(&self.account_holder_name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ifsc_format() {
        assert!(validate_ifsc("SBIN0001234").is_ok());
        assert!(validate_ifsc("hdfc0abc123").is_ok());
        assert!(validate_ifsc("SBIN1001234").is_err());
        assert!(validate_ifsc("SBI0001234").is_err());
        assert!(validate_ifsc("SBIN000123!").is_err());
    }

    #[test]
    fn account_type_defaults_to_current() {
        let payload: BankPayload = serde_json::from_value(serde_json::json!({
            "bankName": "sbi",
            "branchName": "x",
            "accountNumber": "1",
            "ifscCode": "SBIN0001234",
            "accountHolderName": "y"
        }))
        .unwrap();
        assert_eq!(payload.account_type, AccountType::Current);
        assert!(!payload.is_default);
    }
}
