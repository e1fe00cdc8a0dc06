// src/models/invoice.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::file::{join_name, trim_opt, upper, upper_opt, validate_not_negative};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Pending,
    Paid,
    PartiallyPaid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Pending => "Pending",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::PartiallyPaid => "Partially Paid",
            InvoiceStatus::Overdue => "Overdue",
            InvoiceStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GstType {
    #[serde(rename = "CGST_SGST")]
    CgstSgst,
    #[serde(rename = "IGST")]
    Igst,
}

fn validate_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if (rate.is_sign_negative() && !rate.is_zero()) || *rate > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.message = Some("Rate must be between 0 and 100".into());
        return Err(err);
    }
    Ok(())
}

/// GST configuration of an invoice. Amounts are always derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct GstSettings {
    pub gst_applicable: bool,
    pub gst_type: GstType,
    #[validate(custom(function = "validate_rate"))]
    #[schema(example = "9")]
    pub cgst_rate: Decimal,
    #[validate(custom(function = "validate_rate"))]
    #[schema(example = "9")]
    pub sgst_rate: Decimal,
    #[validate(custom(function = "validate_rate"))]
    #[schema(example = "18")]
    pub igst_rate: Decimal,
}

impl Default for GstSettings {
    fn default() -> Self {
        Self {
            gst_applicable: false,
            gst_type: GstType::CgstSgst,
            cgst_rate: Decimal::from(9),
            sgst_rate: Decimal::from(9),
            igst_rate: Decimal::from(18),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub base: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub tax_total: Decimal,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,

    #[schema(example = "02/25-26")]
    pub invoice_number: String,

    #[schema(value_type = String, format = Date)]
    pub invoice_date: NaiveDate,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,
    pub payment_date: Option<DateTime<Utc>>,

    pub status: InvoiceStatus,

    // Client
    pub client_first_name: String,
    pub client_middle_name: Option<String>,
    pub client_last_name: String,
    pub client_address: Option<String>,
    pub client_gst_number: Option<String>,

    // Bank
    pub bank_name: String,
    pub branch_name: Option<String>,

    pub report_maker: String,
    pub inspected_by: String,
    pub description: Option<String>,

    // Amounts
    #[schema(example = "5000.00")]
    pub professional_fees: Decimal,
    #[schema(example = "1000.00")]
    pub advance: Decimal,
    /// Pre-tax total: `professional_fees - advance`.
    #[schema(example = "4000.00")]
    pub total: Decimal,

    #[serde(flatten)]
    pub gst: GstSettings,

    // Linked valuation files
    pub file_id: Option<Uuid>,
    #[serde(default)]
    pub additional_file_ids: Vec<Uuid>,

    #[serde(default)]
    pub notes: String,

    pub created_by: Uuid,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    pub fn client_name(&self) -> String {
        join_name(
            &self.client_first_name,
            self.client_middle_name.as_deref(),
            &self.client_last_name,
        )
    }

    pub fn recompute_total(&mut self) {
        self.total = self.professional_fees - self.advance;
    }
}

// Invoice as returned by the API, with the derived tax lines
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub tax: TaxBreakdown,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    #[schema(value_type = Option<String>, format = Date)]
    pub invoice_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date)]
    pub due_date: Option<NaiveDate>,

    #[serde(default)]
    pub client_first_name: String,
    pub client_middle_name: Option<String>,
    #[serde(default)]
    pub client_last_name: String,
    pub client_address: Option<String>,
    pub client_gst_number: Option<String>,

    #[serde(default)]
    pub bank_name: String,
    pub branch_name: Option<String>,

    pub report_maker: Option<String>,
    #[serde(default)]
    pub inspected_by: String,
    pub description: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub professional_fees: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub advance: Decimal,

    #[validate(nested)]
    #[serde(flatten)]
    pub gst: GstSettings,

    pub file_id: Option<Uuid>,
    #[serde(default)]
    pub additional_file_ids: Vec<Uuid>,

    // Drafts skip the required-field checks
    #[serde(default)]
    pub save_as_draft: bool,
}

impl InvoicePayload {
    pub fn normalized(mut self) -> Self {
        self.client_first_name = upper(&self.client_first_name);
        self.client_middle_name = upper_opt(self.client_middle_name);
        self.client_last_name = upper(&self.client_last_name);
        self.client_address = upper_opt(self.client_address);
        self.client_gst_number = upper_opt(self.client_gst_number);
        self.bank_name = upper(&self.bank_name);
        self.branch_name = upper_opt(self.branch_name);
        self.report_maker = trim_opt(self.report_maker);
        self.inspected_by = self.inspected_by.trim().to_string();
        self.description = trim_opt(self.description);
        self
    }

    /// Required fields of a submitted (non-draft) invoice. `report_maker` is
    /// checked after it has been defaulted from the caller.
    pub fn validate_required(&self, report_maker: &str) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut require = |field: &'static str, present: bool| {
            if !present {
                let mut err = ValidationError::new("required");
                err.message = Some("This field is required".into());
                errors.add(field, err);
            }
        };
        require("bankName", !self.bank_name.is_empty());
        require("clientFirstName", !self.client_first_name.is_empty());
        require("clientLastName", !self.client_last_name.is_empty());
        require("reportMaker", !report_maker.trim().is_empty());
        require("inspectedBy", !self.inspected_by.is_empty());
        require("invoiceDate", self.invoice_date.is_some());

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStatusPayload {
    pub status: InvoiceStatus,
    pub payment_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStatusCounts {
    pub all: usize,
    pub draft: usize,
    pub pending: usize,
    pub paid: usize,
    pub partially_paid: usize,
    pub overdue: usize,
    pub cancelled: usize,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceAmountTotals {
    pub total: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
    pub overdue: Decimal,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePeriodTotals {
    pub count: usize,
    pub amount: Decimal,
}

/// Totals over the invoices the caller created themselves.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceUserTotals {
    pub count: usize,
    pub amount: Decimal,
    pub pending: Decimal,
    pub paid: Decimal,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStats {
    pub counts: InvoiceStatusCounts,
    pub amounts: InvoiceAmountTotals,
    /// Invoices dated in the current calendar month
    pub this_month: InvoicePeriodTotals,
    pub mine: InvoiceUserTotals,
    /// Latest five by creation time
    pub recent: Vec<InvoiceView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gst_settings_are_flattened_with_defaults() {
        let payload: InvoicePayload = serde_json::from_value(json!({
            "bankName": "HDFC BANK",
            "professionalFees": 5000,
            "advance": 1000,
            "gstApplicable": true
        }))
        .unwrap();
        assert!(payload.gst.gst_applicable);
        assert_eq!(payload.gst.gst_type, GstType::CgstSgst);
        assert_eq!(payload.gst.igst_rate, Decimal::from(18));
        assert_eq!(payload.advance, Decimal::from(1000));
    }

    #[test]
    fn gst_type_wire_names() {
        assert_eq!(serde_json::to_string(&GstType::CgstSgst).unwrap(), "\"CGST_SGST\"");
        assert_eq!(serde_json::to_string(&GstType::Igst).unwrap(), "\"IGST\"");
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::PartiallyPaid).unwrap(),
            "\"partially_paid\""
        );
    }

    #[test]
    fn rates_outside_percentage_range_are_rejected() {
        assert!(validate_rate(&Decimal::from(101)).is_err());
        assert!(validate_rate(&Decimal::from(-1)).is_err());
        assert!(validate_rate(&Decimal::from(18)).is_ok());
    }

    #[test]
    fn required_fields_are_reported_per_field() {
        let payload: InvoicePayload = serde_json::from_value(json!({})).unwrap();
        let errors = payload.validate_required("").unwrap_err();
        let fields = errors.field_errors();
        for field in [
            "bankName",
            "clientFirstName",
            "clientLastName",
            "reportMaker",
            "inspectedBy",
            "invoiceDate",
        ] {
            assert!(fields.contains_key(field), "missing {}", field);
        }
    }

    #[test]
    fn total_is_fees_minus_advance() {
        let mut invoice: Invoice = serde_json::from_value(json!({
            "id": Uuid::nil(),
            "invoiceNumber": "01/25-26",
            "invoiceDate": "2025-05-01",
            "dueDate": null,
            "paymentDate": null,
            "status": "pending",
            "clientFirstName": "A",
            "clientMiddleName": null,
            "clientLastName": "B",
            "clientAddress": null,
            "clientGstNumber": null,
            "bankName": "SBI",
            "branchName": null,
            "reportMaker": "X",
            "inspectedBy": "Y",
            "description": null,
            "professionalFees": 5000,
            "advance": 1000,
            "total": 0,
            "gstApplicable": false,
            "gstType": "IGST",
            "cgstRate": 9,
            "sgstRate": 9,
            "igstRate": 18,
            "fileId": null,
            "createdBy": Uuid::nil(),
            "createdByName": "X",
            "createdAt": "2025-05-01T00:00:00Z",
            "updatedAt": "2025-05-01T00:00:00Z"
        }))
        .unwrap();
        invoice.recompute_total();
        assert_eq!(invoice.total, Decimal::from(4000));
        assert_eq!(invoice.gst.gst_type, GstType::Igst);
    }
}
