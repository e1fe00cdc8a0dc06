// src/models/listing.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::{file::FileStatus, invoice::InvoiceStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Amount,
    Name,
    Status,
    Reference,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Query string of `GET /api/files`. Every filter is optional and they AND together.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct FileQuery {
    pub status: Option<FileStatus>,
    pub bank_name: Option<String>,
    pub branch_name: Option<String>,
    /// Property type
    pub description: Option<String>,
    pub inspected_by: Option<String>,
    pub made_by: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub file_number: Option<String>,
    /// Matches client name, file number or bank name
    pub search: Option<String>,
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
    #[param(value_type = Option<f64>)]
    pub min_value: Option<Decimal>,
    #[param(value_type = Option<f64>)]
    pub max_value: Option<Decimal>,
    #[param(inline)]
    pub sort_by: SortKey,
    #[param(inline)]
    pub sort_order: SortOrder,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct InvoiceQuery {
    pub status: Option<InvoiceStatus>,
    pub bank_name: Option<String>,
    pub branch_name: Option<String>,
    /// Matches client name, invoice number or bank name
    pub search: Option<String>,
    pub gst_applicable: Option<bool>,
    #[param(value_type = Option<String>, format = Date)]
    pub date_from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date)]
    pub date_to: Option<NaiveDate>,
    #[param(value_type = Option<f64>)]
    pub min_amount: Option<Decimal>,
    #[param(value_type = Option<f64>)]
    pub max_amount: Option<Decimal>,
    #[param(inline)]
    pub sort_by: SortKey,
    #[param(inline)]
    pub sort_order: SortOrder,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NextInvoiceNumberQuery {
    #[serde(default)]
    pub bank_name: String,
    #[serde(default)]
    pub gst_applicable: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfirmQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}
