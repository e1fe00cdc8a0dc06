// src/services/listing.rs

use std::cmp::Ordering;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    file::ValuationFile,
    invoice::Invoice,
    listing::{FileQuery, InvoiceQuery, Page, SortKey, SortOrder},
};

pub const MAX_PAGE_SIZE: usize = 100;

// ============================================================================
// PREDICATES
// ============================================================================

// Case-insensitive substring; an absent or blank needle matches everything.
fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}

fn contains_ci_opt(haystack: Option<&str>, needle: Option<&str>) -> bool {
    contains_ci(haystack.unwrap_or_default(), needle)
}

fn any_contains_ci(haystacks: &[&str], needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(_) => haystacks.iter().any(|h| contains_ci(h, needle)),
    }
}

fn in_date_range(value: NaiveDate, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    from.is_none_or(|from| value >= from) && to.is_none_or(|to| value <= to)
}

fn in_amount_range(value: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
}

pub fn file_matches(file: &ValuationFile, q: &FileQuery) -> bool {
    let client_name = file.client_name();
    q.status.is_none_or(|status| file.status == status)
        && contains_ci(&file.bank_name, q.bank_name.as_deref())
        && contains_ci_opt(file.branch_name.as_deref(), q.branch_name.as_deref())
        && contains_ci(&file.description, q.description.as_deref())
        && contains_ci_opt(file.inspected_by.as_deref(), q.inspected_by.as_deref())
        && contains_ci(&file.made_by, q.made_by.as_deref())
        && contains_ci(&client_name, q.client_name.as_deref())
        && contains_ci_opt(file.client_phone.as_deref(), q.client_phone.as_deref())
        && contains_ci_opt(file.client_email.as_deref(), q.client_email.as_deref())
        && contains_ci(&file.file_number, q.file_number.as_deref())
        && any_contains_ci(
            &[client_name.as_str(), file.file_number.as_str(), file.bank_name.as_str()],
            q.search.as_deref(),
        )
        && in_date_range(file.file_date, q.date_from, q.date_to)
        && in_amount_range(file.property_value, q.min_value, q.max_value)
}

pub fn invoice_matches(invoice: &Invoice, q: &InvoiceQuery) -> bool {
    let client_name = invoice.client_name();
    q.status.is_none_or(|status| invoice.status == status)
        && contains_ci(&invoice.bank_name, q.bank_name.as_deref())
        && contains_ci_opt(invoice.branch_name.as_deref(), q.branch_name.as_deref())
        && any_contains_ci(
            &[
                client_name.as_str(),
                invoice.invoice_number.as_str(),
                invoice.bank_name.as_str(),
            ],
            q.search.as_deref(),
        )
        && q
            .gst_applicable
            .is_none_or(|gst| invoice.gst.gst_applicable == gst)
        && in_date_range(invoice.invoice_date, q.date_from, q.date_to)
        && in_amount_range(invoice.total, q.min_amount, q.max_amount)
}

// ============================================================================
// SORTING
// ============================================================================

// Date sorts break same-day ties on creation time.
// Stable in both directions: descending compares reversed keys instead of
// reversing the output, so ties keep their collection order.
fn sort_with<T, K: Ord>(items: &mut [T], order: SortOrder, key: impl Fn(&T) -> K) {
    items.sort_by(|a, b| {
        let ordering: Ordering = key(a).cmp(&key(b));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

pub fn sort_files(files: &mut [ValuationFile], by: SortKey, order: SortOrder) {
    match by {
        SortKey::Date => sort_with(files, order, |f| (f.file_date, f.created_at)),
        SortKey::Amount => sort_with(files, order, |f| f.property_value),
        SortKey::Name => sort_with(files, order, |f| f.client_name().to_lowercase()),
        SortKey::Status => sort_with(files, order, |f| f.status.label()),
        SortKey::Reference => sort_with(files, order, |f| f.file_number.clone()),
    }
}

pub fn sort_invoices(invoices: &mut [Invoice], by: SortKey, order: SortOrder) {
    match by {
        SortKey::Date => sort_with(invoices, order, |i| (i.invoice_date, i.created_at)),
        SortKey::Amount => sort_with(invoices, order, |i| i.total),
        SortKey::Name => sort_with(invoices, order, |i| i.client_name().to_lowercase()),
        SortKey::Status => sort_with(invoices, order, |i| i.status.label()),
        SortKey::Reference => sort_with(invoices, order, |i| i.invoice_number.clone()),
    }
}

// ============================================================================
// PAGINATION
// ============================================================================

/// Slices one 1-based page out of `items`. Page 0 reads as page 1 and the
/// size is clamped to `1..=MAX_PAGE_SIZE`.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();

    Page { items, page, page_size, total_items, total_pages }
}

/// Filter, sort and page in one go. `visible` has already been access-checked.
pub fn list_files(
    mut visible: Vec<ValuationFile>,
    q: &FileQuery,
    default_page_size: usize,
) -> Page<ValuationFile> {
    visible.retain(|f| file_matches(f, q));
    sort_files(&mut visible, q.sort_by, q.sort_order);
    paginate(
        visible,
        q.page.unwrap_or(1),
        q.page_size.unwrap_or(default_page_size),
    )
}

pub fn list_invoices(
    mut visible: Vec<Invoice>,
    q: &InvoiceQuery,
    default_page_size: usize,
) -> Page<Invoice> {
    visible.retain(|i| invoice_matches(i, q));
    sort_invoices(&mut visible, q.sort_by, q.sort_order);
    paginate(
        visible,
        q.page.unwrap_or(1),
        q.page_size.unwrap_or(default_page_size),
    )
}
