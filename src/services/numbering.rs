// src/services/numbering.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::models::{file::ValuationFile, invoice::Invoice};

pub const BANK_PLACEHOLDER: &str = "BNK";
pub const CLIENT_PLACEHOLDER: &str = "CLT";
pub const INSPECTOR_PLACEHOLDER: &str = "INS";
pub const MAKER_PLACEHOLDER: &str = "MKR";

const KNOWN_BANKS: [(&str, &str); 7] = [
    ("STATE BANK OF INDIA", "SBI"),
    ("PUNJAB NATIONAL BANK", "PNB"),
    ("UNITED BANK OF INDIA", "UBI"),
    ("BANK OF MAHARASHTRA", "BOM"),
    ("HDFC BANK", "HDFC"),
    ("ICICI BANK", "ICICI"),
    ("AXIS BANK", "AXIS"),
];

/// `YY-YY` token of the Indian financial year (April to March) containing `date`.
pub fn financial_year(date: NaiveDate) -> String {
    let start = if date.month() >= 4 { date.year() } else { date.year() - 1 };
    format!(
        "{:02}-{:02}",
        start.rem_euclid(100),
        (start + 1).rem_euclid(100)
    )
}

/// Upper-case initials of every word, or `placeholder` when there are none.
pub fn short_form(name: &str, placeholder: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if initials.is_empty() {
        placeholder.to_string()
    } else {
        initials
    }
}

pub fn bank_short_form(bank_name: &str) -> String {
    let normalized = bank_name.split_whitespace().collect::<Vec<_>>().join(" ");
    KNOWN_BANKS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&normalized))
        .map(|(_, short)| short.to_string())
        .unwrap_or_else(|| short_form(&normalized, BANK_PLACEHOLDER))
}

/// First run of ASCII digits anywhere in `reference`.
pub fn extract_serial(reference: &str) -> Option<u32> {
    let start = reference.find(|c: char| c.is_ascii_digit())?;
    let digits: &str = &reference[start..];
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse().ok()
}

/// Serial following `latest`. Missing, digit-less or overflowing references restart at 1.
pub fn next_serial(latest: Option<&str>) -> u32 {
    latest
        .and_then(extract_serial)
        .and_then(|serial| serial.checked_add(1))
        .unwrap_or(1)
}

// `BANK/NN/YY-YY` keeps its serial in the middle segment, whatever digits
// the bank short form carries.
fn invoice_serial(reference: &str) -> Option<u32> {
    match reference.split('/').collect::<Vec<_>>().as_slice() {
        [_, serial, _] => serial.trim().parse().ok(),
        _ => extract_serial(reference),
    }
}

// Reference of the most recently created record. On equal timestamps the one
// inserted later wins, as `max_by_key` returns the last maximum.
fn latest_reference<'a, T: 'a>(
    records: impl Iterator<Item = &'a T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
    reference: impl Fn(&T) -> &str,
) -> Option<&'a str> {
    records.max_by_key(|r| created_at(r)).map(|r| reference(r))
}

pub fn next_file_number(files: &[ValuationFile], today: NaiveDate) -> String {
    let latest = latest_reference(files.iter(), |f| f.created_at, |f| &f.file_number);
    format!("FILE/{:03}/{}", next_serial(latest), financial_year(today))
}

/// GST invoices: `NN/YY-YY`. Others: `BANK/NN/YY-YY`. Each bucket keeps its own serial.
pub fn next_invoice_number(
    invoices: &[Invoice],
    bank_name: &str,
    gst_applicable: bool,
    today: NaiveDate,
) -> String {
    let latest = latest_reference(
        invoices
            .iter()
            .filter(|inv| inv.gst.gst_applicable == gst_applicable),
        |inv| inv.created_at,
        |inv| &inv.invoice_number,
    );
    let serial = latest
        .and_then(invoice_serial)
        .and_then(|serial| serial.checked_add(1))
        .unwrap_or(1);
    let fy = financial_year(today);

    if gst_applicable {
        format!("{:02}/{}", serial, fy)
    } else {
        format!("{}/{:02}/{}", bank_short_form(bank_name), serial, fy)
    }
}
