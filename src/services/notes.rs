// src/services/notes.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::common::money::format_inr;

/// One audit line: `dd/mm/yyyy - Full Name action`.
pub fn entry(date: NaiveDate, author: &str, action: &str) -> String {
    format!("{} - {} {}", date.format("%d/%m/%Y"), author, action)
}

/// Appends entries to a newline-delimited log. Existing lines are never touched.
pub fn append<I>(notes: &mut String, date: NaiveDate, author: &str, actions: I)
where
    I: IntoIterator<Item = String>,
{
    for action in actions {
        if !notes.is_empty() {
            notes.push('\n');
        }
        notes.push_str(&entry(date, author, &action));
    }
}

// Field-level diff of an edit, one action per changed field.
#[derive(Debug, Default)]
pub struct ChangeSet {
    actions: Vec<String>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, label: &str, before: &str, after: &str) -> &mut Self {
        if before != after {
            self.actions
                .push(format!("changed {} from \"{}\" to \"{}\"", label, before, after));
        }
        self
    }

    pub fn opt_text(&mut self, label: &str, before: Option<&str>, after: Option<&str>) -> &mut Self {
        self.text(label, before.unwrap_or_default(), after.unwrap_or_default())
    }

    pub fn amount(&mut self, label: &str, before: Decimal, after: Decimal) -> &mut Self {
        if before != after {
            self.actions.push(format!(
                "changed {} from {} to {}",
                label,
                format_inr(before),
                format_inr(after)
            ));
        }
        self
    }

    pub fn flag(&mut self, label: &str, before: bool, after: bool) -> &mut Self {
        let yes_no = |v: bool| if v { "yes" } else { "no" };
        self.text(label, yes_no(before), yes_no(after))
    }

    pub fn date(&mut self, label: &str, before: Option<NaiveDate>, after: Option<NaiveDate>) -> &mut Self {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default();
        self.text(label, &fmt(before), &fmt(after))
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn into_actions(self) -> Vec<String> {
        self.actions
    }
}

pub fn status_change(before: &str, after: &str) -> String {
    format!("changed status from \"{}\" to \"{}\"", before, after)
}

pub fn free_text(note: &str) -> String {
    format!("added note: {}", note.trim())
}
