// src/services/invoice_service.rs

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{AppError, field_error},
        money::format_inr,
    },
    db::{Collections, RecordStore},
    models::{
        auth::User,
        invoice::{
            GstType, Invoice, InvoicePayload, InvoiceStats, InvoiceStatus, InvoiceStatusPayload,
            InvoiceView,
        },
        listing::{InvoiceQuery, Page},
    },
    services::{access, listing, notes, numbering, tax},
};

const RECENT_INVOICES: usize = 5;

pub fn view(invoice: Invoice) -> InvoiceView {
    let tax = tax::compute_tax(invoice.total, &invoice.gst);
    InvoiceView { invoice, tax }
}

fn is_overdue(invoice: &Invoice, today: NaiveDate) -> bool {
    invoice.status == InvoiceStatus::Overdue
        || (invoice.status == InvoiceStatus::Pending
            && invoice.due_date.is_some_and(|due| due < today))
}

// Linked files must exist. Duplicates go, and the primary is not repeated
// among the additional ones.
fn resolve_links(
    c: &Collections,
    file_id: Option<Uuid>,
    additional: Vec<Uuid>,
) -> Result<(Option<Uuid>, Vec<Uuid>), AppError> {
    let exists = |id: &Uuid| c.files.iter().any(|f| f.id == *id);

    if let Some(id) = &file_id
        && !exists(id)
    {
        return Err(field_error("fileId", "exists", "Linked file does not exist"));
    }

    let mut linked: Vec<Uuid> = Vec::with_capacity(additional.len());
    for id in additional {
        if !exists(&id) {
            return Err(field_error(
                "additionalFileIds",
                "exists",
                "Linked file does not exist",
            ));
        }
        if Some(id) != file_id && !linked.contains(&id) {
            linked.push(id);
        }
    }
    Ok((file_id, linked))
}

fn gst_type_label(gst_type: GstType) -> &'static str {
    match gst_type {
        GstType::CgstSgst => "CGST + SGST",
        GstType::Igst => "IGST",
    }
}

#[derive(Clone)]
pub struct InvoiceService {
    store: RecordStore,
}

impl InvoiceService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        user: &User,
        query: &InvoiceQuery,
        default_page_size: usize,
    ) -> Page<InvoiceView> {
        let visible = self
            .store
            .read(|c| access::visible(user, &c.invoices))
            .await;
        let page = listing::list_invoices(visible, query, default_page_size);
        Page {
            items: page.items.into_iter().map(view).collect(),
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
        }
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<InvoiceView, AppError> {
        let invoice = self
            .store
            .get::<Invoice>(id)
            .await
            .ok_or(AppError::NotFound("Invoice"))?;
        access::ensure_access(user, &invoice)?;
        Ok(view(invoice))
    }

    pub async fn next_number(&self, bank_name: &str, gst_applicable: bool, today: NaiveDate) -> String {
        let bank_name = bank_name.trim().to_uppercase();
        self.store
            .read(|c| numbering::next_invoice_number(&c.invoices, &bank_name, gst_applicable, today))
            .await
    }

    /// Counts per status and money totals over the invoices `user` may see.
    /// Amounts are grand totals, GST included.
    pub async fn stats(&self, user: &User, today: NaiveDate) -> InvoiceStats {
        let visible = self
            .store
            .read(|c| access::visible(user, &c.invoices))
            .await;

        let mut stats = InvoiceStats::default();
        for invoice in &visible {
            let counts = &mut stats.counts;
            counts.all += 1;
            match invoice.status {
                InvoiceStatus::Draft => counts.draft += 1,
                InvoiceStatus::Pending => counts.pending += 1,
                InvoiceStatus::Paid => counts.paid += 1,
                InvoiceStatus::PartiallyPaid => counts.partially_paid += 1,
                InvoiceStatus::Overdue => counts.overdue += 1,
                InvoiceStatus::Cancelled => counts.cancelled += 1,
            }

            let amount = tax::compute_tax(invoice.total, &invoice.gst).grand_total;
            let amounts = &mut stats.amounts;
            amounts.total += amount;
            match invoice.status {
                InvoiceStatus::Paid => amounts.paid += amount,
                InvoiceStatus::Pending => amounts.pending += amount,
                _ => {}
            }
            if is_overdue(invoice, today) {
                amounts.overdue += amount;
            }

            if invoice.invoice_date.year() == today.year()
                && invoice.invoice_date.month() == today.month()
            {
                stats.this_month.count += 1;
                stats.this_month.amount += amount;
            }

            if invoice.created_by == user.id {
                let mine = &mut stats.mine;
                mine.count += 1;
                mine.amount += amount;
                match invoice.status {
                    InvoiceStatus::Paid => mine.paid += amount,
                    InvoiceStatus::Pending => mine.pending += amount,
                    _ => {}
                }
            }
        }

        // Reversed first so equal timestamps put the later insert on top
        let mut recent: Vec<Invoice> = visible.into_iter().rev().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        stats.recent = recent.into_iter().take(RECENT_INVOICES).map(view).collect();
        stats
    }

    pub async fn create(
        &self,
        user: &User,
        payload: InvoicePayload,
        today: NaiveDate,
    ) -> Result<InvoiceView, AppError> {
        // 1. Normalise and validate
        let payload = payload.normalized();
        payload.validate()?;

        // Operators invoice their own work unless told otherwise
        let report_maker = match &payload.report_maker {
            Some(maker) => maker.clone(),
            None if !user.is_admin() => user.full_name.clone(),
            None => String::new(),
        };
        if !payload.save_as_draft {
            payload.validate_required(&report_maker)?;
        }

        let status = if payload.save_as_draft {
            InvoiceStatus::Draft
        } else {
            InvoiceStatus::Pending
        };
        let now = Utc::now();

        // 2. Link, number and insert under the store lock
        let invoice = self
            .store
            .transact(|c| {
                let (file_id, additional_file_ids) =
                    resolve_links(c, payload.file_id, payload.additional_file_ids)?;
                let invoice_number = numbering::next_invoice_number(
                    &c.invoices,
                    &payload.bank_name,
                    payload.gst.gst_applicable,
                    today,
                );

                let mut invoice = Invoice {
                    id: Uuid::now_v7(),
                    invoice_number,
                    invoice_date: payload.invoice_date.unwrap_or(today),
                    due_date: payload.due_date,
                    payment_date: None,
                    status,
                    client_first_name: payload.client_first_name,
                    client_middle_name: payload.client_middle_name,
                    client_last_name: payload.client_last_name,
                    client_address: payload.client_address,
                    client_gst_number: payload.client_gst_number,
                    bank_name: payload.bank_name,
                    branch_name: payload.branch_name,
                    report_maker,
                    inspected_by: payload.inspected_by,
                    description: payload.description,
                    professional_fees: payload.professional_fees,
                    advance: payload.advance,
                    total: Decimal::ZERO,
                    gst: payload.gst,
                    file_id,
                    additional_file_ids,
                    notes: String::new(),
                    created_by: user.id,
                    created_by_name: user.full_name.clone(),
                    created_at: now,
                    updated_at: now,
                };
                invoice.recompute_total();

                let action = format!(
                    "created invoice {} for {}",
                    invoice.invoice_number,
                    format_inr(invoice.total)
                );
                notes::append(&mut invoice.notes, today, &user.full_name, [action]);

                c.invoices.push(invoice.clone());
                Ok(invoice)
            })
            .await?;

        tracing::info!("🧾 Invoice {} created by {}", invoice.invoice_number, user.username);
        Ok(view(invoice))
    }

    /// Full edit. The number never changes; the total is recomputed. A draft
    /// submitted without `saveAsDraft` becomes pending.
    pub async fn update(
        &self,
        user: &User,
        id: Uuid,
        payload: InvoicePayload,
        today: NaiveDate,
    ) -> Result<InvoiceView, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        let invoice = self
            .store
            .transact(|c| {
                let (file_id, additional_file_ids) =
                    resolve_links(c, payload.file_id, payload.additional_file_ids.clone())?;

                let invoice = c
                    .invoices
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or(AppError::NotFound("Invoice"))?;
                access::ensure_access(user, &*invoice)?;

                // The number belongs to its GST bucket; moving buckets would let
                // the next invoice in the old bucket reuse it.
                if invoice.gst.gst_applicable != payload.gst.gst_applicable {
                    return Err(AppError::Conflict(format!(
                        "Invoice {} is already numbered; GST applicability cannot change.",
                        invoice.invoice_number
                    )));
                }

                let report_maker = payload
                    .report_maker
                    .clone()
                    .unwrap_or_else(|| invoice.report_maker.clone());
                let submitting = invoice.status == InvoiceStatus::Draft && !payload.save_as_draft;
                if invoice.status != InvoiceStatus::Draft || submitting {
                    payload.validate_required(&report_maker)?;
                }

                let before = invoice.clone();
                invoice.invoice_date = payload.invoice_date.unwrap_or(before.invoice_date);
                invoice.due_date = payload.due_date;
                invoice.client_first_name = payload.client_first_name.clone();
                invoice.client_middle_name = payload.client_middle_name.clone();
                invoice.client_last_name = payload.client_last_name.clone();
                invoice.client_address = payload.client_address.clone();
                invoice.client_gst_number = payload.client_gst_number.clone();
                invoice.bank_name = payload.bank_name.clone();
                invoice.branch_name = payload.branch_name.clone();
                invoice.report_maker = report_maker;
                invoice.inspected_by = payload.inspected_by.clone();
                invoice.description = payload.description.clone();
                invoice.professional_fees = payload.professional_fees;
                invoice.advance = payload.advance;
                invoice.gst = payload.gst.clone();
                invoice.file_id = file_id;
                invoice.additional_file_ids = additional_file_ids;
                invoice.recompute_total();

                let mut changes = notes::ChangeSet::new();
                changes
                    .date("invoice date", Some(before.invoice_date), Some(invoice.invoice_date))
                    .date("due date", before.due_date, invoice.due_date)
                    .text("client name", &before.client_name(), &invoice.client_name())
                    .opt_text("client address", before.client_address.as_deref(), invoice.client_address.as_deref())
                    .opt_text("client GST number", before.client_gst_number.as_deref(), invoice.client_gst_number.as_deref())
                    .text("bank name", &before.bank_name, &invoice.bank_name)
                    .opt_text("branch name", before.branch_name.as_deref(), invoice.branch_name.as_deref())
                    .text("report maker", &before.report_maker, &invoice.report_maker)
                    .text("inspected by", &before.inspected_by, &invoice.inspected_by)
                    .opt_text("description", before.description.as_deref(), invoice.description.as_deref())
                    .amount("professional fees", before.professional_fees, invoice.professional_fees)
                    .amount("advance", before.advance, invoice.advance)
                    .flag("GST", before.gst.gst_applicable, invoice.gst.gst_applicable)
                    .text("GST type", gst_type_label(before.gst.gst_type), gst_type_label(invoice.gst.gst_type))
                    .text("CGST rate", &before.gst.cgst_rate.normalize().to_string(), &invoice.gst.cgst_rate.normalize().to_string())
                    .text("SGST rate", &before.gst.sgst_rate.normalize().to_string(), &invoice.gst.sgst_rate.normalize().to_string())
                    .text("IGST rate", &before.gst.igst_rate.normalize().to_string(), &invoice.gst.igst_rate.normalize().to_string());
                if before.file_id != invoice.file_id
                    || before.additional_file_ids != invoice.additional_file_ids
                {
                    let linked = invoice.file_id.iter().count() + invoice.additional_file_ids.len();
                    changes.text("linked files", "", &format!("{} file(s)", linked));
                }

                let mut actions = changes.into_actions();
                if submitting {
                    invoice.status = InvoiceStatus::Pending;
                    actions.push(notes::status_change(
                        InvoiceStatus::Draft.label(),
                        InvoiceStatus::Pending.label(),
                    ));
                }

                if !actions.is_empty() {
                    notes::append(&mut invoice.notes, today, &user.full_name, actions);
                    invoice.updated_at = Utc::now();
                }
                Ok(invoice.clone())
            })
            .await?;

        tracing::info!("🧾 Invoice {} updated by {}", invoice.invoice_number, user.username);
        Ok(view(invoice))
    }

    // Paid invoices carry a payment date; every other status clears it.
    pub async fn set_status(
        &self,
        user: &User,
        id: Uuid,
        payload: InvoiceStatusPayload,
        today: NaiveDate,
    ) -> Result<InvoiceView, AppError> {
        let invoice = self
            .store
            .transact(|c| {
                let invoice = c
                    .invoices
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or(AppError::NotFound("Invoice"))?;
                access::ensure_access(user, &*invoice)?;

                let previous = invoice.status;
                invoice.status = payload.status;
                invoice.payment_date = match payload.status {
                    InvoiceStatus::Paid => Some(
                        payload
                            .payment_date
                            .or(invoice.payment_date)
                            .unwrap_or_else(Utc::now),
                    ),
                    _ => None,
                };

                if previous != payload.status {
                    let action = notes::status_change(previous.label(), payload.status.label());
                    notes::append(&mut invoice.notes, today, &user.full_name, [action]);
                }
                invoice.updated_at = Utc::now();
                Ok(invoice.clone())
            })
            .await?;

        tracing::info!(
            "🧾 Invoice {} is now {}",
            invoice.invoice_number,
            invoice.status.label()
        );
        Ok(view(invoice))
    }

    pub async fn add_note(
        &self,
        user: &User,
        id: Uuid,
        note: &str,
        today: NaiveDate,
    ) -> Result<InvoiceView, AppError> {
        if note.trim().is_empty() {
            return Err(field_error("note", "length", "Note cannot be empty"));
        }

        let invoice = self
            .store
            .transact(|c| {
                let invoice = c
                    .invoices
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or(AppError::NotFound("Invoice"))?;
                access::ensure_access(user, &*invoice)?;

                notes::append(&mut invoice.notes, today, &user.full_name, [notes::free_text(note)]);
                invoice.updated_at = Utc::now();
                Ok(invoice.clone())
            })
            .await?;
        Ok(view(invoice))
    }

    pub async fn delete(&self, user: &User, id: Uuid, confirm: bool) -> Result<(), AppError> {
        if !confirm {
            return Err(AppError::ConfirmationRequired);
        }

        let removed = self
            .store
            .transact(|c| {
                let index = c
                    .invoices
                    .iter()
                    .position(|i| i.id == id)
                    .ok_or(AppError::NotFound("Invoice"))?;
                access::ensure_access(user, &c.invoices[index])?;
                Ok(c.invoices.remove(index))
            })
            .await?;

        tracing::info!("🗑️ Invoice {} deleted by {}", removed.invoice_number, user.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::models::file::FilePayload;
    use crate::services::{
        file_service::FileService,
        fixtures::{self, today, user},
    };
    use chrono::TimeZone;
    use serde_json::json;

    fn payload(gst: bool) -> InvoicePayload {
        serde_json::from_value(json!({
            "invoiceDate": "2025-06-15",
            "clientFirstName": "Anil",
            "clientLastName": "Kumar",
            "bankName": "HDFC Bank",
            "inspectedBy": "Amit Das",
            "professionalFees": 5000,
            "advance": 1000,
            "gstApplicable": gst,
            "gstType": "CGST_SGST",
            "cgstRate": 9,
            "sgstRate": 9
        }))
        .unwrap()
    }

    async fn service() -> InvoiceService {
        InvoiceService::new(fixtures::store().await)
    }

    #[tokio::test]
    async fn gst_invoice_totals() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);

        let created = invoices.create(&op, payload(true), today()).await.unwrap();

        assert_eq!(created.invoice.invoice_number, "01/25-26");
        assert_eq!(created.invoice.status, InvoiceStatus::Pending);
        assert_eq!(created.invoice.report_maker, "Rahul Sen");
        assert_eq!(created.invoice.total, Decimal::from(4000));
        assert_eq!(created.tax.cgst, Decimal::from(360));
        assert_eq!(created.tax.sgst, Decimal::from(360));
        assert_eq!(created.tax.grand_total, Decimal::from(4720));
        assert!(created.invoice.notes.ends_with("created invoice 01/25-26 for ₹4,000.00"));

        let second = invoices.create(&op, payload(true), today()).await.unwrap();
        assert_eq!(second.invoice.invoice_number, "02/25-26");
    }

    #[tokio::test]
    async fn non_gst_invoices_carry_the_bank() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        invoices.create(&op, payload(true), today()).await.unwrap();

        let plain = invoices.create(&op, payload(false), today()).await.unwrap();
        assert_eq!(plain.invoice.invoice_number, "HDFC/01/25-26");
        assert_eq!(plain.tax.grand_total, Decimal::from(4000));
        assert_eq!(invoices.next_number("hdfc bank", false, today()).await, "HDFC/02/25-26");
        assert_eq!(invoices.next_number("", true, today()).await, "02/25-26");
    }

    #[tokio::test]
    async fn submitted_invoices_need_required_fields_but_drafts_do_not() {
        let invoices = service().await;
        let admin = user("Boss", Role::Admin);

        let empty: InvoicePayload = serde_json::from_value(json!({})).unwrap();
        let Err(AppError::ValidationError(errors)) =
            invoices.create(&admin, empty, today()).await
        else {
            panic!("expected validation error");
        };
        assert!(errors.field_errors().contains_key("reportMaker"));

        let draft: InvoicePayload =
            serde_json::from_value(json!({ "saveAsDraft": true })).unwrap();
        let created = invoices.create(&admin, draft, today()).await.unwrap();
        assert_eq!(created.invoice.status, InvoiceStatus::Draft);
        assert_eq!(created.invoice.invoice_date, today());
    }

    #[tokio::test]
    async fn rates_out_of_range_are_rejected() {
        let invoices = service().await;
        let mut bad = payload(true);
        bad.gst.igst_rate = Decimal::from(150);
        assert!(matches!(
            invoices.create(&user("A", Role::Admin), bad, today()).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn edits_recompute_total_and_keep_number() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let created = invoices.create(&op, payload(true), today()).await.unwrap();

        let mut edit = payload(true);
        edit.advance = Decimal::from(2000);
        let updated = invoices.update(&op, created.invoice.id, edit, today()).await.unwrap();

        assert_eq!(updated.invoice.invoice_number, "01/25-26");
        assert_eq!(updated.invoice.total, Decimal::from(3000));
        assert_eq!(updated.tax.grand_total, Decimal::from(3540));
        assert!(updated.invoice.notes.ends_with("changed advance from ₹1,000.00 to ₹2,000.00"));
    }

    #[tokio::test]
    async fn gst_applicability_is_fixed_once_numbered() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let first = invoices.create(&op, payload(true), today()).await.unwrap();

        assert!(matches!(
            invoices.update(&op, first.invoice.id, payload(false), today()).await,
            Err(AppError::Conflict(_))
        ));
        let unchanged = invoices.get(&op, first.invoice.id).await.unwrap();
        assert!(unchanged.invoice.gst.gst_applicable);

        let second = invoices.create(&op, payload(true), today()).await.unwrap();
        assert_ne!(second.invoice.invoice_number, first.invoice.invoice_number);
        assert_eq!(second.invoice.invoice_number, "02/25-26");
    }

    #[tokio::test]
    async fn payment_date_follows_paid_status() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let created = invoices.create(&op, payload(true), today()).await.unwrap();
        let paid_on = Utc.with_ymd_and_hms(2025, 7, 1, 10, 0, 0).unwrap();

        let paid = invoices
            .set_status(
                &op,
                created.invoice.id,
                InvoiceStatusPayload { status: InvoiceStatus::Paid, payment_date: Some(paid_on) },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(paid.invoice.payment_date, Some(paid_on));

        let reopened = invoices
            .set_status(
                &op,
                created.invoice.id,
                InvoiceStatusPayload { status: InvoiceStatus::Pending, payment_date: Some(paid_on) },
                today(),
            )
            .await
            .unwrap();
        assert_eq!(reopened.invoice.payment_date, None);
        assert!(reopened.invoice.notes.ends_with("changed status from \"Paid\" to \"Pending\""));
    }

    #[tokio::test]
    async fn file_links_are_checked_and_deduplicated() {
        let store = fixtures::store().await;
        let files = FileService::new(store.clone());
        let invoices = InvoiceService::new(store);
        let op = user("Rahul Sen", Role::ComputerOperator);

        let file_payload: FilePayload = serde_json::from_value(json!({
            "clientFirstName": "Anil",
            "clientLastName": "Kumar",
            "bankName": "HDFC Bank",
            "description": "Flat",
            "propertyValue": 100
        }))
        .unwrap();
        let a = files.create(&op, file_payload.clone(), today()).await.unwrap();
        let b = files.create(&op, file_payload, today()).await.unwrap();

        let mut linked = payload(true);
        linked.file_id = Some(a.id);
        linked.additional_file_ids = vec![b.id, a.id, b.id];
        let created = invoices.create(&op, linked, today()).await.unwrap();
        assert_eq!(created.invoice.file_id, Some(a.id));
        assert_eq!(created.invoice.additional_file_ids, vec![b.id]);

        let mut dangling = payload(true);
        dangling.file_id = Some(Uuid::now_v7());
        assert!(matches!(
            invoices.create(&op, dangling, today()).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn stats_use_grand_totals_and_detect_overdue() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);

        let mut late = payload(true);
        late.due_date = NaiveDate::from_ymd_opt(2025, 6, 1);
        invoices.create(&op, late, today()).await.unwrap();
        let paid = invoices.create(&op, payload(false), today()).await.unwrap();
        invoices
            .set_status(
                &op,
                paid.invoice.id,
                InvoiceStatusPayload { status: InvoiceStatus::Paid, payment_date: None },
                today(),
            )
            .await
            .unwrap();

        let stats = invoices.stats(&op, today()).await;
        assert_eq!(stats.counts.all, 2);
        assert_eq!(stats.counts.paid, 1);
        assert_eq!(stats.amounts.total, Decimal::from(8720));
        assert_eq!(stats.amounts.paid, Decimal::from(4000));
        assert_eq!(stats.amounts.pending, Decimal::from(4720));
        assert_eq!(stats.amounts.overdue, Decimal::from(4720));

        // someone else sees none of it
        let other = invoices.stats(&user("Amit Das", Role::Inspector), today()).await;
        assert_eq!(other.counts.all, 0);
    }

    #[tokio::test]
    async fn stats_cover_this_month_and_the_callers_own_invoices() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let admin = user("Admin", Role::Admin);

        invoices.create(&op, payload(true), today()).await.unwrap();
        let mut may = payload(false);
        may.invoice_date = NaiveDate::from_ymd_opt(2025, 5, 31);
        invoices.create(&op, may, today()).await.unwrap();
        let mut own = payload(false);
        own.report_maker = Some("Admin".into());
        let own = invoices.create(&admin, own, today()).await.unwrap();
        invoices
            .set_status(
                &admin,
                own.invoice.id,
                InvoiceStatusPayload { status: InvoiceStatus::Paid, payment_date: None },
                today(),
            )
            .await
            .unwrap();

        let stats = invoices.stats(&admin, today()).await;
        assert_eq!(stats.counts.all, 3);
        // the May invoice falls outside June
        assert_eq!(stats.this_month.count, 2);
        assert_eq!(stats.this_month.amount, Decimal::from(8720));
        assert_eq!(stats.mine.count, 1);
        assert_eq!(stats.mine.amount, Decimal::from(4000));
        assert_eq!(stats.mine.paid, Decimal::from(4000));
        assert_eq!(stats.mine.pending, Decimal::ZERO);

        let stats = invoices.stats(&op, today()).await;
        assert_eq!(stats.counts.all, 2);
        assert_eq!(stats.mine.count, 2);
        assert_eq!(stats.mine.pending, Decimal::from(8720));
    }

    #[tokio::test]
    async fn stats_list_the_five_latest_invoices_newest_first() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);

        let mut numbers = Vec::new();
        for _ in 0..6 {
            let created = invoices.create(&op, payload(true), today()).await.unwrap();
            numbers.push(created.invoice.invoice_number);
        }

        let stats = invoices.stats(&op, today()).await;
        let recent: Vec<_> = stats
            .recent
            .iter()
            .map(|v| v.invoice.invoice_number.clone())
            .collect();
        let expected: Vec<_> = numbers.iter().rev().take(5).cloned().collect();
        assert_eq!(recent, expected);
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let invoices = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let created = invoices.create(&op, payload(true), today()).await.unwrap();

        assert!(matches!(
            invoices.delete(&op, created.invoice.id, false).await,
            Err(AppError::ConfirmationRequired)
        ));
        invoices.delete(&op, created.invoice.id, true).await.unwrap();
        assert!(invoices.get(&op, created.invoice.id).await.is_err());
    }
}
