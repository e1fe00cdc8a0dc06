// src/services/file_service.rs

use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{AppError, field_error},
        money::format_inr,
    },
    db::RecordStore,
    models::{
        auth::User,
        file::{FilePayload, FileStats, FileStatus, FileStatusPayload, ValuationFile},
        listing::{FileQuery, Page},
    },
    services::{access, listing, notes, numbering},
};

#[derive(Clone)]
pub struct FileService {
    store: RecordStore,
}

impl FileService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        user: &User,
        query: &FileQuery,
        default_page_size: usize,
    ) -> Page<ValuationFile> {
        let visible = self
            .store
            .read(|c| access::visible(user, &c.files))
            .await;
        listing::list_files(visible, query, default_page_size)
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<ValuationFile, AppError> {
        let file = self
            .store
            .get::<ValuationFile>(id)
            .await
            .ok_or(AppError::NotFound("File"))?;
        access::ensure_access(user, &file)?;
        Ok(file)
    }

    /// The number the next created file would receive. Nothing is reserved.
    pub async fn next_number(&self, today: NaiveDate) -> String {
        self.store
            .read(|c| numbering::next_file_number(&c.files, today))
            .await
    }

    pub async fn stats(&self, user: &User) -> FileStats {
        let visible = self
            .store
            .read(|c| access::visible(user, &c.files))
            .await;

        let mut stats = FileStats { total: visible.len(), ..FileStats::default() };
        for file in &visible {
            match file.status {
                FileStatus::Pending => stats.pending += 1,
                FileStatus::InProgress => stats.in_progress += 1,
                FileStatus::Completed => stats.completed += 1,
                FileStatus::Hold => stats.hold += 1,
                FileStatus::Returned => stats.returned += 1,
                FileStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }

    pub async fn create(
        &self,
        user: &User,
        payload: FilePayload,
        today: NaiveDate,
    ) -> Result<ValuationFile, AppError> {
        // 1. Normalise, then validate what will actually be stored
        let payload = payload.normalized();
        payload.validate()?;

        let now = Utc::now();
        let made_by = payload.made_by.unwrap_or_else(|| user.full_name.clone());

        // 2. Number and insert under the store lock
        let file = self
            .store
            .transact(|c| {
                let file_number = numbering::next_file_number(&c.files, today);

                let mut file = ValuationFile {
                    id: Uuid::now_v7(),
                    file_number,
                    file_date: payload.file_date.unwrap_or(today),
                    status: FileStatus::Pending,
                    client_first_name: payload.client_first_name,
                    client_middle_name: payload.client_middle_name,
                    client_last_name: payload.client_last_name,
                    client_address: payload.client_address,
                    client_phone: payload.client_phone,
                    client_email: payload.client_email,
                    bank_name: payload.bank_name,
                    branch_name: payload.branch_name,
                    description: payload.description,
                    property_value: payload.property_value,
                    made_by,
                    inspected_by: payload.inspected_by,
                    remarks: payload.remarks,
                    invoice_amount: None,
                    notes: String::new(),
                    created_by: user.id,
                    created_by_name: user.full_name.clone(),
                    created_at: now,
                    updated_at: now,
                };

                let action = format!("created file {}", file.file_number);
                notes::append(&mut file.notes, today, &user.full_name, [action]);

                c.files.push(file.clone());
                Ok(file)
            })
            .await?;

        tracing::info!("📁 File {} created by {}", file.file_number, user.username);
        Ok(file)
    }

    /// Full edit. The file number, status and creation data are kept; one note
    /// per changed field is appended.
    pub async fn update(
        &self,
        user: &User,
        id: Uuid,
        payload: FilePayload,
        today: NaiveDate,
    ) -> Result<ValuationFile, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        let file = self
            .store
            .transact(|c| {
                let file = c
                    .files
                    .iter_mut()
                    .find(|f| f.id == id)
                    .ok_or(AppError::NotFound("File"))?;
                access::ensure_access(user, &*file)?;

                let before = file.clone();
                file.client_first_name = payload.client_first_name;
                file.client_middle_name = payload.client_middle_name;
                file.client_last_name = payload.client_last_name;
                file.client_address = payload.client_address;
                file.client_phone = payload.client_phone;
                file.client_email = payload.client_email;
                file.bank_name = payload.bank_name;
                file.branch_name = payload.branch_name;
                file.description = payload.description;
                file.property_value = payload.property_value;
                if let Some(made_by) = payload.made_by {
                    file.made_by = made_by;
                }
                file.inspected_by = payload.inspected_by;
                file.remarks = payload.remarks;
                if let Some(file_date) = payload.file_date {
                    file.file_date = file_date;
                }

                let mut changes = notes::ChangeSet::new();
                changes
                    .text("client name", &before.client_name(), &file.client_name())
                    .opt_text("client address", before.client_address.as_deref(), file.client_address.as_deref())
                    .opt_text("client phone", before.client_phone.as_deref(), file.client_phone.as_deref())
                    .opt_text("client email", before.client_email.as_deref(), file.client_email.as_deref())
                    .text("bank name", &before.bank_name, &file.bank_name)
                    .opt_text("branch name", before.branch_name.as_deref(), file.branch_name.as_deref())
                    .text("property type", &before.description, &file.description)
                    .amount("property value", before.property_value, file.property_value)
                    .text("made by", &before.made_by, &file.made_by)
                    .opt_text("inspected by", before.inspected_by.as_deref(), file.inspected_by.as_deref())
                    .opt_text("remarks", before.remarks.as_deref(), file.remarks.as_deref())
                    .date("file date", Some(before.file_date), Some(file.file_date));

                if !changes.is_empty() {
                    notes::append(&mut file.notes, today, &user.full_name, changes.into_actions());
                    file.updated_at = Utc::now();
                }
                Ok(file.clone())
            })
            .await?;

        tracing::info!("📁 File {} updated by {}", file.file_number, user.username);
        Ok(file)
    }

    // Any status may follow any other. Completing a file may record the
    // invoiced amount against it.
    pub async fn set_status(
        &self,
        user: &User,
        id: Uuid,
        payload: FileStatusPayload,
        today: NaiveDate,
    ) -> Result<ValuationFile, AppError> {
        if let Some(amount) = payload.invoice_amount
            && amount.is_sign_negative()
            && !amount.is_zero()
        {
            return Err(field_error(
                "invoiceAmount",
                "range",
                "Amount must be a valid positive number",
            ));
        }

        self.store
            .transact(|c| {
                let file = c
                    .files
                    .iter_mut()
                    .find(|f| f.id == id)
                    .ok_or(AppError::NotFound("File"))?;
                access::ensure_access(user, &*file)?;

                let mut actions = Vec::new();
                if file.status != payload.status {
                    actions.push(notes::status_change(file.status.label(), payload.status.label()));
                    file.status = payload.status;
                }
                if payload.status == FileStatus::Completed
                    && let Some(amount) = payload.invoice_amount
                    && file.invoice_amount != Some(amount)
                {
                    file.invoice_amount = Some(amount);
                    actions.push(format!("recorded invoice amount {}", format_inr(amount)));
                }

                if !actions.is_empty() {
                    notes::append(&mut file.notes, today, &user.full_name, actions);
                    file.updated_at = Utc::now();
                }
                Ok(file.clone())
            })
            .await
    }

    pub async fn add_note(
        &self,
        user: &User,
        id: Uuid,
        note: &str,
        today: NaiveDate,
    ) -> Result<ValuationFile, AppError> {
        if note.trim().is_empty() {
            return Err(field_error("note", "length", "Note cannot be empty"));
        }

        self.store
            .transact(|c| {
                let file = c
                    .files
                    .iter_mut()
                    .find(|f| f.id == id)
                    .ok_or(AppError::NotFound("File"))?;
                access::ensure_access(user, &*file)?;

                notes::append(&mut file.notes, today, &user.full_name, [notes::free_text(note)]);
                file.updated_at = Utc::now();
                Ok(file.clone())
            })
            .await
    }

    pub async fn delete(&self, user: &User, id: Uuid, confirm: bool) -> Result<(), AppError> {
        if !confirm {
            return Err(AppError::ConfirmationRequired);
        }

        let removed = self
            .store
            .transact(|c| {
                let index = c
                    .files
                    .iter()
                    .position(|f| f.id == id)
                    .ok_or(AppError::NotFound("File"))?;
                access::ensure_access(user, &c.files[index])?;
                Ok(c.files.remove(index))
            })
            .await?;

        tracing::info!("🗑️ File {} deleted by {}", removed.file_number, user.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::services::fixtures::{self, today, user};
    use rust_decimal::Decimal;

    fn payload() -> FilePayload {
        serde_json::from_value(serde_json::json!({
            "clientFirstName": "Anil",
            "clientLastName": "Kumar",
            "bankName": "State Bank of India",
            "branchName": "Salt Lake",
            "description": "Residential flat",
            "propertyValue": 2500000
        }))
        .unwrap()
    }

    async fn service() -> FileService {
        FileService::new(fixtures::store().await)
    }

    #[tokio::test]
    async fn first_file_gets_first_number() {
        let files = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);

        let file = files.create(&op, payload(), today()).await.unwrap();

        assert_eq!(file.file_number, "FILE/001/25-26");
        assert_eq!(file.status, FileStatus::Pending);
        assert_eq!(file.client_first_name, "ANIL");
        assert_eq!(file.bank_name, "STATE BANK OF INDIA");
        assert_eq!(file.made_by, "Rahul Sen");
        assert_eq!(file.created_by, op.id);
        assert_eq!(file.file_date, today());
        assert_eq!(file.notes, "15/06/2025 - Rahul Sen created file FILE/001/25-26");

        let second = files.create(&op, payload(), today()).await.unwrap();
        assert_eq!(second.file_number, "FILE/002/25-26");
        assert_eq!(files.next_number(today()).await, "FILE/003/25-26");
    }

    #[tokio::test]
    async fn blank_required_fields_are_reported() {
        let files = service().await;
        let mut bad = payload();
        bad.client_first_name = "   ".into();
        bad.bank_name = String::new();

        let Err(AppError::ValidationError(errors)) =
            files.create(&user("A", Role::Admin), bad, today()).await
        else {
            panic!("expected validation error");
        };
        assert_eq!(errors.field_errors().len(), 2);
    }

    #[tokio::test]
    async fn edits_keep_the_number_and_log_changes() {
        let files = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let created = files.create(&op, payload(), today()).await.unwrap();

        let mut edit = payload();
        edit.bank_name = "Punjab National Bank".into();
        edit.property_value = Decimal::from(2_600_000);
        let updated = files.update(&op, created.id, edit, today()).await.unwrap();

        assert_eq!(updated.file_number, created.file_number);
        let lines: Vec<_> = updated.notes.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].ends_with(
            "changed bank name from \"STATE BANK OF INDIA\" to \"PUNJAB NATIONAL BANK\""
        ));
        assert!(lines[2].ends_with("changed property value from ₹25,00,000.00 to ₹26,00,000.00"));

        // no-op edit appends nothing
        let again = files.update(&op, created.id, payload_like(&updated), today()).await.unwrap();
        assert_eq!(again.notes, updated.notes);
    }

    fn payload_like(file: &ValuationFile) -> FilePayload {
        let mut p = payload();
        p.bank_name = file.bank_name.clone();
        p.property_value = file.property_value;
        p
    }

    #[tokio::test]
    async fn completing_records_invoice_amount() {
        let files = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let file = files.create(&op, payload(), today()).await.unwrap();

        let status = FileStatusPayload {
            status: FileStatus::Completed,
            invoice_amount: Some(Decimal::from(4720)),
        };
        let done = files.set_status(&op, file.id, status, today()).await.unwrap();

        assert_eq!(done.status, FileStatus::Completed);
        assert_eq!(done.invoice_amount, Some(Decimal::from(4720)));
        assert!(done.notes.contains("changed status from \"Pending\" to \"Completed\""));
        assert!(done.notes.contains("recorded invoice amount ₹4,720.00"));

        let stats = files.stats(&op).await;
        assert_eq!((stats.total, stats.completed, stats.pending), (1, 1, 0));
    }

    #[tokio::test]
    async fn strangers_cannot_see_or_touch_files() {
        let files = service().await;
        let owner = user("Rahul Sen", Role::ComputerOperator);
        let stranger = user("Amit Das", Role::Inspector);
        let admin = user("Boss", Role::Admin);
        let file = files.create(&owner, payload(), today()).await.unwrap();

        assert!(matches!(files.get(&stranger, file.id).await, Err(AppError::Forbidden)));
        assert_eq!(files.list(&stranger, &FileQuery::default(), 15).await.total_items, 0);
        assert_eq!(files.list(&admin, &FileQuery::default(), 15).await.total_items, 1);
        assert!(matches!(
            files.delete(&stranger, file.id, true).await,
            Err(AppError::Forbidden)
        ));

        // the assigned maker is let in by name
        let mut assigned = payload();
        assigned.made_by = Some("Amit Das".into());
        let theirs = files.create(&owner, assigned, today()).await.unwrap();
        assert!(files.get(&stranger, theirs.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let files = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let file = files.create(&op, payload(), today()).await.unwrap();

        assert!(matches!(
            files.delete(&op, file.id, false).await,
            Err(AppError::ConfirmationRequired)
        ));
        assert!(files.get(&op, file.id).await.is_ok());

        files.delete(&op, file.id, true).await.unwrap();
        assert!(matches!(files.get(&op, file.id).await, Err(AppError::NotFound("File"))));
    }

    #[tokio::test]
    async fn notes_are_append_only() {
        let files = service().await;
        let op = user("Rahul Sen", Role::ComputerOperator);
        let file = files.create(&op, payload(), today()).await.unwrap();

        let noted = files.add_note(&op, file.id, "  keys with guard ", today()).await.unwrap();
        assert!(noted.notes.starts_with(&file.notes));
        assert!(noted.notes.ends_with("Rahul Sen added note: keys with guard"));
        assert!(files.add_note(&op, file.id, " ", today()).await.is_err());
    }
}
