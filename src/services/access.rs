// src/services/access.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{Role, User},
        file::ValuationFile,
        invoice::Invoice,
    },
};

/// A record whose visibility depends on who created it and who is assigned to make it.
pub trait Owned {
    fn created_by(&self) -> Uuid;
    fn maker(&self) -> &str;
}

impl Owned for ValuationFile {
    fn created_by(&self) -> Uuid {
        self.created_by
    }
    fn maker(&self) -> &str {
        &self.made_by
    }
}

impl Owned for Invoice {
    fn created_by(&self) -> Uuid {
        self.created_by
    }
    fn maker(&self) -> &str {
        &self.report_maker
    }
}

pub fn can_access(user: &User, record: &impl Owned) -> bool {
    user.is_admin() || record.created_by() == user.id || record.maker() == user.full_name
}

pub fn ensure_access(user: &User, record: &impl Owned) -> Result<(), AppError> {
    if can_access(user, record) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn can_manage_banks(user: &User) -> bool {
    matches!(user.role, Role::Admin | Role::ComputerOperator)
}

pub fn can_manage_users(user: &User) -> bool {
    user.is_admin()
}

pub fn visible<'a, T: Owned + Clone + 'a>(
    user: &User,
    records: impl IntoIterator<Item = &'a T>,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|r| can_access(user, *r))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::file::FileStatus;
    use crate::services::fixtures::user;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn file(created_by: Uuid, made_by: &str) -> ValuationFile {
        let now = Utc::now();
        ValuationFile {
            id: Uuid::now_v7(),
            file_number: "FILE/001/25-26".into(),
            file_date: NaiveDate::from_ymd_opt(2025, 5, 1).unwrap(),
            status: FileStatus::Pending,
            client_first_name: "ANIL".into(),
            client_middle_name: None,
            client_last_name: "KUMAR".into(),
            client_address: None,
            client_phone: None,
            client_email: None,
            bank_name: "SBI".into(),
            branch_name: None,
            description: "FLAT".into(),
            property_value: Decimal::ZERO,
            made_by: made_by.into(),
            inspected_by: None,
            remarks: None,
            invoice_amount: None,
            notes: String::new(),
            created_by,
            created_by_name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_sees_everything() {
        let admin = user("Boss", Role::Admin);
        assert!(can_access(&admin, &file(Uuid::nil(), "Someone Else")));
    }

    #[test]
    fn creator_or_maker_may_access() {
        let op = user("Rahul Sen", Role::ComputerOperator);
        assert!(can_access(&op, &file(op.id, "Someone Else")));
        assert!(can_access(&op, &file(Uuid::nil(), "Rahul Sen")));
        assert!(!can_access(&op, &file(Uuid::nil(), "Someone Else")));
        assert!(matches!(
            ensure_access(&op, &file(Uuid::nil(), "x")),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn role_capabilities() {
        assert!(can_manage_banks(&user("A", Role::ComputerOperator)));
        assert!(!can_manage_banks(&user("B", Role::Inspector)));
        assert!(can_manage_users(&user("C", Role::Admin)));
        assert!(!can_manage_users(&user("D", Role::ComputerOperator)));
    }

    #[test]
    fn visible_filters_by_policy() {
        let inspector = user("Amit Das", Role::Inspector);
        let files = vec![
            file(Uuid::nil(), "Amit Das"),
            file(Uuid::nil(), "Rahul Sen"),
            file(inspector.id, "Rahul Sen"),
        ];
        assert_eq!(visible(&inspector, &files).len(), 2);
    }
}
