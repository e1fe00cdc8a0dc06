// src/services/bank_service.rs

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::bank::{Bank, BankPayload},
};

// Clears the default flag on every bank except `keep`.
fn clear_other_defaults(banks: &mut [Bank], keep: Uuid) {
    let now = Utc::now();
    for bank in banks.iter_mut().filter(|b| b.id != keep && b.is_default) {
        bank.is_default = false;
        bank.updated_at = now;
    }
}

#[derive(Clone)]
pub struct BankService {
    store: RecordStore,
}

impl BankService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<Bank> {
        self.store.list::<Bank>().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Bank, AppError> {
        self.store
            .get::<Bank>(id)
            .await
            .ok_or(AppError::NotFound("Bank"))
    }

    /// The flagged default, else the first bank on file.
    pub async fn default_bank(&self) -> Result<Bank, AppError> {
        self.store
            .read(|c| {
                c.banks
                    .iter()
                    .find(|b| b.is_default)
                    .or_else(|| c.banks.first())
                    .cloned()
            })
            .await
            .ok_or(AppError::NotFound("Bank"))
    }

    pub async fn create(&self, payload: BankPayload) -> Result<Bank, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        let now = Utc::now();
        let bank = Bank {
            id: Uuid::now_v7(),
            bank_name: payload.bank_name,
            branch_name: payload.branch_name,
            account_number: payload.account_number,
            ifsc_code: payload.ifsc_code,
            account_type: payload.account_type,
            account_holder_name: payload.account_holder_name,
            is_default: payload.is_default,
            created_at: now,
            updated_at: now,
        };

        let bank = self
            .store
            .transact(|c| {
                if bank.is_default {
                    clear_other_defaults(&mut c.banks, bank.id);
                }
                c.banks.push(bank.clone());
                Ok(bank)
            })
            .await?;

        tracing::info!("🏦 Bank {} ({}) added", bank.bank_name, bank.branch_name);
        Ok(bank)
    }

    pub async fn update(&self, id: Uuid, payload: BankPayload) -> Result<Bank, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        let bank = self
            .store
            .transact(|c| {
                let bank = c
                    .banks
                    .iter_mut()
                    .find(|b| b.id == id)
                    .ok_or(AppError::NotFound("Bank"))?;

                bank.bank_name = payload.bank_name;
                bank.branch_name = payload.branch_name;
                bank.account_number = payload.account_number;
                bank.ifsc_code = payload.ifsc_code;
                bank.account_type = payload.account_type;
                bank.account_holder_name = payload.account_holder_name;
                bank.is_default = payload.is_default;
                bank.updated_at = Utc::now();
                let bank = bank.clone();

                if bank.is_default {
                    clear_other_defaults(&mut c.banks, bank.id);
                }
                Ok(bank)
            })
            .await?;

        tracing::info!("🏦 Bank {} updated", bank.id);
        Ok(bank)
    }

    pub async fn set_default(&self, id: Uuid) -> Result<Bank, AppError> {
        let bank = self
            .store
            .transact(|c| {
                let bank = c
                    .banks
                    .iter_mut()
                    .find(|b| b.id == id)
                    .ok_or(AppError::NotFound("Bank"))?;
                if !bank.is_default {
                    bank.is_default = true;
                    bank.updated_at = Utc::now();
                }
                let bank = bank.clone();

                clear_other_defaults(&mut c.banks, id);
                Ok(bank)
            })
            .await?;

        tracing::info!("🏦 Default bank is now {} ({})", bank.bank_name, bank.branch_name);
        Ok(bank)
    }

    pub async fn delete(&self, id: Uuid, confirm: bool) -> Result<(), AppError> {
        if !confirm {
            return Err(AppError::ConfirmationRequired);
        }

        self.store
            .transact(|c| {
                let index = c
                    .banks
                    .iter()
                    .position(|b| b.id == id)
                    .ok_or(AppError::NotFound("Bank"))?;
                if c.banks[index].is_default {
                    return Err(AppError::Conflict(
                        "The default bank account cannot be deleted.".into(),
                    ));
                }
                c.banks.remove(index);
                Ok(())
            })
            .await?;

        tracing::info!("🗑️ Bank {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;
    use serde_json::json;

    fn payload(name: &str, is_default: bool) -> BankPayload {
        serde_json::from_value(json!({
            "bankName": name,
            "branchName": "Salt Lake",
            "accountNumber": " 30012345678 ",
            "ifscCode": "sbin0001234",
            "accountHolderName": "S. Sen & Associates",
            "isDefault": is_default
        }))
        .unwrap()
    }

    fn defaults(banks: &[Bank]) -> Vec<Uuid> {
        banks.iter().filter(|b| b.is_default).map(|b| b.id).collect()
    }

    #[tokio::test]
    async fn switching_the_default_leaves_exactly_one() {
        let banks = BankService::new(fixtures::store().await);
        let a = banks.create(payload("State Bank of India", true)).await.unwrap();
        let b = banks.create(payload("HDFC Bank", false)).await.unwrap();
        assert_eq!(defaults(&banks.list().await), vec![a.id]);

        banks.set_default(b.id).await.unwrap();

        assert_eq!(defaults(&banks.list().await), vec![b.id]);
        assert_eq!(banks.default_bank().await.unwrap().id, b.id);
    }

    #[tokio::test]
    async fn saving_a_new_default_clears_the_old_one() {
        let banks = BankService::new(fixtures::store().await);
        let a = banks.create(payload("State Bank of India", true)).await.unwrap();
        let b = banks.create(payload("Axis Bank", true)).await.unwrap();
        assert_eq!(defaults(&banks.list().await), vec![b.id]);

        banks.update(a.id, payload("State Bank of India", true)).await.unwrap();
        assert_eq!(defaults(&banks.list().await), vec![a.id]);
    }

    #[tokio::test]
    async fn fields_are_normalised_and_validated() {
        let banks = BankService::new(fixtures::store().await);
        let bank = banks.create(payload("punjab national bank", false)).await.unwrap();
        assert_eq!(bank.bank_name, "PUNJAB NATIONAL BANK");
        assert_eq!(bank.ifsc_code, "SBIN0001234");
        assert_eq!(bank.account_number, "30012345678");

        let mut bad = payload("PNB", false);
        bad.ifsc_code = "PNB123".into();
        assert!(matches!(banks.create(bad).await, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn default_falls_back_to_first_bank() {
        let banks = BankService::new(fixtures::store().await);
        assert!(matches!(banks.default_bank().await, Err(AppError::NotFound("Bank"))));

        let first = banks.create(payload("ICICI Bank", false)).await.unwrap();
        banks.create(payload("Axis Bank", false)).await.unwrap();
        assert_eq!(banks.default_bank().await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn the_default_bank_cannot_be_deleted() {
        let banks = BankService::new(fixtures::store().await);
        let a = banks.create(payload("State Bank of India", true)).await.unwrap();
        let b = banks.create(payload("HDFC Bank", false)).await.unwrap();

        assert!(matches!(banks.delete(b.id, false).await, Err(AppError::ConfirmationRequired)));
        assert!(matches!(banks.delete(a.id, true).await, Err(AppError::Conflict(_))));

        banks.delete(b.id, true).await.unwrap();
        assert_eq!(banks.list().await.len(), 1);
    }
}
