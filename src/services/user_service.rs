// src/services/user_service.rs

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::{
        auth::{
            ChangePasswordPayload, CreateUserPayload, Role, UpdateProfilePayload,
            UpdateUserPayload, User, UserProfile, UserStats,
        },
        file::trim_opt,
    },
    services::auth::hash_password,
};

fn find_mut(users: &mut [User], id: Uuid) -> Result<&mut User, AppError> {
    users
        .iter_mut()
        .find(|u| u.id == id)
        .ok_or(AppError::NotFound("User"))
}

#[derive(Clone)]
pub struct UserService {
    store: RecordStore,
}

impl UserService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Vec<UserProfile> {
        self.store
            .read(|c| c.users.iter().map(UserProfile::from).collect())
            .await
    }

    pub async fn get(&self, id: Uuid) -> Result<UserProfile, AppError> {
        self.store
            .get::<User>(id)
            .await
            .map(|u| UserProfile::from(&u))
            .ok_or(AppError::NotFound("User"))
    }

    pub async fn stats(&self) -> UserStats {
        self.store
            .read(|c| {
                let count = |role: Role| c.users.iter().filter(|u| u.role == role).count();
                UserStats {
                    total: c.users.len(),
                    active: c.users.iter().filter(|u| u.is_active).count(),
                    admins: count(Role::Admin),
                    computer_operators: count(Role::ComputerOperator),
                    inspectors: count(Role::Inspector),
                }
            })
            .await
    }

    pub async fn create(&self, payload: CreateUserPayload) -> Result<UserProfile, AppError> {
        payload.validate()?;

        let password_hash = hash_password(&payload.password).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            username: payload.username.trim().to_string(),
            password_hash,
            full_name: payload.full_name.trim().to_string(),
            email: trim_opt(payload.email),
            phone: trim_opt(payload.phone),
            address: trim_opt(payload.address),
            role: payload.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let user = self
            .store
            .transact(|c| {
                if c.users
                    .iter()
                    .any(|u| u.username.eq_ignore_ascii_case(&user.username))
                {
                    return Err(AppError::UsernameAlreadyExists);
                }
                c.users.push(user.clone());
                Ok(user)
            })
            .await?;

        tracing::info!("👤 User '{}' created as {}", user.username, user.role.as_str());
        Ok(UserProfile::from(&user))
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateUserPayload,
    ) -> Result<UserProfile, AppError> {
        payload.validate()?;
        if actor.id == id && payload.role != Role::Admin {
            return Err(AppError::Conflict(
                "You cannot remove your own administrator role.".into(),
            ));
        }

        let user = self
            .store
            .transact(|c| {
                let user = find_mut(&mut c.users, id)?;
                user.full_name = payload.full_name.trim().to_string();
                user.email = trim_opt(payload.email);
                user.phone = trim_opt(payload.phone);
                user.address = trim_opt(payload.address);
                user.role = payload.role;
                user.updated_at = Utc::now();
                Ok(user.clone())
            })
            .await?;

        tracing::info!("👤 User '{}' updated", user.username);
        Ok(UserProfile::from(&user))
    }

    /// Self-service edit of the caller's own contact details.
    pub async fn update_profile(
        &self,
        id: Uuid,
        payload: UpdateProfilePayload,
    ) -> Result<UserProfile, AppError> {
        payload.validate()?;

        let user = self
            .store
            .transact(|c| {
                let user = find_mut(&mut c.users, id)?;
                user.full_name = payload.full_name.trim().to_string();
                user.email = trim_opt(payload.email);
                user.phone = trim_opt(payload.phone);
                user.address = trim_opt(payload.address);
                user.updated_at = Utc::now();
                Ok(user.clone())
            })
            .await?;
        Ok(UserProfile::from(&user))
    }

    pub async fn change_password(
        &self,
        id: Uuid,
        payload: ChangePasswordPayload,
    ) -> Result<(), AppError> {
        payload.validate()?;
        let password_hash = hash_password(&payload.password).await?;
        self.store
            .transact(|c| {
                let user = find_mut(&mut c.users, id)?;
                user.password_hash = password_hash;
                user.updated_at = Utc::now();
                Ok(())
            })
            .await?;

        tracing::info!("👤 Password changed for user {}", id);
        Ok(())
    }

    pub async fn set_active(
        &self,
        actor: &User,
        id: Uuid,
        active: bool,
    ) -> Result<UserProfile, AppError> {
        if actor.id == id && !active {
            return Err(AppError::Conflict(
                "You cannot deactivate your own account.".into(),
            ));
        }

        let user = self
            .store
            .transact(|c| {
                let user = find_mut(&mut c.users, id)?;
                if user.is_active != active {
                    user.is_active = active;
                    user.updated_at = Utc::now();
                }
                Ok(user.clone())
            })
            .await?;

        tracing::info!(
            "👤 User '{}' {}",
            user.username,
            if active { "activated" } else { "deactivated" }
        );
        Ok(UserProfile::from(&user))
    }

    pub async fn delete(&self, actor: &User, id: Uuid, confirm: bool) -> Result<(), AppError> {
        if !confirm {
            return Err(AppError::ConfirmationRequired);
        }
        if actor.id == id {
            return Err(AppError::Conflict("You cannot delete your own account.".into()));
        }

        let removed = self.store.remove::<User>(id).await?;
        tracing::info!("🗑️ User '{}' deleted", removed.username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{auth::AuthService, fixtures};
    use serde_json::json;

    fn new_user(username: &str, role: &str) -> CreateUserPayload {
        serde_json::from_value(json!({
            "username": username,
            "password": "secret1",
            "fullName": "Rahul Sen",
            "email": "rahul@example.com",
            "role": role
        }))
        .unwrap()
    }

    async fn admin_of(users: &UserService) -> User {
        let profile = users.create(new_user("boss", "admin")).await.unwrap();
        users.store.get::<User>(profile.id).await.unwrap()
    }

    #[tokio::test]
    async fn created_users_can_log_in_and_never_expose_hashes() {
        let store = fixtures::store().await;
        let users = UserService::new(store.clone());
        let auth = AuthService::new(store, "secret".into());

        let profile = users.create(new_user("rsen", "computer-operator")).await.unwrap();
        assert_eq!(profile.role, Role::ComputerOperator);

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("passwordHash").is_none());

        let (_, user) = auth.login("rsen", "secret1").await.unwrap();
        assert_eq!(user.id, profile.id);

        let change = ChangePasswordPayload { password: "another1".into() };
        users.change_password(profile.id, change).await.unwrap();
        assert!(auth.login("rsen", "secret1").await.is_err());
        assert!(auth.login("rsen", "another1").await.is_ok());
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let users = UserService::new(fixtures::store().await);
        users.create(new_user("rsen", "inspector")).await.unwrap();
        assert!(matches!(
            users.create(new_user("RSEN", "inspector")).await,
            Err(AppError::UsernameAlreadyExists)
        ));
    }

    #[tokio::test]
    async fn short_passwords_are_rejected() {
        let users = UserService::new(fixtures::store().await);
        let mut payload = new_user("rsen", "inspector");
        payload.password = "123".into();
        assert!(matches!(users.create(payload).await, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn admins_cannot_lock_themselves_out() {
        let users = UserService::new(fixtures::store().await);
        let admin = admin_of(&users).await;

        assert!(matches!(
            users.set_active(&admin, admin.id, false).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            users.delete(&admin, admin.id, true).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn deactivate_activate_and_delete() {
        let users = UserService::new(fixtures::store().await);
        let admin = admin_of(&users).await;
        let op = users.create(new_user("rsen", "computer-operator")).await.unwrap();

        let off = users.set_active(&admin, op.id, false).await.unwrap();
        assert!(!off.is_active);
        let on = users.set_active(&admin, op.id, true).await.unwrap();
        assert!(on.is_active);

        let stats = users.stats().await;
        assert_eq!((stats.total, stats.active, stats.admins, stats.computer_operators), (2, 2, 1, 1));

        assert!(matches!(
            users.delete(&admin, op.id, false).await,
            Err(AppError::ConfirmationRequired)
        ));
        users.delete(&admin, op.id, true).await.unwrap();
        assert!(matches!(users.get(op.id).await, Err(AppError::NotFound("User"))));
    }
}
