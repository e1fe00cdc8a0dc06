// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RecordStore,
    models::auth::{Claims, Role, User, UserProfile},
};

#[cfg(not(test))]
const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const BCRYPT_COST: u32 = 4;

// bcrypt is CPU-bound; keep it off the async workers.
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password, BCRYPT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;
    Ok(hashed)
}

async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
        .await
        .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;
    Ok(valid)
}

#[derive(Clone)]
pub struct AuthService {
    store: RecordStore,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(store: RecordStore, jwt_secret: String) -> Self {
        Self { store, jwt_secret }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(String, User), AppError> {
        let username = username.trim();
        let user = self
            .store
            .read(|c| {
                c.users
                    .iter()
                    .find(|u| u.username.eq_ignore_ascii_case(username))
                    .cloned()
            })
            .await
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AppError::UserInactive);
        }

        let token = self.create_token(user.id)?;
        self.store
            .set_current_user(Some(&UserProfile::from(&user)))
            .await?;

        tracing::info!("🔑 {} signed in", user.username);
        Ok((token, user))
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        self.store.set_current_user(None).await
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        let user = self
            .store
            .get::<User>(token_data.claims.sub)
            .await
            .ok_or(AppError::InvalidToken)?;

        if !user.is_active {
            return Err(AppError::UserInactive);
        }
        Ok(user)
    }

    pub fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    /// Creates the first administrator. Does nothing once any user exists.
    pub async fn seed_admin(
        &self,
        username: &str,
        password: &str,
        full_name: &str,
    ) -> Result<bool, AppError> {
        if !self.store.read(|c| c.users.is_empty()).await {
            return Ok(false);
        }

        let password_hash = hash_password(password).await?;
        let now = Utc::now();
        let admin = User {
            id: Uuid::now_v7(),
            username: username.trim().to_string(),
            password_hash,
            full_name: full_name.trim().to_string(),
            email: None,
            phone: None,
            address: None,
            role: Role::Admin,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let seeded = self
            .store
            .transact(move |c| {
                // another process may have seeded first
                if !c.users.is_empty() {
                    return Ok(false);
                }
                c.users.push(admin);
                Ok(true)
            })
            .await?;

        if seeded {
            tracing::info!("👤 Bootstrap administrator '{}' created", username);
        }
        Ok(seeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures;

    async fn service() -> AuthService {
        AuthService::new(fixtures::store().await, "test-secret".into())
    }

    #[tokio::test]
    async fn seeded_admin_can_log_in() {
        let auth = service().await;
        assert!(auth.seed_admin("admin", "s3cret!", "Administrator").await.unwrap());
        // only once
        assert!(!auth.seed_admin("admin2", "s3cret!", "Other").await.unwrap());

        let (token, user) = auth.login("ADMIN", "s3cret!").await.unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_ne!(user.password_hash, "s3cret!");

        let resolved = auth.validate_token(&token).await.unwrap();
        assert_eq!(resolved.id, user.id);

        let current = auth.store.current_user().await.unwrap().unwrap();
        assert_eq!(current.username, "admin");
        auth.logout().await.unwrap();
        assert!(auth.store.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let auth = service().await;
        auth.seed_admin("admin", "s3cret!", "Administrator").await.unwrap();
        assert!(matches!(
            auth.login("admin", "nope").await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost", "s3cret!").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn inactive_users_are_locked_out() {
        let auth = service().await;
        auth.seed_admin("admin", "s3cret!", "Administrator").await.unwrap();
        let (token, mut user) = auth.login("admin", "s3cret!").await.unwrap();

        user.is_active = false;
        auth.store.update(user).await.unwrap();

        assert!(matches!(auth.login("admin", "s3cret!").await, Err(AppError::UserInactive)));
        assert!(matches!(auth.validate_token(&token).await, Err(AppError::UserInactive)));
    }

    #[tokio::test]
    async fn foreign_tokens_are_invalid() {
        let auth = service().await;
        let other = AuthService::new(fixtures::store().await, "another-secret".into());
        let token = other.create_token(Uuid::now_v7()).unwrap();
        assert!(matches!(auth.validate_token(&token).await, Err(AppError::InvalidToken)));
        assert!(matches!(auth.validate_token("garbage").await, Err(AppError::InvalidToken)));
    }
}
