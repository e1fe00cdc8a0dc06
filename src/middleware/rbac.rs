// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::User,
    services::access,
};

/// A route-level role requirement.
pub trait RoleDef: Send + Sync + 'static {
    fn allows(user: &User) -> bool;
}

/// Guard extractor. Must run behind `auth_guard`, which puts the user in the
/// request extensions.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        if !T::allows(user) {
            tracing::warn!("⛔ {} ({}) denied", user.username, user.role.as_str());
            return Err(AppError::Forbidden);
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// ROLE REQUIREMENTS
// ---

pub struct AdminOnly;
impl RoleDef for AdminOnly {
    fn allows(user: &User) -> bool {
        access::can_manage_users(user)
    }
}

pub struct BankManagers;
impl RoleDef for BankManagers {
    fn allows(user: &User) -> bool {
        access::can_manage_banks(user)
    }
}
