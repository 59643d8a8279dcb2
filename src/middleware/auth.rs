//! Autenticación y control de acceso por rol
//!
//! `CurrentUser` decodifica el JWT (header `Authorization: Bearer` o cookie
//! `access_token`). `Authorized<C>` añade la comprobación de capacidad al
//! entrar en el handler.

use std::marker::PhantomData;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::models::user::Role;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::{extract_token_from_cookie, extract_token_from_header, verify_token};

/// Usuario autenticado que se inyecta en los handlers
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

fn token_from_parts(parts: &Parts) -> Result<&str, AppError> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;
        return extract_token_from_header(value)
            .map_err(|e| AppError::Unauthorized(e.to_string()));
    }

    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(extract_token_from_cookie)
        .ok_or_else(|| AppError::Unauthorized("Authentication token required".to_string()))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?;

        let claims = verify_token(token, &state.config.jwt_secret)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))?;

        let role = claims
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Unauthorized(format!("Invalid role in token: {}", e)))?;

        Ok(CurrentUser {
            id,
            username: claims.username,
            role,
        })
    }
}

/// Capacidad exigida por un handler
pub trait Capability {
    const DESCRIPTION: &'static str;

    fn allows(role: Role) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct AdminOnly;
#[derive(Debug, Clone, Copy)]
pub struct OwnerOnly;
#[derive(Debug, Clone, Copy)]
pub struct CustomerOnly;

impl Capability for AdminOnly {
    const DESCRIPTION: &'static str = "admin";

    fn allows(role: Role) -> bool {
        role == Role::Admin
    }
}

impl Capability for OwnerOnly {
    const DESCRIPTION: &'static str = "owner";

    fn allows(role: Role) -> bool {
        role == Role::Owner
    }
}

impl Capability for CustomerOnly {
    const DESCRIPTION: &'static str = "customer";

    fn allows(role: Role) -> bool {
        role == Role::Customer
    }
}

/// Usuario autenticado que además cumple la capacidad `C`
#[derive(Debug, Clone)]
pub struct Authorized<C> {
    pub user: CurrentUser,
    _capability: PhantomData<fn() -> C>,
}

impl<C: Capability> Authorized<C> {
    pub fn check(user: CurrentUser) -> Result<Self, AppError> {
        if !C::allows(user.role) {
            return Err(AppError::Forbidden(format!(
                "This action requires the {} role",
                C::DESCRIPTION
            )));
        }

        Ok(Self {
            user,
            _capability: PhantomData,
        })
    }
}

#[axum::async_trait]
impl<C> FromRequestParts<AppState> for Authorized<C>
where
    C: Capability,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        Self::check(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            username: "tester".to_string(),
            role,
        }
    }

    #[test]
    fn test_capabilities_match_single_role() {
        assert!(Authorized::<OwnerOnly>::check(user(Role::Owner)).is_ok());
        assert!(matches!(
            Authorized::<OwnerOnly>::check(user(Role::Customer)),
            Err(AppError::Forbidden(_))
        ));
        assert!(Authorized::<AdminOnly>::check(user(Role::Admin)).is_ok());
        assert!(Authorized::<CustomerOnly>::check(user(Role::Admin)).is_err());
    }

    #[test]
    fn test_token_falls_back_to_cookie() {
        let (parts, _) = Request::builder()
            .header(header::COOKIE, "theme=dark; access_token=abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();

        assert_eq!(token_from_parts(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(matches!(token_from_parts(&parts), Err(AppError::Unauthorized(_))));
    }
}
