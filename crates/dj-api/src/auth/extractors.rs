//! Axum extractors for authentication and authorization.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;

use super::Principal;
use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for authenticated callers.
///
/// Reads the bearer token from the `Authorization` header and validates it.
/// Returns 401 when the header is missing or the token is rejected. When
/// authentication is disabled every caller is [`Principal::development`].
///
/// ```ignore
/// async fn handler(AuthenticatedUser(user): AuthenticatedUser) -> String {
///     format!("Hello, {}!", user.actor())
/// }
/// ```
pub struct AuthenticatedUser(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(AuthenticatedUser(principal.clone()));
        }

        let app_state = AppState::from_ref(state);
        let Some(validator) = app_state.auth.as_ref() else {
            return Ok(AuthenticatedUser(Principal::development()));
        };

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        let principal = validator.validate(token).await?;
        debug!(user = %principal.actor(), role = ?principal.role, "Authenticated request");
        parts.extensions.insert(principal.clone());
        Ok(AuthenticatedUser(principal))
    }
}

/// Extractor that requires the admin role.
///
/// Returns 403 Forbidden if the caller is not an admin.
pub struct RequireAdmin(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(principal) =
            AuthenticatedUser::from_request_parts(parts, state).await?;

        if !principal.is_admin() {
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }

        Ok(RequireAdmin(principal))
    }
}
