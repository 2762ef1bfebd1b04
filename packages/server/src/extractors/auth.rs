use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::entity::role::Role;
use crate::error::AppError;
use crate::policy::{Decision, Operation};
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to require authentication. Any failure to
/// validate the token rejects the request before the handler body runs.
/// Role and ownership checks happen via [`AuthUser::authorize`] and
/// [`AuthUser::authorize_owned`] against the policy table.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Role gate only. Returns `Err(PermissionDenied)` if the caller's role is
    /// not allowed to perform `op`.
    pub fn authorize(&self, op: Operation) -> Result<(), AppError> {
        self.decide(op, None)
    }

    /// Role gate plus the operation's ownership predicate against `owner_id`.
    pub fn authorize_owned(&self, op: Operation, owner_id: Uuid) -> Result<(), AppError> {
        self.decide(op, Some(owner_id))
    }

    fn decide(&self, op: Operation, owner: Option<Uuid>) -> Result<(), AppError> {
        match op.policy().evaluate(self.user_id, self.role, owner) {
            Decision::Allow => Ok(()),
            decision => {
                tracing::debug!(?op, ?decision, user_id = %self.user_id, "Access denied");
                Err(AppError::PermissionDenied)
            }
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::TokenInvalid)?;

        let claims =
            jwt::verify(token, &state.config.auth.jwt_secret).map_err(|_| AppError::TokenInvalid)?;

        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
