use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::MAX_NAME_CHARS;
use super::shared::{Pagination, normalize_email, validate_password, validate_text};
use crate::entity::{role::Role, user};
use crate::error::AppError;

/// Public view of a user. The password hash and image delete hash are never exposed.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    #[schema(example = "Ada")]
    pub first_name: String,
    #[schema(example = "Lovelace")]
    pub last_name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub role: Role,
    /// Public URL of the profile image, if one is set.
    #[schema(example = "https://i.imgur.com/abc123.png")]
    pub image_url: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            role: model.role,
            image_url: model.image_url,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponse {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub items: Vec<UserResponse>,
}

/// Request body for creating a user directly (admin only).
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    /// Defaults to `USER`.
    pub role: Option<Role>,
}

/// Full replacement of a user's profile fields.
///
/// Image fields are managed by the image endpoints and are kept as-is.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Omit to keep the current role. Only admins may change it.
    pub role: Option<Role>,
    /// Omit to keep the current password.
    pub password: Option<String>,
}

fn validate_profile(first_name: &str, last_name: &str, email: &str) -> Result<String, AppError> {
    validate_text("First name", first_name, MAX_NAME_CHARS)?;
    validate_text("Last name", last_name, MAX_NAME_CHARS)?;
    normalize_email(email)
}

/// Returns the normalized email on success.
pub fn validate_create_user(payload: &CreateUserRequest) -> Result<String, AppError> {
    validate_password(&payload.password)?;
    validate_profile(&payload.first_name, &payload.last_name, &payload.email)
}

/// Returns the normalized email on success.
pub fn validate_update_user(payload: &UpdateUserRequest) -> Result<String, AppError> {
    if let Some(ref password) = payload.password {
        validate_password(password)?;
    }
    validate_profile(&payload.first_name, &payload.last_name, &payload.email)
}
