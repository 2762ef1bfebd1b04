pub mod auth;
pub mod blog;
pub mod comment;
pub mod user;

use axum::extract::DefaultBodyLimit;
use sea_orm::{ConnectionTrait, EntityTrait};
use uuid::Uuid;

use crate::entity::{blog as blog_entity, user as user_entity};
use crate::error::AppError;

/// Multipart overhead allowance on top of the configured image size.
const MULTIPART_SLACK: usize = 64 * 1024;

/// Body limit for routes that accept an image upload.
pub fn image_body_limit(max_image_size: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_image_size + MULTIPART_SLACK)
}

/// Load a user or fail with `NotFound`.
pub(crate) async fn find_user<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<user_entity::Model, AppError> {
    user_entity::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))
}

/// Load a blog or fail with `NotFound`.
pub(crate) async fn find_blog<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<blog_entity::Model, AppError> {
    blog_entity::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blog {id} not found")))
}
