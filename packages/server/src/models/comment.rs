use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{Pagination, validate_text};
use crate::entity::comment;
use crate::error::AppError;

pub const MAX_CONTENT_CHARS: usize = 5_000;

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub blog_id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Great read!")]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<comment::Model> for CommentResponse {
    fn from(model: comment::Model) -> Self {
        Self {
            id: model.id,
            blog_id: model.blog_id,
            user_id: model.user_id,
            content: model.content,
            created_at: model.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentListResponse {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub comments: Vec<CommentResponse>,
}

/// Request body for creating or replacing a comment.
///
/// On replace, the original `createdAt` is preserved.
#[derive(Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    /// Must reference an existing blog.
    pub blog_id: Uuid,
    /// Must reference an existing user.
    pub user_id: Uuid,
    #[schema(example = "Great read!")]
    pub content: String,
}

pub fn validate_comment(payload: &CommentRequest) -> Result<(), AppError> {
    validate_text("Content", &payload.content, MAX_CONTENT_CHARS)
}
