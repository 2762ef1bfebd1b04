use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::ImageUpload;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::shared::{PageParams, Pagination, validate_text};
use crate::entity::{blog, user};
use crate::error::AppError;

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_DESCRIPTION_CHARS: usize = 20_000;

/// Display name of a blog's owner, resolved from the user store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorName {
    pub first_name: String,
    pub last_name: String,
}

impl From<&user::Model> for AuthorName {
    fn from(user: &user::Model) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

pub type AuthorNames = HashMap<Uuid, AuthorName>;

/// A blog enriched with its owner's name.
#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogResponse {
    pub id: Uuid,
    #[schema(example = "Notes on the Analytical Engine")]
    pub title: String,
    pub description: String,
    #[schema(example = "https://i.imgur.com/abc123.png")]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub user_id: Uuid,
    /// Empty when the owner no longer exists.
    #[schema(example = "Ada")]
    pub user_first_name: String,
    /// Empty when the owner no longer exists.
    #[schema(example = "Lovelace")]
    pub user_last_name: String,
}

impl BlogResponse {
    /// Build the response, falling back to empty names for an unknown owner.
    pub fn with_author(model: blog::Model, authors: &AuthorNames) -> Self {
        let author = authors.get(&model.user_id).cloned().unwrap_or_default();
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            image_url: model.image_url,
            created_at: model.created_at,
            user_id: model.user_id,
            user_first_name: author.first_name,
            user_last_name: author.last_name,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogListResponse {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub blogs: Vec<BlogResponse>,
}

/// `GET /blogs/search` parameters.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matched against blog titles and author names, case-insensitively.
    pub query: String,
    /// 1-based page number. Default: 1.
    pub page: Option<u64>,
    /// Items per page, 1-100. Default: 10.
    pub page_size: Option<u64>,
}

impl SearchQuery {
    pub fn page_params(&self) -> PageParams {
        PageParams::new(self.page, self.page_size)
    }
}

/// Multipart fields of a blog create or update request, as received.
#[derive(Debug, Default)]
pub struct BlogForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub user_id: Option<Uuid>,
    pub image: Option<ImageUpload>,
}

/// A create request with every required field present and validated.
#[derive(Debug)]
pub struct NewBlog {
    pub title: String,
    pub description: String,
    pub user_id: Uuid,
    pub image: ImageUpload,
}

impl BlogForm {
    pub fn into_new_blog(self) -> Result<NewBlog, AppError> {
        let title = self
            .title
            .ok_or_else(|| AppError::Validation("Missing 'title' field".into()))?;
        let description = self
            .description
            .ok_or_else(|| AppError::Validation("Missing 'description' field".into()))?;
        let user_id = self
            .user_id
            .ok_or_else(|| AppError::Validation("Missing 'userId' field".into()))?;
        let image = self
            .image
            .ok_or_else(|| AppError::Validation("Missing 'image' field".into()))?;

        validate_text("Title", &title, MAX_TITLE_CHARS)?;
        validate_text("Description", &description, MAX_DESCRIPTION_CHARS)?;

        Ok(NewBlog {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            user_id,
            image,
        })
    }

    /// Validate whichever text fields are present; absent fields keep their values.
    pub fn validate_update(&self) -> Result<(), AppError> {
        if let Some(ref title) = self.title {
            validate_text("Title", title, MAX_TITLE_CHARS)?;
        }
        if let Some(ref description) = self.description {
            validate_text("Description", description, MAX_DESCRIPTION_CHARS)?;
        }
        Ok(())
    }
}
