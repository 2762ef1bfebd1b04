use axum::extract::multipart::Field;
use common::ImageUpload;

use crate::error::AppError;

/// Name of the multipart part carrying the image on every upload endpoint.
pub const IMAGE_FIELD: &str = "image";

/// Read an image part into memory, enforcing the size cap and an `image/*` type.
pub async fn read_image_field(field: Field<'_>, max_size: usize) -> Result<ImageUpload, AppError> {
    let file_name = field
        .file_name()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "upload".to_string());
    let content_type = resolve_content_type(field.content_type(), &file_name)?;

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;

    if bytes.is_empty() {
        return Err(AppError::Validation("Image must not be empty".into()));
    }
    if bytes.len() > max_size {
        return Err(AppError::Validation(format!(
            "Image exceeds the {max_size} byte limit"
        )));
    }

    Ok(ImageUpload {
        bytes: bytes.to_vec(),
        file_name,
        content_type,
    })
}

/// Pick the declared content type, falling back to a guess from the filename.
/// Anything outside `image/*` is rejected.
fn resolve_content_type(declared: Option<&str>, file_name: &str) -> Result<String, AppError> {
    let content_type = declared
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream")
        .map(|ct| ct.to_string())
        .or_else(|| {
            mime_guess::from_path(file_name)
                .first()
                .map(|m| m.to_string())
        })
        .ok_or_else(|| AppError::Validation("Unable to determine image type".into()))?;

    if content_type.starts_with("image/") {
        Ok(content_type)
    } else {
        Err(AppError::Validation(format!(
            "Expected an image, got '{content_type}'"
        )))
    }
}
