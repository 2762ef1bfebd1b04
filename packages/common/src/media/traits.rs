use async_trait::async_trait;

use super::error::MediaError;

/// An image payload on its way to the media host.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// The result of a successful upload.
///
/// `url` and `delete_hash` always come from the same upload call and must be
/// stored together; the hash is the only handle able to delete the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub url: String,
    pub delete_hash: String,
}

/// Stateless client for a third-party image host.
#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Upload an image and return its public URL plus deletion credential.
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError>;

    /// Delete a previously uploaded image by its deletion credential.
    ///
    /// Returns `Ok(())` only when the host confirms the deletion.
    async fn delete(&self, delete_hash: &str) -> Result<(), MediaError>;
}
