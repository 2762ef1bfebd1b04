use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::config::MediaConfig;
use super::error::MediaError;
use super::traits::{ImageUpload, MediaHost, UploadedImage};

/// Imgur-compatible image host client.
///
/// Uploads go to `POST {api_url}/image` as a multipart `image` part, deletions
/// to `DELETE {api_url}/image/{delete_hash}`. Both authenticate with the
/// anonymous `Client-ID` scheme.
pub struct ImgurHost {
    client: reqwest::Client,
    api_url: String,
    client_id: String,
    max_image_size: usize,
}

/// Response envelope shared by every Imgur endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    success: bool,
    status: u16,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    link: String,
    deletehash: String,
}

/// Error payloads put a message (or an object with one) under `data.error`.
#[derive(Debug, Deserialize)]
struct ErrorData {
    error: serde_json::Value,
}

impl ImgurHost {
    pub fn new(config: &MediaConfig) -> Result<Self, MediaError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            max_image_size: config.max_image_size,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> String {
        format!("Client-ID {}", self.client_id)
    }
}

#[async_trait]
impl MediaHost for ImgurHost {
    #[instrument(skip(self, image), fields(file_name = %image.file_name, size = image.bytes.len()))]
    async fn upload(&self, image: ImageUpload) -> Result<UploadedImage, MediaError> {
        if image.bytes.len() > self.max_image_size {
            return Err(MediaError::TooLarge {
                actual: image.bytes.len(),
                limit: self.max_image_size,
            });
        }

        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = Form::new().text("type", "file").part("image", part);

        let res = self
            .client
            .post(self.endpoint("image"))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .multipart(form)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(rejected(status.as_u16(), &body));
        }

        let uploaded = parse_upload(&body)?;
        debug!(url = %uploaded.url, "Image uploaded");
        Ok(uploaded)
    }

    #[instrument(skip(self, delete_hash))]
    async fn delete(&self, delete_hash: &str) -> Result<(), MediaError> {
        let res = self
            .client
            .delete(self.endpoint(&format!("image/{delete_hash}")))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(rejected(status.as_u16(), &body));
        }

        parse_delete(&body)
    }
}

fn parse_upload(body: &str) -> Result<UploadedImage, MediaError> {
    let envelope: Envelope<UploadData> =
        serde_json::from_str(body).map_err(|e| MediaError::InvalidResponse(e.to_string()))?;
    if !envelope.success {
        return Err(MediaError::Rejected {
            status: envelope.status,
            message: "upload reported success=false".into(),
        });
    }
    Ok(UploadedImage {
        url: envelope.data.link,
        delete_hash: envelope.data.deletehash,
    })
}

fn parse_delete(body: &str) -> Result<(), MediaError> {
    let envelope: Envelope<serde_json::Value> =
        serde_json::from_str(body).map_err(|e| MediaError::InvalidResponse(e.to_string()))?;
    if envelope.success && envelope.data != serde_json::Value::Bool(false) {
        Ok(())
    } else {
        Err(MediaError::Rejected {
            status: envelope.status,
            message: "deletion not confirmed".into(),
        })
    }
}

fn rejected(status: u16, body: &str) -> MediaError {
    let message = serde_json::from_str::<Envelope<ErrorData>>(body)
        .ok()
        .map(|e| match e.data.error {
            serde_json::Value::String(s) => s,
            serde_json::Value::Object(obj) => obj
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("unknown error")
                .to_string(),
            other => other.to_string(),
        })
        .unwrap_or_else(|| body.chars().take(200).collect());
    MediaError::Rejected { status, message }
}
