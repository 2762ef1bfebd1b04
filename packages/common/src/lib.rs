pub mod media;

pub use media::{ImageUpload, MediaConfig, MediaError, MediaHost, UploadedImage};
