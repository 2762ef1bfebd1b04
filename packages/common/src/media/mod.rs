mod config;
mod error;
mod traits;

pub mod imgur;

pub use config::MediaConfig;
pub use error::MediaError;
pub use traits::{ImageUpload, MediaHost, UploadedImage};
