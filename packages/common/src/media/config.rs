use serde::Deserialize;

/// Connection settings for the third-party image host.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Base URL of the image API. Default: "https://api.imgur.com/3".
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Application client ID sent as `Authorization: Client-ID <id>`.
    pub client_id: String,
    /// Largest accepted image payload in bytes. Default: 10 MiB.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: usize,
    /// Per-request timeout against the image host. Default: 30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.imgur.com/3".into()
}
fn default_max_image_size() -> usize {
    10 * 1024 * 1024
}
fn default_timeout_secs() -> u64 {
    30
}

impl MediaConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            api_url: default_api_url(),
            client_id: client_id.into(),
            max_image_size: default_max_image_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
