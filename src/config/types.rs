use serde::{Deserialize, Serialize};

use crate::models::PhotoOrientation;

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub vote: VoteConfig,
}

/// Image service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for the API (e.g., "https://api.unsplash.com").
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Client access key sent as `Client-ID`.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Photos per page (1..=30).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub orientation: PhotoOrientation,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

/// Voting flow settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteConfig {
    /// Categories offered for voting, in display order.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    /// How close to the end of the list a tile must be to load the next page.
    #[serde(default = "default_page_threshold")]
    pub page_threshold: usize,
}

fn default_base_url() -> String {
    "https://api.unsplash.com".to_string()
}

fn default_per_page() -> u32 {
    30
}

fn default_timeout() -> u64 {
    10
}

fn default_page_threshold() -> usize {
    10
}

fn default_categories() -> Vec<String> {
    ["wedding cake", "birthday cake", "innovative cake", "cake", "cup of tea"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_key: None,
            per_page: default_per_page(),
            orientation: PhotoOrientation::default(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for VoteConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            page_threshold: default_page_threshold(),
        }
    }
}
