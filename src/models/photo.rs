use serde::{Deserialize, Serialize};

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PhotoResults {
    pub results: Vec<Photo>,
    pub total: u64,
    #[serde(rename = "total_pages")]
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub urls: PhotoUrls,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub regular: String,
    pub small: String,
}

/// Orientation filter for searches. `Any` sends no filter at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoOrientation {
    Any,
    #[default]
    Landscape,
    Portrait,
    Squarish,
}

impl PhotoOrientation {
    /// Query parameter value, if any.
    pub fn as_query(&self) -> Option<&'static str> {
        match self {
            PhotoOrientation::Any => None,
            PhotoOrientation::Landscape => Some("landscape"),
            PhotoOrientation::Portrait => Some("portrait"),
            PhotoOrientation::Squarish => Some("squarish"),
        }
    }
}
