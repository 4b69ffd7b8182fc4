//! Photo search against the Unsplash REST API.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::{Failure, PhotoOrientation, PhotoResults};

/// Errors that can occur while talking to the image service.
#[derive(Debug, Error)]
pub enum ImageApiError {
    /// Failed to build the HTTP client
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never produced a response
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Service answered with a non-success status
    #[error("Invalid status code: {}", .status.as_u16())]
    Status { status: StatusCode },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Source of photo search results.
///
/// Returned futures are `'static` and own everything they need.
pub trait ImageApi: Send + Sync + 'static {
    fn search_photos(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
        orientation: PhotoOrientation,
    ) -> BoxFuture<'static, Result<PhotoResults, Failure>>;
}

pub struct UnsplashClient {
    client: Client,
    base_url: String,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ImageApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ImageApiError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone().unwrap_or_default(),
        })
    }

    pub(crate) fn build_request(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
        orientation: PhotoOrientation,
    ) -> RequestBuilder {
        let mut params = vec![
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(value) = orientation.as_query() {
            params.push(("orientation", value.to_string()));
        }

        self.client
            .get(format!("{}/search/photos", self.base_url))
            .query(&params)
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
    }

    async fn execute(request: RequestBuilder) -> Result<PhotoResults, ImageApiError> {
        let response = request.send().await.map_err(ImageApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageApiError::Status { status });
        }

        response
            .json::<PhotoResults>()
            .await
            .map_err(ImageApiError::Decode)
    }
}

impl ImageApi for UnsplashClient {
    fn search_photos(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
        orientation: PhotoOrientation,
    ) -> BoxFuture<'static, Result<PhotoResults, Failure>> {
        let request = self.build_request(query, page, per_page, orientation);
        let query = query.to_string();
        async move {
            tracing::debug!(%query, page, per_page, "Searching photos");
            match Self::execute(request).await {
                Ok(results) => {
                    tracing::debug!(%query, page, count = results.results.len(), "Search finished");
                    Ok(results)
                }
                Err(err) => {
                    tracing::warn!(%query, page, error = %err, "Search failed");
                    Err(Failure::from(err))
                }
            }
        }
        .boxed()
    }
}

/// Answers every search with an empty page.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopImageApi;

impl ImageApi for NoopImageApi {
    fn search_photos(
        &self,
        _query: &str,
        _page: u32,
        _per_page: u32,
        _orientation: PhotoOrientation,
    ) -> BoxFuture<'static, Result<PhotoResults, Failure>> {
        futures::future::ready(Ok(PhotoResults::default())).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> UnsplashClient {
        let config = ApiConfig {
            base_url: "https://images.example.test/".to_string(),
            access_key: Some("abc123".to_string()),
            ..ApiConfig::default()
        };
        UnsplashClient::new(&config).unwrap()
    }

    #[test]
    fn request_carries_query_and_client_id() {
        let request = client()
            .build_request("wedding cake", 2, 30, PhotoOrientation::Landscape)
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().path(), "/search/photos");
        let pairs: Vec<(String, String)> = request
            .url()
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "wedding cake".to_string()),
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "30".to_string()),
                ("orientation".to_string(), "landscape".to_string()),
            ]
        );
        assert_eq!(
            request.headers().get(AUTHORIZATION).unwrap(),
            "Client-ID abc123"
        );
    }

    #[test]
    fn any_orientation_is_omitted() {
        let request = client()
            .build_request("cake", 1, 10, PhotoOrientation::Any)
            .build()
            .unwrap();
        assert!(request
            .url()
            .query_pairs()
            .all(|(key, _)| key != "orientation"));
    }

    #[test]
    fn status_error_renders_code() {
        let err = ImageApiError::Status {
            status: StatusCode::UNAUTHORIZED,
        };
        assert_eq!(Failure::from(err).message(), "Invalid status code: 401");
    }

    #[tokio::test]
    async fn noop_returns_empty_page() {
        let results = NoopImageApi
            .search_photos("cake", 1, 30, PhotoOrientation::Any)
            .await
            .unwrap();
        assert!(results.results.is_empty());
        assert_eq!(results.total, 0);
    }
}
