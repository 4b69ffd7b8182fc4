//! Shared test utilities and mock infrastructure.

#![allow(dead_code, unused_imports)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use photovote::features::root::RootEnvironment;
use photovote::features::vote::VoteEnvironment;
use photovote::models::{Failure, Photo, PhotoOrientation, PhotoResults, PhotoUrls};
use photovote::mvi::{Scheduler, TokioScheduler};
use photovote::service::ImageApi;
use tempfile::TempDir;

/// One recorded `search_photos` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCall {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
    pub orientation: PhotoOrientation,
}

/// Image API answering from a table keyed by `(query, page)`.
///
/// Unknown keys answer with an empty page.
#[derive(Default)]
pub struct MockImageApi {
    responses: Mutex<HashMap<(String, u32), Result<PhotoResults, Failure>>>,
    crashes: Mutex<HashSet<(String, u32)>>,
    calls: Mutex<Vec<SearchCall>>,
}

impl MockImageApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, query: &str, page: u32, response: Result<PhotoResults, Failure>) {
        self.responses
            .lock()
            .insert((query.to_string(), page), response);
    }

    /// Make the search for `(query, page)` panic when polled.
    pub fn crash(&self, query: &str, page: u32) {
        self.crashes.lock().insert((query.to_string(), page));
    }

    pub fn calls(&self) -> Vec<SearchCall> {
        self.calls.lock().clone()
    }
}

impl ImageApi for MockImageApi {
    fn search_photos(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
        orientation: PhotoOrientation,
    ) -> BoxFuture<'static, Result<PhotoResults, Failure>> {
        self.calls.lock().push(SearchCall {
            query: query.to_string(),
            page,
            per_page,
            orientation,
        });
        if self.crashes.lock().contains(&(query.to_string(), page)) {
            return async { crashed_search() }.boxed();
        }
        let response = self
            .responses
            .lock()
            .get(&(query.to_string(), page))
            .cloned()
            .unwrap_or_else(|| Ok(PhotoResults::default()));
        futures::future::ready(response).boxed()
    }
}

fn crashed_search() -> Result<PhotoResults, Failure> {
    panic!("image service crashed")
}

pub fn photo(id: &str) -> Photo {
    Photo {
        id: id.to_string(),
        urls: PhotoUrls {
            regular: format!("https://images.test/regular/{id}"),
            small: format!("https://images.test/small/{id}"),
        },
    }
}

/// A page of `count` photos with ids `{prefix}{n}`.
pub fn page(prefix: &str, count: usize, total_pages: u64) -> PhotoResults {
    PhotoResults {
        results: (0..count).map(|n| photo(&format!("{prefix}{n}"))).collect(),
        total: total_pages * count as u64,
        total_pages,
    }
}

pub fn root_env(api: Arc<MockImageApi>) -> RootEnvironment {
    RootEnvironment {
        image_api: api,
        per_page: 30,
        orientation: PhotoOrientation::Landscape,
    }
}

pub fn vote_env(api: Arc<MockImageApi>) -> VoteEnvironment {
    root_env(api).vote()
}

pub fn scheduler() -> Arc<dyn Scheduler> {
    Arc::new(TokioScheduler::try_current().expect("tests run inside a tokio runtime"))
}

/// Create a temporary config file with the given TOML body.
pub fn temp_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, content).expect("Failed to write config");
    (temp_dir, config_path)
}
