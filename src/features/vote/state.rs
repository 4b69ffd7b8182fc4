use std::collections::HashSet;

use crate::models::{Failure, Photo};
use crate::mvi::UiState;

#[derive(Debug, Clone, PartialEq)]
pub struct VoteState {
    /// Category being voted on, also the search query.
    pub query_string: String,
    /// Selected photo id, empty when nothing is selected.
    pub current_selection: String,
    pub did_appear: bool,
    pub photos: Vec<Photo>,
    pub did_load_photos: bool,
    /// Last tile reported visible.
    pub current_id: String,
    pub current_page: u32,
    pub total_pages: u64,
    pub page_threshold: usize,
    pub loading_next_page: bool,
    /// Tiles that already triggered a next-page fetch.
    pub fetched_ids: HashSet<String>,
    /// Most recent search failure, cleared by the next success.
    pub failure: Option<Failure>,
}

impl UiState for VoteState {}

impl VoteState {
    pub fn new(
        query_string: impl Into<String>,
        current_selection: impl Into<String>,
        page_threshold: usize,
    ) -> Self {
        Self {
            query_string: query_string.into(),
            current_selection: current_selection.into(),
            did_appear: false,
            photos: Vec::new(),
            did_load_photos: false,
            current_id: String::new(),
            current_page: 1,
            total_pages: 0,
            page_threshold,
            loading_next_page: false,
            fetched_ids: HashSet::new(),
            failure: None,
        }
    }

    /// Whether the tile at `current_id` should pull in the next page.
    ///
    /// True when no page is loading, more pages exist, the tile sits within
    /// `page_threshold` of the end of the list and has not triggered a fetch
    /// before.
    pub fn should_fetch_next_page(&self) -> bool {
        if self.loading_next_page || u64::from(self.current_page) >= self.total_pages {
            return false;
        }
        let Some(index) = self.photos.iter().position(|p| p.id == self.current_id) else {
            return false;
        };
        index + self.page_threshold >= self.photos.len()
            && !self.fetched_ids.contains(&self.current_id)
    }
}

impl Default for VoteState {
    fn default() -> Self {
        Self::new("cake", "", 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhotoUrls;

    fn photos(count: usize) -> Vec<Photo> {
        (0..count)
            .map(|i| Photo {
                id: i.to_string(),
                urls: PhotoUrls {
                    regular: format!("https://r/{i}"),
                    small: format!("https://s/{i}"),
                },
            })
            .collect()
    }

    fn loaded(count: usize) -> VoteState {
        let mut state = VoteState::new("cake", "", 10);
        state.photos = photos(count);
        state.did_load_photos = true;
        state.total_pages = 5;
        state
    }

    #[test]
    fn tile_far_from_end_does_not_fetch() {
        let mut state = loaded(30);
        state.current_id = "19".to_string();
        assert!(!state.should_fetch_next_page());
    }

    #[test]
    fn tile_at_threshold_fetches() {
        let mut state = loaded(30);
        state.current_id = "20".to_string();
        assert!(state.should_fetch_next_page());
    }

    #[test]
    fn last_page_never_fetches() {
        let mut state = loaded(30);
        state.total_pages = 1;
        state.current_id = "29".to_string();
        assert!(!state.should_fetch_next_page());
    }

    #[test]
    fn loading_or_unknown_tile_does_not_fetch() {
        let mut state = loaded(30);
        state.current_id = "missing".to_string();
        assert!(!state.should_fetch_next_page());

        state.current_id = "25".to_string();
        state.loading_next_page = true;
        assert!(!state.should_fetch_next_page());
    }
}
