use std::collections::BTreeMap;

use crate::config::VoteConfig;
use crate::features::root::route::RootRoute;
use crate::features::vote::VoteState;
use crate::mvi::UiState;
use crate::navigation::{NavigationState, RouteIntent};

#[derive(Debug, Clone, PartialEq)]
pub struct RootState {
    /// Category of the most recently opened vote screen.
    pub query_string: String,
    /// Category to selected photo id. Empty id means the vote was withdrawn.
    pub vote_dict: BTreeMap<String, String>,
    /// Present while the vote screen is active.
    pub vote_state: Option<VoteState>,
    pub show_success_toast: bool,
    pub categories: Vec<String>,
    pub page_threshold: usize,
    pub route: Option<RouteIntent<RootRoute>>,
}

impl UiState for RootState {}

impl NavigationState for RootState {
    type Route = RootRoute;

    fn route(&self) -> Option<&RouteIntent<RootRoute>> {
        self.route.as_ref()
    }
}

impl RootState {
    pub fn new(config: &VoteConfig) -> Self {
        Self {
            query_string: "cake".to_string(),
            vote_dict: BTreeMap::new(),
            vote_state: None,
            show_success_toast: false,
            categories: config.categories.clone(),
            page_threshold: config.page_threshold,
            route: None,
        }
    }

    pub fn has_voted(&self, category: &str) -> bool {
        self.vote_dict
            .get(category)
            .is_some_and(|id| !id.is_empty())
    }

    /// Every configured category has a non-empty vote.
    pub fn has_placed_all_votes(&self) -> bool {
        !self.categories.is_empty() && self.categories.iter().all(|c| self.has_voted(c))
    }
}

impl Default for RootState {
    fn default() -> Self {
        Self::new(&VoteConfig::default())
    }
}
