use std::sync::Arc;

use crate::features::vote::action::VoteAction;
use crate::features::vote::state::VoteState;
use crate::models::{Failure, PhotoOrientation, PhotoResults};
use crate::mvi::{Effect, EffectId, Reducer};
use crate::service::ImageApi;

/// Dependencies of the vote screen.
#[derive(Clone)]
pub struct VoteEnvironment {
    pub image_api: Arc<dyn ImageApi>,
    pub per_page: u32,
    pub orientation: PhotoOrientation,
}

/// Identity shared by every search started for `query`.
///
/// Cancelling it stops both the first-page load and any next-page fetch.
pub fn page_fetch_id(query: &str) -> EffectId {
    EffectId::from(format!("vote.page-fetch:{query}"))
}

pub struct VoteReducer;

impl VoteReducer {
    fn search(
        state: &VoteState,
        env: &VoteEnvironment,
        page: u32,
        into: fn(Result<PhotoResults, Failure>) -> VoteAction,
    ) -> Effect<VoteAction> {
        let search = env.image_api.search_photos(
            &state.query_string,
            page,
            env.per_page,
            env.orientation,
        );
        Effect::task(search, into).cancellable(page_fetch_id(&state.query_string))
    }
}

impl Reducer for VoteReducer {
    type State = VoteState;
    type Action = VoteAction;
    type Environment = VoteEnvironment;

    fn reduce(
        &self,
        state: &mut VoteState,
        action: VoteAction,
        env: &VoteEnvironment,
    ) -> Effect<VoteAction> {
        match action {
            VoteAction::OnAppear => {
                if state.did_appear {
                    return Effect::none();
                }
                state.did_appear = true;
                tracing::debug!(query = %state.query_string, "Vote screen appeared");
                Self::search(state, env, 1, VoteAction::PhotosQueryResults)
            }
            VoteAction::PhotosQueryResults(Ok(results)) => {
                state.photos = results.results;
                state.total_pages = results.total_pages;
                state.did_load_photos = true;
                state.failure = None;
                Effect::none()
            }
            VoteAction::PhotosQueryResults(Err(failure)) => {
                tracing::warn!(
                    query = %state.query_string,
                    error = %failure,
                    "Photo search failed"
                );
                state.failure = Some(failure);
                Effect::none()
            }
            VoteAction::SetSelection(id) => {
                if state.current_selection == id {
                    state.current_selection.clear();
                } else {
                    state.current_selection = id;
                }
                Effect::send(VoteAction::SaveSelection(
                    state.query_string.clone(),
                    state.current_selection.clone(),
                ))
            }
            VoteAction::TileDidAppear(id) => {
                state.current_id = id;
                if !state.should_fetch_next_page() {
                    return Effect::none();
                }
                state.fetched_ids.insert(state.current_id.clone());
                Effect::send(VoteAction::FetchNextPage)
            }
            VoteAction::FetchNextPage => {
                state.loading_next_page = true;
                let page = state.current_page + 1;
                tracing::debug!(query = %state.query_string, page, "Fetching next page");
                Self::search(state, env, page, VoteAction::NextPageResults)
            }
            VoteAction::NextPageResults(Ok(next_page)) => {
                state.loading_next_page = false;
                state.current_page += 1;
                state.total_pages = next_page.total_pages;
                state.photos.extend(next_page.results);
                state.failure = None;
                Effect::none()
            }
            VoteAction::NextPageResults(Err(failure)) => {
                state.loading_next_page = false;
                tracing::warn!(
                    query = %state.query_string,
                    page = state.current_page + 1,
                    error = %failure,
                    "Next page failed"
                );
                state.failure = Some(failure);
                Effect::none()
            }
            // Parent concerns
            VoteAction::SaveSelection(..) | VoteAction::Dismiss => Effect::none(),
        }
    }
}
