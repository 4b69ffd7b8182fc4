use std::sync::Arc;

use crate::config::ApiConfig;
use crate::features::root::action::RootAction;
use crate::features::root::route::RootRoute;
use crate::features::root::state::RootState;
use crate::features::vote::{page_fetch_id, VoteAction, VoteEnvironment, VoteReducer, VoteState};
use crate::models::PhotoOrientation;
use crate::mvi::{combine, CasePath, Combine, Effect, Reducer, ReducerExt};
use crate::navigation::{effects, EnterIntoContext, NavigationAction, NavigationRoute};
use crate::service::{ImageApi, ImageApiError, NoopImageApi, UnsplashClient};

/// Dependencies of the root screen and everything below it.
#[derive(Clone)]
pub struct RootEnvironment {
    pub image_api: Arc<dyn ImageApi>,
    pub per_page: u32,
    pub orientation: PhotoOrientation,
}

impl RootEnvironment {
    /// Environment talking to the real image service.
    pub fn live(config: &ApiConfig) -> Result<Self, ImageApiError> {
        Ok(Self {
            image_api: Arc::new(UnsplashClient::new(config)?),
            per_page: config.per_page,
            orientation: config.orientation,
        })
    }

    pub fn noop() -> Self {
        Self {
            image_api: Arc::new(NoopImageApi),
            per_page: 30,
            orientation: PhotoOrientation::default(),
        }
    }

    pub fn vote(&self) -> VoteEnvironment {
        VoteEnvironment {
            image_api: Arc::clone(&self.image_api),
            per_page: self.per_page,
            orientation: self.orientation,
        }
    }
}

fn vote_state(state: &mut RootState) -> Option<&mut VoteState> {
    state.vote_state.as_mut()
}

/// The full app reducer: the vote screen pulled back into root, followed by
/// root's own handling.
pub fn root_reducer() -> Combine<RootState, RootAction, RootEnvironment> {
    combine(vec![
        VoteReducer
            .optional_pullback(
                vote_state,
                CasePath::new(RootAction::as_vote, RootAction::VoteScreen),
                RootEnvironment::vote,
            )
            .boxed(),
        RootReducer.boxed(),
    ])
}

/// Root-only transitions.
pub struct RootReducer;

impl Reducer for RootReducer {
    type State = RootState;
    type Action = RootAction;
    type Environment = RootEnvironment;

    fn reduce(
        &self,
        state: &mut RootState,
        action: RootAction,
        _env: &RootEnvironment,
    ) -> Effect<RootAction> {
        match action {
            RootAction::OnAppear => {
                tracing::debug!(categories = state.categories.len(), "Root screen appeared");
                Effect::none()
            }
            RootAction::VoteButtonTapped(category) => {
                // Stop whatever the previous category still has in flight.
                let cancel_previous = state
                    .vote_state
                    .take()
                    .map(|previous| Effect::cancel(page_fetch_id(&previous.query_string)))
                    .unwrap_or_else(Effect::none);

                let selection = state.vote_dict.get(&category).cloned().unwrap_or_default();
                state.vote_state = Some(VoteState::new(
                    category.clone(),
                    selection,
                    state.page_threshold,
                ));
                state.query_string = category;

                Effect::merge([
                    cancel_previous,
                    effects::enter_into(RootRoute::Vote, EnterIntoContext::FULL_SCREEN),
                ])
            }
            RootAction::ShowSuccessToast(show) => {
                state.show_success_toast = show;
                Effect::none()
            }
            RootAction::SubmitVotes => {
                if !state.has_placed_all_votes() {
                    tracing::debug!("Submit ignored; not every category has a vote");
                    return Effect::none();
                }
                tracing::info!(votes = ?state.vote_dict, "Votes submitted");
                Effect::send(RootAction::ShowSuccessToast(true))
            }
            RootAction::VoteScreen(VoteAction::SaveSelection(category, id)) => {
                state.vote_dict.insert(category, id);
                Effect::none()
            }
            RootAction::VoteScreen(VoteAction::Dismiss) => Effect::send(RootAction::dismiss()),
            RootAction::VoteScreen(_) => Effect::none(),
            RootAction::Route(Some(intent)) => {
                state.route = Some(intent);
                Effect::none()
            }
            RootAction::Route(None) => Self::clear_route(state),
            RootAction::RouteDismissed(intent) => {
                if state.route.as_ref() != Some(&intent) {
                    tracing::debug!(route = intent.route.name(), "Stale dismissal ignored");
                    return Effect::none();
                }
                Self::clear_route(state)
            }
        }
    }
}

impl RootReducer {
    /// Drop the route and the vote screen it was showing.
    fn clear_route(state: &mut RootState) -> Effect<RootAction> {
        state.route = None;
        match state.vote_state.take() {
            Some(vote) => Effect::cancel(page_fetch_id(&vote.query_string)),
            None => Effect::none(),
        }
    }
}
