use crate::features::root::action::RootAction;
use crate::features::root::state::RootState;
use crate::features::vote::{VoteAction, VoteState};
use crate::mvi::Store;
use crate::navigation::NavigationRoute;

/// Destinations reachable from the root screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootRoute {
    Vote,
}

impl NavigationRoute for RootRoute {
    fn name(&self) -> &'static str {
        match self {
            RootRoute::Vote => "vote",
        }
    }
}

impl RootRoute {
    /// Store backing the destination screen.
    ///
    /// The vote state is optional; a `None` snapshot means the screen has
    /// nothing to show yet (or anymore) and should render empty.
    pub fn destination(
        &self,
        store: &Store<RootState, RootAction>,
    ) -> Store<Option<VoteState>, VoteAction> {
        match self {
            RootRoute::Vote => {
                store.scope(|state| state.vote_state.clone(), RootAction::VoteScreen)
            }
        }
    }
}
